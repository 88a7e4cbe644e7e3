#[must_use]
pub(super) fn read_non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub(super) fn read_env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
}

#[must_use]
pub(super) fn read_env_f32(name: &str) -> Option<f32> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<f32>().ok())
}

#[must_use]
pub(super) fn read_env_bool(name: &str) -> Option<bool> {
    parse_bool(std::env::var(name).ok().as_deref())
}

#[must_use]
pub(super) fn read_env_list(name: &str) -> Option<Vec<String>> {
    read_non_empty_env(name).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

#[must_use]
pub(super) fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => Some(true),
        Some("0" | "false" | "no" | "off") => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool(Some(" TRUE ")), Some(true));
        assert_eq!(parse_bool(Some("on")), Some(true));
        assert_eq!(parse_bool(Some("0")), Some(false));
        assert_eq!(parse_bool(Some("off")), Some(false));
    }

    #[test]
    fn parse_bool_ignores_unknown_or_missing_values() {
        assert_eq!(parse_bool(None), None);
        assert_eq!(parse_bool(Some("maybe")), None);
        assert_eq!(parse_bool(Some("")), None);
    }
}
