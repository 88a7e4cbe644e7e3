use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiLinkReference {
    /// Link text between the brackets, exactly as written.
    pub raw: String,
    /// Trimmed target path used for lookup.
    pub target: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub source: String,
    pub resolved: usize,
    pub missing: Vec<String>,
}

impl LinkReport {
    #[must_use]
    pub fn from_references(source: impl Into<String>, references: &[WikiLinkReference]) -> Self {
        let mut report = Self {
            source: source.into(),
            ..Self::default()
        };
        for reference in references {
            if reference.resolved {
                report.resolved += 1;
            } else {
                report.missing.push(reference.target.clone());
            }
        }
        report
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}
