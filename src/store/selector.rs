//! Label selection for store list operations.

use crate::resource::Resource;

/// A conjunction of exact-match label requirements.
///
/// An empty selector matches every resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    terms: Vec<(String, String)>,
}

impl LabelSelector {
    /// A selector that matches every resource.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A selector requiring one label to hold the given value.
    #[must_use]
    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            terms: vec![(key.into(), value.into())],
        }
    }

    /// Adds another required label to the selector.
    #[must_use]
    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push((key.into(), value.into()));
        self
    }

    /// Returns true if the resource's labels satisfy every term.
    #[must_use]
    pub fn matches(&self, resource: &Resource) -> bool {
        self.terms
            .iter()
            .all(|(key, value)| resource.labels.get(key).is_some_and(|held| held == value))
    }

    /// The selector's terms as `(key, value)` pairs.
    #[must_use]
    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }
}

impl std::fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "<all>");
        }
        let rendered: Vec<String> = self
            .terms
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        write!(f, "{}", rendered.join(","))
    }
}
