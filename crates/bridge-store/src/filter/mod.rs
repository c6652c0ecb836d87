//! Search filtering over the loaded resource set

use bridge_core::types::Resource;

/// Entries whose name contains `term`, compared case-insensitively.
///
/// Order is preserved and an empty term keeps every entry.
pub fn filter<'a>(resources: &'a [Resource], term: &str) -> Vec<&'a Resource> {
    if term.is_empty() {
        return resources.iter().collect();
    }

    let needle = term.to_lowercase();
    resources
        .iter()
        .filter(|resource| resource.name.to_lowercase().contains(&needle))
        .collect()
}

/// Live search term applied to whatever the store currently holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterView {
    term: String,
}

impl FilterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    pub fn clear(&mut self) {
        self.term.clear();
    }

    /// True when the term hides anything
    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        filter(resources, &self.term)
    }
}
