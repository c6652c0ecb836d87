//! Namespace identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named partition of the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that the identifier can be used as a registry path segment
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty() && !name.contains('/')
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Namespace {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Namespace {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Namespace {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_is_transparent_on_the_wire() {
        let ns: Vec<Namespace> = serde_json::from_str(r#"["prod", "staging"]"#).unwrap();
        assert_eq!(ns, vec![Namespace::from("prod"), Namespace::from("staging")]);
        assert_eq!(serde_json::to_string(&ns[0]).unwrap(), r#""prod""#);
    }

    #[test]
    fn test_valid_names() {
        assert!(Namespace::is_valid_name("prod"));
        assert!(Namespace::is_valid_name("team-a_1"));
        assert!(!Namespace::is_valid_name(""));
        assert!(!Namespace::is_valid_name("   "));
        assert!(!Namespace::is_valid_name("a/b"));
    }
}
