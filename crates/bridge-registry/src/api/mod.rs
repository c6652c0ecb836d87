//! Registry API request and response bodies

use serde::{Deserialize, Serialize};

use bridge_core::types::{Namespace, Resource};

/// Response of `GET /namespaces`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamespaceList {
    pub namespaces: Vec<Namespace>,
}

/// Response of `GET /resource/{namespace}/all`
///
/// The registry pages this listing server-side and reports the paging
/// window alongside the entries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourcePage {
    pub resources: Vec<Resource>,
    /// Total number of resources in the namespace
    #[serde(default)]
    pub total: Option<u64>,
    /// One-based page index
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size used by the registry
    #[serde(default)]
    pub per_page: Option<u64>,
}

impl ResourcePage {
    /// True when the registry holds more entries than it returned
    pub fn is_truncated(&self) -> bool {
        self.total
            .map(|total| total > self.resources.len() as u64)
            .unwrap_or(false)
    }
}

/// Request body of `POST /namespace`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewNamespace<'a> {
    pub namespace: &'a str,
}

/// Error body the registry attaches to non-success responses
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    /// Short error description
    #[serde(default)]
    pub error: Option<String>,
    /// Per-field validation messages
    #[serde(default)]
    pub messages: Option<serde_json::Value>,
    /// Backend details (integrity errors)
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Fold the body into a single line
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(error) = &self.error {
            parts.push(error.clone());
        }
        if let Some(messages) = &self.messages {
            parts.push(messages.to_string());
        }
        if let Some(details) = &self.details {
            parts.push(details.clone());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(": "))
        }
    }
}
