//! Error types and result aliases for Bridge operations.
//!
//! Provides a unified error type that covers every failure the console can
//! hit, from registry round trips to configuration loading, with actionable
//! error messages.

use std::fmt;

use thiserror::Error;

/// Unified error type for all Bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    // Registry errors
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status when the registry answered with a non-success code
        status: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{target} not found in registry")]
    NotFound { target: String },

    #[error("{target} already exists in registry")]
    Conflict { target: String },

    // Console state errors
    #[error("Namespace '{namespace}' is not known to the console")]
    UnknownNamespace { namespace: String },

    #[error("No namespace is selected")]
    NoNamespaceSelected,

    // Config errors
    #[error("Failed to parse bridge.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Cloneable classification of a [`BridgeError`], kept in console state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network or HTTP-layer failure
    Transport,
    /// Target namespace or resource name absent
    NotFound,
    /// Duplicate name or namespace on create
    Conflict,
    /// Operation not valid for the current console state
    InvalidState,
    /// Configuration could not be loaded or validated
    Config,
    /// Local IO failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        };
        f.write_str(label)
    }
}

impl BridgeError {
    /// Create a transport error from any error type
    pub fn transport<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message,
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error for a non-success HTTP status
    pub fn status(status: u16, message: String) -> Self {
        Self::Transport {
            message,
            status: Some(status),
            source: None,
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Transport { .. } => ErrorKind::Transport,
            BridgeError::NotFound { .. } => ErrorKind::NotFound,
            BridgeError::Conflict { .. } => ErrorKind::Conflict,
            BridgeError::UnknownNamespace { .. } | BridgeError::NoNamespaceSelected => {
                ErrorKind::InvalidState
            }
            BridgeError::TomlParse { .. } | BridgeError::ConfigValidation { .. } => {
                ErrorKind::Config
            }
            BridgeError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Check if retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::Transport { .. } | BridgeError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            BridgeError::Transport { status: None, .. } => {
                Some("Check that the registry is reachable and try again")
            }
            BridgeError::Transport { status: Some(_), .. } => {
                Some("The registry rejected the request; check the submitted fields")
            }
            BridgeError::NotFound { .. } => {
                Some("Refresh the namespace to pick up changes made elsewhere")
            }
            BridgeError::Conflict { .. } => Some("Choose a different name or edit the existing entry"),
            BridgeError::UnknownNamespace { .. } => {
                Some("Run 'bridge namespaces' to see the namespaces the registry knows")
            }
            BridgeError::NoNamespaceSelected => {
                Some("Create a namespace first with 'bridge create-namespace <name>'")
            }
            BridgeError::TomlParse { .. } | BridgeError::ConfigValidation { .. } => {
                Some("Fix bridge.toml or the BRIDGE_* environment variables")
            }
            BridgeError::Io { .. } => None,
        }
    }
}
