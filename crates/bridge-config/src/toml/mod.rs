//! bridge.toml configuration parsing and serialization

use serde::{Deserialize, Serialize};
use url::Url;

use bridge_core::error::BridgeError;

use crate::ConfigResult;

/// Contents of one bridge.toml file.
///
/// Every field is optional so a file only overrides what it sets; see
/// [`ConfigLayering`](crate::ConfigLayering) for how layers combine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeToml {
    /// Registry connection section
    #[serde(default)]
    pub registry: RegistrySection,

    /// Console behaviour section
    #[serde(default)]
    pub console: ConsoleSection,
}

/// Registry connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Base URL of the registry API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Whole-request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Connect timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    /// User agent header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Console behaviour settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleSection {
    /// Namespace selected on startup when the registry lists it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,
}

impl BridgeToml {
    /// Fill unset fields from `base`
    pub fn or(self, base: BridgeToml) -> BridgeToml {
        BridgeToml {
            registry: RegistrySection {
                url: self.registry.url.or(base.registry.url),
                timeout_secs: self.registry.timeout_secs.or(base.registry.timeout_secs),
                connect_timeout_secs: self
                    .registry
                    .connect_timeout_secs
                    .or(base.registry.connect_timeout_secs),
                user_agent: self.registry.user_agent.or(base.registry.user_agent),
            },
            console: ConsoleSection {
                default_namespace: self
                    .console
                    .default_namespace
                    .or(base.console.default_namespace),
            },
        }
    }
}

/// Parse TOML string to BridgeToml configuration
pub fn parse_bridge_toml(content: &str) -> ConfigResult<BridgeToml> {
    // First try with toml_edit for better error reporting
    content
        .parse::<toml_edit::Document>()
        .map_err(|e| BridgeError::TomlParse {
            message: format!("TOML syntax error: {}", e),
        })?;

    // Then parse with serde for type safety
    let config: BridgeToml = toml::from_str(content).map_err(|e| BridgeError::TomlParse {
        message: format!("TOML parsing error: {}", e),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Serialize BridgeToml to TOML string
pub fn serialize_bridge_toml(config: &BridgeToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| BridgeError::TomlParse {
        message: format!("TOML serialization error: {}", e),
    })
}

/// Validate the fields a file sets
pub fn validate_config(config: &BridgeToml) -> ConfigResult<()> {
    if let Some(url) = &config.registry.url {
        validate_url(url)?;
    }

    if config.registry.timeout_secs == Some(0) {
        return Err(BridgeError::ConfigValidation {
            field: "registry.timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.registry.connect_timeout_secs == Some(0) {
        return Err(BridgeError::ConfigValidation {
            field: "registry.connect_timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if let Some(agent) = &config.registry.user_agent {
        if agent.trim().is_empty() {
            return Err(BridgeError::ConfigValidation {
                field: "registry.user_agent".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
    }

    if let Some(namespace) = &config.console.default_namespace {
        if !bridge_core::Namespace::is_valid_name(namespace) {
            return Err(BridgeError::ConfigValidation {
                field: "console.default_namespace".to_string(),
                reason: format!("'{}' is not a valid namespace name", namespace),
            });
        }
    }

    Ok(())
}

/// Check that `url` is an absolute http(s) URL
pub fn validate_url(url: &str) -> ConfigResult<()> {
    let parsed = Url::parse(url).map_err(|e| BridgeError::ConfigValidation {
        field: "registry.url".to_string(),
        reason: format!("'{}' is not a valid URL: {}", url, e),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BridgeError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
        });
    }

    Ok(())
}

/// Load and parse bridge.toml from file path
pub async fn load_from_file(path: &camino::Utf8Path) -> ConfigResult<BridgeToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BridgeError::io(format!("Failed to read {}", path), e))?;

    parse_bridge_toml(&content).map_err(|e| match e {
        BridgeError::TomlParse { message } => BridgeError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        BridgeError::ConfigValidation { field, reason } => BridgeError::ConfigValidation {
            field,
            reason: format!("{} (in {})", reason, path),
        },
        other => other,
    })
}
