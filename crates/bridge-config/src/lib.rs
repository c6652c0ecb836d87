//! Configuration loading for the Bridge console
//!
//! This crate handles parsing and validation of `bridge.toml` and layers it
//! with the global config file, `BRIDGE_*` environment variables and CLI
//! flags into one resolved configuration.

pub mod merge;
pub mod toml;

// Re-export main types
pub use crate::merge::{ConfigLayering, ConfigLoader, ConfigSource, ResolvedConfig};
pub use crate::toml::{BridgeToml, ConsoleSection, RegistrySection};

use bridge_core::error::BridgeError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, BridgeError>;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "bridge.toml";
