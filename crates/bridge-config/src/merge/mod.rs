//! Configuration layering, file discovery, and environment overrides

use std::collections::HashMap;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use bridge_core::error::BridgeError;

use crate::toml::{self as bridge_toml, BridgeToml};
use crate::{ConfigResult, CONFIG_FILE_NAME};

/// Default registry base URL
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
/// Default whole-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
#[derive(Debug, Default)]
pub struct ConfigLayering {
    /// Global configuration
    global_config: Option<BridgeToml>,
    /// Project configuration
    project_config: Option<BridgeToml>,
    /// Environment overrides
    env_overrides: HashMap<String, String>,
    /// CLI flag overrides
    cli_overrides: HashMap<String, String>,
}

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project bridge.toml file
    Project(Utf8PathBuf),
    /// File passed with --config
    Explicit(Utf8PathBuf),
}

/// Fully resolved configuration with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub default_namespace: Option<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("bridge/{}", env!("CARGO_PKG_VERSION")),
            default_namespace: None,
        }
    }
}

impl ResolvedConfig {
    /// Apply defaults to a merged file
    pub fn from_toml(config: BridgeToml) -> ConfigResult<Self> {
        bridge_toml::validate_config(&config)?;

        let defaults = Self::default();
        Ok(Self {
            api_url: config.registry.url.unwrap_or(defaults.api_url),
            timeout: config
                .registry
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: config
                .registry
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            user_agent: config.registry.user_agent.unwrap_or(defaults.user_agent),
            default_namespace: config.console.default_namespace,
        })
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Load the project configuration.
    ///
    /// An explicit path must exist. Otherwise bridge.toml is searched from the
    /// working directory upwards, and a missing file is not an error.
    pub async fn load_project_config(
        &self,
        explicit: Option<&Utf8Path>,
    ) -> ConfigResult<Option<(BridgeToml, ConfigSource)>> {
        if let Some(path) = explicit {
            let path = self.cwd.join(path);
            let config = bridge_toml::load_from_file(&path).await?;
            return Ok(Some((config, ConfigSource::Explicit(path))));
        }

        match self.resolve_config_path(CONFIG_FILE_NAME) {
            Some(path) => {
                debug!("using project config {}", path);
                let config = bridge_toml::load_from_file(&path).await?;
                Ok(Some((config, ConfigSource::Project(path))))
            }
            None => Ok(None),
        }
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = self.cwd.as_path();

        loop {
            let config_path = current.join(filename);
            if config_path.exists() {
                return Some(config_path);
            }

            // Move up one directory
            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Path of the global configuration file
    pub fn global_config_path() -> ConfigResult<Utf8PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| BridgeError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;

        let home_dir = Utf8PathBuf::try_from(home_dir).map_err(|e| BridgeError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: format!("Invalid home directory path: {}", e),
        })?;

        Ok(home_dir.join(".bridge").join("config.toml"))
    }

    /// Load global configuration
    pub async fn load_global_config(&self) -> ConfigResult<Option<(BridgeToml, ConfigSource)>> {
        let path = match Self::global_config_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("skipping global config: {}", e);
                return Ok(None);
            }
        };

        if path.exists() {
            let config = bridge_toml::load_from_file(&path).await?;
            Ok(Some((config, ConfigSource::Global(path))))
        } else {
            Ok(None)
        }
    }
}

impl ConfigLayering {
    /// Create a new configuration layering system
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, config: Option<BridgeToml>) -> Self {
        self.global_config = config;
        self
    }

    pub fn with_project(mut self, config: Option<BridgeToml>) -> Self {
        self.project_config = config;
        self
    }

    pub fn with_env(mut self, overrides: HashMap<String, String>) -> Self {
        self.env_overrides = overrides;
        self
    }

    pub fn with_cli(mut self, overrides: HashMap<String, String>) -> Self {
        self.cli_overrides = overrides;
        self
    }

    /// Merge every layer and apply defaults
    pub fn resolve(self) -> ConfigResult<ResolvedConfig> {
        Self::merge_configs(
            self.global_config,
            self.project_config,
            self.env_overrides,
            self.cli_overrides,
        )
    }

    /// Merge multiple configuration layers
    pub fn merge_configs(
        global_config: Option<BridgeToml>,
        project_config: Option<BridgeToml>,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<ResolvedConfig> {
        // Project settings win over global ones
        let mut merged = project_config
            .unwrap_or_default()
            .or(global_config.unwrap_or_default());

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut merged, &env_overrides)?;

        // Apply CLI flag overrides (highest priority)
        Self::apply_cli_overrides(&mut merged, &cli_overrides)?;

        ResolvedConfig::from_toml(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut BridgeToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "BRIDGE_API_URL" => {
                    config.registry.url = Some(value.clone());
                }
                "BRIDGE_TIMEOUT_SECS" => {
                    config.registry.timeout_secs = Some(parse_secs(key, value)?);
                }
                "BRIDGE_CONNECT_TIMEOUT_SECS" => {
                    config.registry.connect_timeout_secs = Some(parse_secs(key, value)?);
                }
                "BRIDGE_USER_AGENT" => {
                    config.registry.user_agent = Some(value.clone());
                }
                "BRIDGE_DEFAULT_NAMESPACE" => {
                    config.console.default_namespace = Some(value.clone());
                }
                _ => {
                    // Unknown environment variable, ignore
                }
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut BridgeToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "api-url" => {
                    config.registry.url = Some(value.clone());
                }
                "timeout" => {
                    config.registry.timeout_secs = Some(parse_secs("--timeout", value)?);
                }
                _ => {
                    // Unknown CLI override, ignore
                }
            }
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("BRIDGE_"))
            .collect()
    }
}

fn parse_secs(field: &str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| BridgeError::ConfigValidation {
            field: field.to_string(),
            reason: format!("'{}' is not a number of seconds: {}", value, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toml::parse_bridge_toml;
    use tempfile::TempDir;

    fn temp_path(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_config_loader_creation() {
        let cwd = Utf8PathBuf::from("/test");
        let loader = ConfigLoader::new(cwd.clone());
        assert_eq!(loader.cwd, cwd);
    }

    #[tokio::test]
    async fn test_resolve_config_path_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_path(&temp_dir);

        let config_path = root.join("bridge.toml");
        tokio::fs::write(&config_path, "[registry]\nurl = \"http://x/api\"")
            .await
            .unwrap();
        let nested = root.join("a").join("b");
        tokio::fs::create_dir_all(&nested).await.unwrap();

        let loader = ConfigLoader::new(nested);
        assert_eq!(loader.resolve_config_path("bridge.toml"), Some(config_path));
        assert_eq!(loader.resolve_config_path("does-not-exist.toml"), None);
    }

    #[tokio::test]
    async fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_path(&temp_dir);
        tokio::fs::write(
            root.join("bridge.toml"),
            "[console]\ndefault_namespace = \"prod\"",
        )
        .await
        .unwrap();

        let loader = ConfigLoader::new(root);
        let (config, source) = loader.load_project_config(None).await.unwrap().unwrap();

        assert_eq!(config.console.default_namespace.as_deref(), Some("prod"));
        assert!(matches!(source, ConfigSource::Project(_)));
    }

    #[tokio::test]
    async fn test_load_explicit_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_path(&temp_dir);
        tokio::fs::write(root.join("other.toml"), "[registry]\ntimeout_secs = 5")
            .await
            .unwrap();

        let loader = ConfigLoader::new(root);
        let (config, source) = loader
            .load_project_config(Some(Utf8Path::new("other.toml")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(config.registry.timeout_secs, Some(5));
        assert!(matches!(source, ConfigSource::Explicit(_)));

        let missing = loader
            .load_project_config(Some(Utf8Path::new("missing.toml")))
            .await;
        assert!(matches!(missing, Err(BridgeError::Io { .. })));
    }

    #[tokio::test]
    async fn test_invalid_project_config_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_path(&temp_dir);
        tokio::fs::write(root.join("bridge.toml"), "[registry\n").await.unwrap();

        let loader = ConfigLoader::new(root);
        match loader.load_project_config(None).await {
            Err(BridgeError::TomlParse { message }) => assert!(message.contains("bridge.toml")),
            other => panic!("Expected TomlParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_without_any_layer() {
        let resolved = ConfigLayering::new().resolve().unwrap();
        assert_eq!(resolved, ResolvedConfig::default());
        assert_eq!(resolved.api_url, "http://localhost:5000/api");
        assert_eq!(resolved.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_merge_configs() {
        let global = parse_bridge_toml(
            "[registry]\nurl = \"http://global/api\"\nuser_agent = \"global-agent\"\n[console]\ndefault_namespace = \"dev\"",
        )
        .unwrap();
        let project = parse_bridge_toml("[registry]\nurl = \"http://project/api\"\ntimeout_secs = 12").unwrap();

        let env_overrides = HashMap::from([
            ("BRIDGE_DEFAULT_NAMESPACE".to_string(), "prod".to_string()),
            ("BRIDGE_CONNECT_TIMEOUT_SECS".to_string(), "2".to_string()),
        ]);
        let cli_overrides = HashMap::from([("timeout".to_string(), "60".to_string())]);

        let merged = ConfigLayering::merge_configs(
            Some(global),
            Some(project),
            env_overrides,
            cli_overrides,
        )
        .unwrap();

        // Project config should take precedence over global
        assert_eq!(merged.api_url, "http://project/api");
        // Global value fills what the project leaves unset
        assert_eq!(merged.user_agent, "global-agent");
        // Environment override should be applied
        assert_eq!(merged.default_namespace.as_deref(), Some("prod"));
        assert_eq!(merged.connect_timeout, Duration::from_secs(2));
        // CLI override should be applied (highest priority)
        assert_eq!(merged.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_cli_url_override_is_validated() {
        let result = ConfigLayering::new()
            .with_cli(HashMap::from([("api-url".to_string(), "nope".to_string())]))
            .resolve();
        assert!(matches!(result, Err(BridgeError::ConfigValidation { .. })));
    }

    #[test]
    fn test_bad_env_number() {
        let result = ConfigLayering::new()
            .with_env(HashMap::from([(
                "BRIDGE_TIMEOUT_SECS".to_string(),
                "soon".to_string(),
            )]))
            .resolve();
        match result {
            Err(BridgeError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "BRIDGE_TIMEOUT_SECS")
            }
            other => panic!("Expected ConfigValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_env_overrides() {
        std::env::set_var("BRIDGE_TEST_ONLY_MARKER", "1");
        std::env::set_var("NOT_BRIDGE_TEST_MARKER", "ignored");

        let overrides = ConfigLayering::collect_env_overrides();

        assert!(overrides.contains_key("BRIDGE_TEST_ONLY_MARKER"));
        assert!(!overrides.contains_key("NOT_BRIDGE_TEST_MARKER"));

        std::env::remove_var("BRIDGE_TEST_ONLY_MARKER");
        std::env::remove_var("NOT_BRIDGE_TEST_MARKER");
    }
}
