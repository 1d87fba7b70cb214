use crate::config::error::{ConfigError, Result};
use crate::filters::{FilterKey, Filters};
use crate::gateway::{BiblePrecedence, DEFAULT_BIBLE_PRECEDENCE};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tcheck_git_tooling::UserIdentity;

/// Root checking configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckingConfig {
    /// Delayed repository commit after each context change
    #[serde(default)]
    pub auto_commit: AutoCommitConfig,

    /// Identity recorded in check data and commits
    #[serde(default)]
    pub user: UserConfig,

    /// Gateway-language edition ordering
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Filters applied when stepping next/previous
    #[serde(default)]
    pub navigation: NavigationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCommitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay between a context change and its commit
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Edition ids from lowest to highest precedence
    #[serde(default = "default_bible_precedence")]
    pub bible_precedence: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub filters: Vec<FilterKey>,
}

fn default_true() -> bool {
    true
}
fn default_delay_ms() -> u64 {
    5000
}
fn default_bible_precedence() -> Vec<String> {
    DEFAULT_BIBLE_PRECEDENCE
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for AutoCommitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bible_precedence: default_bible_precedence(),
        }
    }
}

impl GatewayConfig {
    pub fn precedence(&self) -> BiblePrecedence {
        BiblePrecedence::new(self.bible_precedence.clone())
    }
}

impl UserConfig {
    pub fn identity(&self) -> Option<UserIdentity> {
        let username = self.username.as_ref()?;
        let identity = UserIdentity::new(username.clone());
        Some(match &self.email {
            Some(email) => identity.with_email(email.clone()),
            None => identity,
        })
    }
}

impl NavigationConfig {
    pub fn filters(&self) -> Result<Filters> {
        Filters::from_keys(self.filters.iter().copied())
            .map_err(|e| ConfigError::ValidationError(format!("navigation.filters: {e}")))
    }
}

/// Configuration loader with layered merging support
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration with layered merging:
    /// 1. Start with defaults (from Default implementations)
    /// 2. Merge config file if provided
    /// 3. Override with environment variables (TCHECK_ prefix)
    pub fn load(&self) -> Result<CheckingConfig> {
        let mut builder = Config::builder();

        let defaults_json = serde_json::to_string(&CheckingConfig::default())?;
        builder = builder.add_source(File::from_str(&defaults_json, config::FileFormat::Json));

        if let Some(ref path) = self.config_path {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_ref()));
            } else {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        }

        // Example: TCHECK_AUTO_COMMIT__DELAY_MS=1000
        // Lists are comma separated: TCHECK_NAVIGATION__FILTERS=reminders,comments
        builder = builder.add_source(
            Environment::with_prefix("TCHECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("gateway.bible_precedence")
                .with_list_parse_key("navigation.filters"),
        );

        let config = builder.build()?;
        let checking_config: CheckingConfig = config.try_deserialize()?;

        let validator = crate::config::validator::SchemaValidator::new()?;
        validator.validate(&checking_config)?;
        checking_config.navigation.filters()?;

        tracing::debug!(
            "Loaded configuration{}",
            self.config_path
                .as_ref()
                .map(|p| format!(" from {}", p.display()))
                .unwrap_or_default()
        );
        Ok(checking_config)
    }

    /// Locate the default config file in standard locations:
    /// 1. Current directory: ./tcheck.toml
    /// 2. XDG config: ~/.config/tcheck/config.toml
    /// 3. Home directory: ~/.tcheck.toml
    pub fn find_config_file() -> Option<PathBuf> {
        let cwd_config = PathBuf::from("./tcheck.toml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("tcheck").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".tcheck.toml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<CheckingConfig> {
        let loader = match Self::find_config_file() {
            Some(config_path) => ConfigLoader::new().with_file(config_path),
            None => ConfigLoader::new(),
        };
        loader.load()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
