//! Layered configuration for the checking tools.
//!
//! Sources, lowest precedence first:
//! 1. Defaults (from code)
//! 2. Config file (`tcheck.toml`)
//! 3. Environment variables (`TCHECK_*` prefix, `__` for nesting)
//!
//! ```no_run
//! use tcheck_core::config::ConfigLoader;
//!
//! let config = ConfigLoader::load_default().expect("Failed to load config");
//! let config = ConfigLoader::new()
//!     .with_file("./tcheck.toml")
//!     .load()
//!     .expect("Failed to load config");
//! ```
pub mod error;
pub mod loader;
pub mod validator;

pub use error::{ConfigError, Result};
pub use loader::{
    AutoCommitConfig, CheckingConfig, ConfigLoader, GatewayConfig, NavigationConfig, UserConfig,
};
pub use validator::SchemaValidator;
