use crate::config::error::{ConfigError, Result};
use crate::config::loader::CheckingConfig;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Schema validator for the checking configuration
pub struct SchemaValidator {
    schema: JSONSchema,
}

impl SchemaValidator {
    /// Compile the schema embedded at build time.
    pub fn new() -> Result<Self> {
        let schema_str = include_str!("schemas/checking_config.schema.json");
        let schema_value: Value = serde_json::from_str(schema_str).map_err(|e| {
            ConfigError::SchemaValidationError(format!("Failed to parse config schema: {e}"))
        })?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| {
                ConfigError::SchemaValidationError(format!("Failed to compile config schema: {e}"))
            })?;

        Ok(Self { schema })
    }

    /// Validate a configuration, reporting every failure at once.
    pub fn validate(&self, config: &CheckingConfig) -> Result<()> {
        let config_value = serde_json::to_value(config).map_err(|e| {
            ConfigError::SchemaValidationError(format!("Failed to serialize config: {e}"))
        })?;

        if let Err(errors) = self.schema.validate(&config_value) {
            let error_messages: Vec<String> = errors
                .map(|e| {
                    let path_str = e.instance_path.to_string();
                    let path = if path_str.is_empty() {
                        "root".to_string()
                    } else {
                        path_str
                    };
                    format!("{e} at '{path}'")
                })
                .collect();

            return Err(ConfigError::SchemaValidationError(format!(
                "Configuration validation failed ({} error{}):\n  - {}",
                error_messages.len(),
                if error_messages.len() == 1 { "" } else { "s" },
                error_messages.join("\n  - ")
            )));
        }

        Ok(())
    }
}
