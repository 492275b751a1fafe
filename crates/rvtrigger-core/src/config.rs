//! Configuration loader for the trigger wizard.
//!
//! Reads `rvtrigger.toml` from a configuration directory and deserializes it
//! into [`WizardConfig`]. Falls back to defaults when the file is missing or
//! malformed; a bad config never stops the wizard.

use std::path::Path;

use rvtrigger_types::config::WizardConfig;

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "rvtrigger.toml";

/// Load configuration from `{config_dir}/rvtrigger.toml`.
///
/// - If the file does not exist, returns [`WizardConfig::default()`] (rv32, unlimited slots).
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
pub async fn load_config(config_dir: &Path) -> WizardConfig {
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No {CONFIG_FILE_NAME} found at {}, using defaults",
                config_path.display()
            );
            return WizardConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return WizardConfig::default();
        }
    };

    match toml::from_str::<WizardConfig>(&content) {
        Ok(config) => {
            tracing::debug!(
                xlen = %config.target.xlen,
                max_triggers = ?config.collection.capacity(),
                "Loaded {}",
                config_path.display()
            );
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            WizardConfig::default()
        }
    }
}
