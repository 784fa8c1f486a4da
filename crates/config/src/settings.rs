// Application settings
// Loaded from ~/.config/sheetshape/settings.toml

use serde::{Deserialize, Serialize};
use sheetshape_core::PruneFailurePolicy;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ConfigError;

/// HTTP front settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the API listens on
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Backoff for every remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, first one included
    pub max_attempts: u32,
    /// Wait before the first retry; doubles each attempt
    pub base_delay_ms: u64,
    /// Random extra wait, uniform in [0, max_jitter_ms)
    pub max_jitter_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_jitter_ms: 1000,
        }
    }
}

impl RetrySettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }
}

/// Remote spreadsheet endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsSettings {
    pub api_base: String,
    /// Last column of the data range (reads and clears cover A..last_column)
    pub last_column: String,
    pub timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com".to_string(),
            last_column: "Z".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SheetsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Undo snapshot handling
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// "keep" or "discard" the snapshot when a prune's column delete fails
    pub on_prune_failure: PruneFailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub retry: RetrySettings,
    pub sheets: SheetsSettings,
    pub snapshot: SnapshotSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetshape")
            .join("settings.toml")
    }

    /// Load settings from the default path. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&contents)?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate TOML. Absent keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        let col = &self.sheets.last_column;
        if col.is_empty() || col.len() > 3 || !col.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "sheets.last_column must be 1-3 letters, got '{}'",
                col
            )));
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.base_delay(), Duration::from_secs(1));
        assert_eq!(settings.sheets.last_column, "Z");
        assert_eq!(settings.snapshot.on_prune_failure, PruneFailurePolicy::Keep);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
[retry]
max_attempts = 3

[snapshot]
on_prune_failure = "discard"
"#,
        )
        .unwrap();
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.max_jitter_ms, 1000);
        assert_eq!(settings.snapshot.on_prune_failure, PruneFailurePolicy::Discard);
        assert_eq!(settings.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = Settings::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn bad_last_column_rejected() {
        for bad in ["", "A1", "ABCD"] {
            let toml = format!("[sheets]\nlast_column = \"{}\"\n", bad);
            assert!(Settings::from_toml_str(&toml).is_err(), "accepted {bad:?}");
        }
        assert!(Settings::from_toml_str("[sheets]\nlast_column = \"AZ\"\n").is_ok());
    }

    #[test]
    fn unknown_policy_is_parse_error() {
        let err = Settings::from_toml_str("[snapshot]\non_prune_failure = \"maybe\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }
}
