// Configuration loading

pub mod settings;

pub use sheetshape_core::PruneFailurePolicy;
pub use settings::{RetrySettings, ServerSettings, Settings, SheetsSettings, SnapshotSettings};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("settings parse error: {0}")]
    Parse(String),

    #[error("invalid settings: {0}")]
    Invalid(String),
}
