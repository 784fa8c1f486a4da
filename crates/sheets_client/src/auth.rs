//! Access-token lookup.
//!
//! `SHEETSHAPE_ACCESS_TOKEN` wins; otherwise ~/.config/sheetshape/auth.json
//! (`{"token": "...", "api_base": "..."}`, `api_base` optional).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable holding a bearer token.
pub const TOKEN_ENV: &str = "SHEETSHAPE_ACCESS_TOKEN";

/// Credentials for the sheets API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// OAuth bearer token
    pub token: String,
    /// Overrides the configured API base when set
    #[serde(default)]
    pub api_base: Option<String>,
}

impl AuthCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), api_base: None }
    }
}

/// Returns the path to the auth credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("sheetshape/auth.json"))
}

/// Environment first, then the auth file.
/// Returns None when neither yields a non-empty token.
pub fn load_auth() -> Option<AuthCredentials> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            log::debug!("using access token from {}", TOKEN_ENV);
            return Some(AuthCredentials::new(token.trim()));
        }
    }
    load_auth_from(&auth_file_path()?)
}

/// Load credentials from a specific file. Missing or invalid files yield None.
pub fn load_auth_from(path: &Path) -> Option<AuthCredentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    let creds: AuthCredentials = match serde_json::from_str(&contents) {
        Ok(creds) => creds,
        Err(e) => {
            log::warn!("ignoring malformed {}: {}", path.display(), e);
            return None;
        }
    };
    if creds.token.trim().is_empty() {
        return None;
    }
    log::debug!("using access token from {}", path.display());
    Some(creds)
}
