//! Failure types: what a remote call reports and what an operation surfaces.
//!
//! Fatal remote statuses map onto [`SheetError`] through [`SheetError::from_fatal`];
//! transports pick their status codes from [`SheetError::kind`].

use thiserror::Error;

use crate::model::SheetKey;
use crate::retry::RetryError;

/// A failed remote call, as reported by a [`crate::RemoteSheets`] implementation.
///
/// `status` is the HTTP status when the service answered. `None` means the
/// failure had no recognised shape (transport error, undecodable body, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status, .message))]
pub struct RemoteError {
    pub status: Option<u16>,
    pub message: String,
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}: {message}"),
        None => message.to_string(),
    }
}

impl RemoteError {
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self { status: Some(code), message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

/// Every failure an operation can surface to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// The locator did not contain a spreadsheet id.
    #[error("Invalid spreadsheet URL: {0}")]
    InvalidLocator(String),

    /// Missing or empty required input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Source, sheet or data absent remotely.
    #[error("{0}")]
    NotFound(String),

    /// The credentials may not read or edit the source.
    #[error("Permission denied: {0}. Make sure the account has edit access to the spreadsheet.")]
    PermissionDenied(String),

    /// Every attempt failed with a transient condition.
    #[error("remote service still failing after {attempts} attempts: {last}")]
    AllRetriesExhausted { attempts: u32, last: RemoteError },

    /// Revert requested with nothing saved for the key.
    #[error("No saved state to revert to for {0}. Save with \"keep only selected columns\" first.")]
    NoSnapshot(SheetKey),

    /// Revert cleared the sheet but could not write the snapshot back.
    /// The snapshot is consumed and cannot be offered again.
    #[error("{key} was cleared but restoring its saved state failed ({cause}); the saved state is gone")]
    PartialFailure { key: SheetKey, cause: Box<SheetError> },

    /// Fatal remote failure that is neither not-found nor permission related.
    #[error("remote call failed: {0}")]
    Upstream(RemoteError),
}

impl SheetError {
    /// Stable machine-readable kind, used by transports to pick a status code.
    pub fn kind(&self) -> &'static str {
        match self {
            SheetError::InvalidLocator(_) => "invalid_locator",
            SheetError::InvalidRequest(_) => "invalid_request",
            SheetError::NotFound(_) => "not_found",
            SheetError::PermissionDenied(_) => "permission_denied",
            SheetError::AllRetriesExhausted { .. } => "all_retries_exhausted",
            SheetError::NoSnapshot(_) => "no_snapshot",
            SheetError::PartialFailure { .. } => "partial_failure",
            SheetError::Upstream(_) => "upstream",
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        SheetError::InvalidRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        SheetError::NotFound(msg.into())
    }

    /// Map a fatal remote failure onto the taxonomy.
    pub fn from_fatal(err: RemoteError) -> Self {
        if err.is_not_found() {
            SheetError::NotFound(format!("Invalid spreadsheet ID or not found ({})", err.message))
        } else if err.is_permission_denied() {
            SheetError::PermissionDenied(err.message)
        } else {
            SheetError::Upstream(err)
        }
    }
}

impl From<RetryError> for SheetError {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::Fatal(e) => SheetError::from_fatal(e),
            RetryError::Exhausted { attempts, last } => {
                SheetError::AllRetriesExhausted { attempts, last }
            }
        }
    }
}
