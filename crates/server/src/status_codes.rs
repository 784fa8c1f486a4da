//! HTTP Status Registry
//!
//! Single source of truth for the status codes the API answers with.
//! Front ends branch on them, so they are part of the wire contract.
//!
//! | Status | Kind(s)                                   |
//! |--------|-------------------------------------------|
//! | 200    | success                                   |
//! | 400    | invalid_locator, invalid_request          |
//! | 403    | permission_denied                         |
//! | 404    | not_found, no_snapshot                    |
//! | 500    | partial_failure, not_authenticated, internal |
//! | 502    | upstream                                  |
//! | 503    | all_retries_exhausted                     |
//!
//! # Adding a new kind
//!
//! 1. Add the variant to `SheetError` (or `ApiError`) with its `kind()` string
//! 2. Map it in [`status_for`] below
//! 3. Update the table above

use axum::http::StatusCode;
use sheetshape_core::SheetError;

/// Bad input: empty field, unparsable body, unrecognised URL.
pub const STATUS_BAD_REQUEST: StatusCode = StatusCode::BAD_REQUEST;

/// Credentials lack access to the spreadsheet.
pub const STATUS_FORBIDDEN: StatusCode = StatusCode::FORBIDDEN;

/// Spreadsheet, sheet, data or snapshot absent.
pub const STATUS_NOT_FOUND: StatusCode = StatusCode::NOT_FOUND;

/// Server-side failure: no credentials, a half-applied revert, a crashed
/// worker.
pub const STATUS_INTERNAL: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// The remote answered with a fatal error we have no better mapping for.
pub const STATUS_BAD_GATEWAY: StatusCode = StatusCode::BAD_GATEWAY;

/// The remote kept failing transiently until retries ran out.
pub const STATUS_UNAVAILABLE: StatusCode = StatusCode::SERVICE_UNAVAILABLE;

pub fn status_for(err: &SheetError) -> StatusCode {
    match err {
        SheetError::InvalidLocator(_) | SheetError::InvalidRequest(_) => STATUS_BAD_REQUEST,
        SheetError::PermissionDenied(_) => STATUS_FORBIDDEN,
        SheetError::NotFound(_) | SheetError::NoSnapshot(_) => STATUS_NOT_FOUND,
        SheetError::PartialFailure { .. } => STATUS_INTERNAL,
        SheetError::Upstream(_) => STATUS_BAD_GATEWAY,
        SheetError::AllRetriesExhausted { .. } => STATUS_UNAVAILABLE,
    }
}
