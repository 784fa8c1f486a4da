//! HTTP front for sheetshape.
//!
//! `build_router` wires the JSON API onto a [`sheetshape_core::SheetOperations`];
//! the `sheetshape` binary adds settings, credentials and the listener.

pub mod api;
pub mod status_codes;

pub use api::{build_router, ApiError, AppState};
