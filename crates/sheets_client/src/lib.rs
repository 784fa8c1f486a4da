//! Google Sheets v4 REST client for sheetshape.
//!
//! [`SheetsClient`] implements [`sheetshape_core::RemoteSheets`] over blocking
//! reqwest. Credentials come from the environment or auth.json ([`auth`]).

pub mod auth;
pub mod client;
pub mod locator;
pub mod range;

pub use auth::{load_auth, AuthCredentials, TOKEN_ENV};
pub use client::{ClientOptions, SheetsClient, DEFAULT_API_BASE};
pub use locator::spreadsheet_id_from_url;
