//! Spreadsheet locators: pull the id out of a sheets URL.

use once_cell::sync::Lazy;
use regex::Regex;
use sheetshape_core::SourceId;

static SPREADSHEET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid spreadsheet id regex"));

/// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0` -> `<id>`.
pub fn spreadsheet_id_from_url(url: &str) -> Option<SourceId> {
    SPREADSHEET_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| SourceId::new(m.as_str()))
}
