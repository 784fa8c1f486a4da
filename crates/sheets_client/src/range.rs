//! A1-notation ranges for the sheets API.
//!
//! Sheet names are always quoted; an embedded `'` is doubled, which is the
//! escaping the API expects (`'Bob''s data'!A1`).

pub fn quote_sheet_name(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// The header row: `'name'!1:1`.
pub fn header_range(sheet: &str) -> String {
    format!("{}!1:1", quote_sheet_name(sheet))
}

/// Every row, columns A through `last_column`: `'name'!A1:Z`.
pub fn data_range(sheet: &str, last_column: &str) -> String {
    format!("{}!A1:{}", quote_sheet_name(sheet), last_column)
}

/// Top-left anchor for writes: `'name'!A1`.
pub fn anchor(sheet: &str) -> String {
    format!("{}!A1", quote_sheet_name(sheet))
}
