//! Addressing and data types shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a remote spreadsheet (the id segment of its URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// (source, sheet name): the unit of addressing for header, data and snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetKey {
    pub source: SourceId,
    pub sheet: String,
}

impl SheetKey {
    pub fn new(source: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            source: SourceId::new(source),
            sheet: sheet.into(),
        }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.sheet)
    }
}

/// Column names of a sheet, left to right. Duplicates are allowed.
pub type Header = Vec<String>;

/// Rows of cell strings. Rows may be ragged; row 0 is the header when present.
pub type Grid = Vec<Vec<String>>;

/// How a save rewrites the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Keep every column; selected ones move to the front.
    #[default]
    Reorder,
    /// Delete every column that was not selected. Revertible once.
    Prune,
}

impl Mode {
    /// Wire mapping: the front end sends `keep_selected_only`.
    pub fn from_keep_selected_only(keep_selected_only: bool) -> Self {
        if keep_selected_only {
            Mode::Prune
        } else {
            Mode::Reorder
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, Mode::Prune)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Reorder => write!(f, "reorder"),
            Mode::Prune => write!(f, "prune"),
        }
    }
}

/// Sheets of one source, as returned by [`crate::SheetOperations::list_sheets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetListing {
    pub source: SourceId,
    pub titles: Vec<String>,
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub mode: Mode,
    /// Final header after a reorder; surviving header after a prune.
    pub header: Header,
    /// Columns deleted by a prune (descending indices). Empty for reorder.
    pub deleted: Vec<usize>,
    /// Whether a revert is available for this key afterwards.
    pub revertible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_selected_only_maps_to_mode() {
        assert_eq!(Mode::from_keep_selected_only(true), Mode::Prune);
        assert_eq!(Mode::from_keep_selected_only(false), Mode::Reorder);
        assert!(Mode::Prune.is_destructive());
        assert!(!Mode::Reorder.is_destructive());
    }

    #[test]
    fn sheet_key_display() {
        let key = SheetKey::new("abc123", "Sheet1");
        assert_eq!(key.to_string(), "abc123/Sheet1");
        assert_eq!(key.source.as_str(), "abc123");
    }
}
