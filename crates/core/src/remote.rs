//! The remote spreadsheet service, as seen by [`crate::SheetOperations`].

use crate::error::RemoteError;
use crate::model::{Grid, Header, SheetKey, SourceId};

/// One call per method, no retries: [`crate::RetryExecutor`] wraps every call.
///
/// Implementations report failures as [`RemoteError`], with the HTTP status
/// when the service answered one.
pub trait RemoteSheets: Send + Sync {
    /// Extract a source id from a user-supplied locator (usually a URL).
    fn resolve_locator(&self, locator: &str) -> Option<SourceId>;

    /// Sheet titles of a source, in tab order.
    fn list_sheets(&self, source: &SourceId) -> Result<Vec<String>, RemoteError>;

    /// First row of a sheet. Empty when the sheet has no data.
    fn get_header(&self, key: &SheetKey) -> Result<Header, RemoteError>;

    /// The sheet's data range, header row included.
    fn get_grid(&self, key: &SheetKey) -> Result<Grid, RemoteError>;

    /// Write `grid` starting at the top-left cell, values taken verbatim.
    fn write_grid(&self, key: &SheetKey, grid: &Grid) -> Result<(), RemoteError>;

    /// Empty the sheet's data range.
    fn clear_range(&self, key: &SheetKey) -> Result<(), RemoteError>;

    /// Delete whole columns in one batched request, in the order given.
    fn batch_delete_columns(&self, key: &SheetKey, indices: &[usize]) -> Result<(), RemoteError>;
}
