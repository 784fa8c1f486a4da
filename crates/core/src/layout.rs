//! Column layout engine.
//!
//! Pure functions: given the current header and the caller's selection,
//! compute either a reordered layout (with a per-column source map) or the
//! list of columns a prune must delete. Nothing here talks to the remote.

use crate::model::{Grid, Header};

/// Result of [`compute_reorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Selected names first, then the rest of the header in original order.
    pub header: Header,
    /// For each final column, the original column it is read from.
    /// `None` for selected names that do not exist in the header.
    pub column_map: Vec<Option<usize>>,
}

impl ReorderPlan {
    /// Rebuild one row in the final layout. Cells that are missing (unknown
    /// column or short row) come out as empty strings.
    pub fn remap_row(&self, row: &[String]) -> Vec<String> {
        self.column_map
            .iter()
            .map(|source| {
                source
                    .and_then(|idx| row.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Remap every row, header row included.
    pub fn remap_grid(&self, grid: &[Vec<String>]) -> Grid {
        grid.iter().map(|row| self.remap_row(row)).collect()
    }
}

/// `desired ++ (header \ desired)`, plus where each final column comes from.
///
/// Header names may repeat; the first occurrence is the one read from.
pub fn compute_reorder(header: &[String], desired: &[String]) -> ReorderPlan {
    let remainder = header.iter().filter(|name| !desired.contains(name));
    let final_header: Header = desired.iter().chain(remainder).cloned().collect();

    let column_map = final_header
        .iter()
        .map(|name| header.iter().position(|h| h == name))
        .collect();

    ReorderPlan {
        header: final_header,
        column_map,
    }
}

/// Indices of header columns absent from `desired`, highest first.
///
/// Deleting in this order keeps the remaining indices valid while the
/// remote shifts columns left after each deletion.
pub fn compute_prune(header: &[String], desired: &[String]) -> Vec<usize> {
    let mut indices: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| !desired.contains(name))
        .map(|(idx, _)| idx)
        .collect();
    indices.sort_unstable_by(|a, b| b.cmp(a));
    indices
}

/// Apply descending delete indices to a row the way the remote does.
pub fn prune_row(row: &[String], delete_indices: &[usize]) -> Vec<String> {
    let mut out = row.to_vec();
    for &idx in delete_indices {
        if idx < out.len() {
            out.remove(idx);
        }
    }
    out
}
