//! One-level undo storage for destructive saves.
//!
//! At most one grid per [`SheetKey`]. A new prune overwrites the previous
//! snapshot; a successful revert consumes it. Nothing survives a restart.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::model::{Grid, SheetKey};

/// Keyed snapshot storage, injectable so tests can observe or replace it.
pub trait SnapshotStore: Send + Sync {
    /// Save `grid` for `key`, replacing whatever was there.
    fn put(&self, key: &SheetKey, grid: Grid);

    /// Remove and return the snapshot for `key`.
    fn take(&self, key: &SheetKey) -> Option<Grid>;

    /// Put a taken snapshot back, unless a newer one arrived meanwhile.
    /// Returns whether the grid was reinstated.
    fn restore(&self, key: &SheetKey, grid: Grid) -> bool;

    fn contains(&self, key: &SheetKey) -> bool;

    /// Drop the snapshot for `key`, if any.
    fn discard(&self, key: &SheetKey) {
        let _ = self.take(key);
    }
}

/// Process-local store; the production default.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    grids: Mutex<HashMap<SheetKey, Grid>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.grids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.lock().is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn put(&self, key: &SheetKey, grid: Grid) {
        log::debug!("snapshot saved for {} ({} rows)", key, grid.len());
        self.grids.lock().insert(key.clone(), grid);
    }

    fn take(&self, key: &SheetKey) -> Option<Grid> {
        let taken = self.grids.lock().remove(key);
        if taken.is_some() {
            log::debug!("snapshot taken for {}", key);
        }
        taken
    }

    fn restore(&self, key: &SheetKey, grid: Grid) -> bool {
        let mut grids = self.grids.lock();
        if grids.contains_key(key) {
            return false;
        }
        grids.insert(key.clone(), grid);
        true
    }

    fn contains(&self, key: &SheetKey) -> bool {
        self.grids.lock().contains_key(key)
    }
}
