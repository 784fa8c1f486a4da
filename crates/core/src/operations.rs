//! Sheet operations: the four requests a front end can make.
//!
//! Per sheet there are two implicit states. `Clean` has no snapshot;
//! `Pruned` has one, captured right before columns were deleted remotely.
//! A successful revert consumes the snapshot and returns to `Clean`.
//!
//! Two partial commits are possible and reported, never hidden:
//! - a prune whose batched delete fails after the snapshot was stored
//!   (what happens to that snapshot is [`PruneFailurePolicy`]),
//! - a revert that cleared the sheet but could not write the snapshot back
//!   ([`SheetError::PartialFailure`]; the snapshot is gone).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::layout::{compute_prune, compute_reorder, prune_row};
use crate::model::{Grid, Header, Mode, SaveOutcome, SheetKey, SheetListing};
use crate::remote::RemoteSheets;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::snapshot::{MemorySnapshotStore, SnapshotStore};

/// What to do with the snapshot when a prune's column delete fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruneFailurePolicy {
    /// Leave it in place. A later revert rewrites the (unchanged) sheet
    /// from it, which is harmless.
    #[default]
    Keep,
    /// Drop it before reporting the failure.
    Discard,
}

#[derive(Debug, Clone, Default)]
pub struct OperationsConfig {
    pub retry: RetryPolicy,
    pub on_prune_failure: PruneFailurePolicy,
}

/// Serialises prune and revert per sheet; different sheets never contend.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<SheetKey, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// Run `work` holding the lock for `key`. The entry is dropped again
    /// once no other caller holds or waits on it, so the map only ever
    /// contains keys with work in flight.
    fn with_lock<T>(&self, key: &SheetKey, work: impl FnOnce() -> T) -> T {
        let lock = self.locks.lock().entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock();
            work()
        };

        let mut locks = self.locks.lock();
        // One handle in the map, one here: nobody else is queued.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        result
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

pub struct SheetOperations {
    remote: Arc<dyn RemoteSheets>,
    snapshots: Arc<dyn SnapshotStore>,
    retry: RetryExecutor,
    on_prune_failure: PruneFailurePolicy,
    key_locks: KeyLocks,
}

impl SheetOperations {
    pub fn new(
        remote: Arc<dyn RemoteSheets>,
        snapshots: Arc<dyn SnapshotStore>,
        config: OperationsConfig,
    ) -> Self {
        Self {
            remote,
            snapshots,
            retry: RetryExecutor::new(config.retry),
            on_prune_failure: config.on_prune_failure,
            key_locks: KeyLocks::default(),
        }
    }

    /// Operations backed by a fresh in-process snapshot store.
    pub fn with_memory_store(remote: Arc<dyn RemoteSheets>, config: OperationsConfig) -> Self {
        Self::new(remote, Arc::new(MemorySnapshotStore::new()), config)
    }

    /// Resolve `locator` and list the source's sheets.
    pub fn list_sheets(&self, locator: &str) -> Result<SheetListing, SheetError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(SheetError::invalid_request("URL not provided."));
        }
        let source = self
            .remote
            .resolve_locator(locator)
            .ok_or_else(|| SheetError::InvalidLocator(locator.to_string()))?;

        let titles = self
            .retry
            .execute("list sheets", || self.remote.list_sheets(&source))?;

        Ok(SheetListing { source, titles })
    }

    /// Column names of a sheet (its first row).
    pub fn get_columns(&self, key: &SheetKey) -> Result<Header, SheetError> {
        validate_key(key)?;
        let header = self
            .retry
            .execute("read header", || self.remote.get_header(key))?;

        if header.iter().all(|name| name.is_empty()) {
            return Err(SheetError::not_found(format!(
                "Sheet '{}' has no data, or the sheet name is incorrect.",
                key.sheet
            )));
        }
        Ok(header)
    }

    /// Rewrite the sheet's columns according to `desired` and `mode`.
    pub fn save(&self, key: &SheetKey, desired: &[String], mode: Mode) -> Result<SaveOutcome, SheetError> {
        validate_key(key)?;
        if desired.is_empty() {
            return Err(SheetError::invalid_request(
                "No columns selected. Select at least one column to save.",
            ));
        }

        match mode {
            Mode::Reorder => self.save_reorder(key, desired),
            Mode::Prune => self.save_prune(key, desired),
        }
    }

    /// Put the last pruned state back. Returns the number of rows restored.
    pub fn revert(&self, key: &SheetKey) -> Result<usize, SheetError> {
        validate_key(key)?;
        self.key_locks.with_lock(key, || self.revert_locked(key))
    }

    /// Whether [`Self::revert`] currently has something to restore.
    pub fn has_snapshot(&self, key: &SheetKey) -> bool {
        self.snapshots.contains(key)
    }

    fn revert_locked(&self, key: &SheetKey) -> Result<usize, SheetError> {
        let snapshot = self
            .snapshots
            .take(key)
            .ok_or_else(|| SheetError::NoSnapshot(key.clone()))?;

        if let Err(err) = self.retry.execute("clear sheet", || self.remote.clear_range(key)) {
            // Nothing was destroyed yet, so the snapshot stays offerable.
            let reinstated = self.snapshots.restore(key, snapshot);
            log::warn!(
                "revert of {} failed before clearing ({}); snapshot reinstated: {}",
                key,
                err,
                reinstated
            );
            return Err(err.into());
        }

        if let Err(err) = self
            .retry
            .execute("restore sheet", || self.remote.write_grid(key, &snapshot))
        {
            log::error!("{} was cleared but the snapshot could not be written back: {}", key, err);
            return Err(SheetError::PartialFailure {
                key: key.clone(),
                cause: Box::new(err.into()),
            });
        }

        log::info!("reverted {} ({} rows)", key, snapshot.len());
        Ok(snapshot.len())
    }

    fn fetch_grid(&self, key: &SheetKey) -> Result<Grid, SheetError> {
        let grid = self.retry.execute("read sheet", || self.remote.get_grid(key))?;
        if grid.is_empty() {
            return Err(SheetError::not_found(format!("No data in sheet '{}'.", key.sheet)));
        }
        Ok(grid)
    }

    fn save_reorder(&self, key: &SheetKey, desired: &[String]) -> Result<SaveOutcome, SheetError> {
        let grid = self.fetch_grid(key)?;
        let plan = compute_reorder(&grid[0], desired);
        let remapped = plan.remap_grid(&grid);

        self.retry
            .execute("write sheet", || self.remote.write_grid(key, &remapped))?;

        log::info!("reordered {} ({} columns, {} rows)", key, plan.header.len(), remapped.len());
        Ok(SaveOutcome {
            mode: Mode::Reorder,
            header: plan.header,
            deleted: Vec::new(),
            revertible: self.snapshots.contains(key),
        })
    }

    fn save_prune(&self, key: &SheetKey, desired: &[String]) -> Result<SaveOutcome, SheetError> {
        self.key_locks.with_lock(key, || self.save_prune_locked(key, desired))
    }

    fn save_prune_locked(&self, key: &SheetKey, desired: &[String]) -> Result<SaveOutcome, SheetError> {
        let grid = self.fetch_grid(key)?;
        let deleted = compute_prune(&grid[0], desired);
        let surviving = prune_row(&grid[0], &deleted);

        // Captured before the destructive call; see PruneFailurePolicy.
        self.snapshots.put(key, grid);

        if !deleted.is_empty() {
            let result = self
                .retry
                .execute("delete columns", || self.remote.batch_delete_columns(key, &deleted));

            if let Err(err) = result {
                match self.on_prune_failure {
                    PruneFailurePolicy::Keep => {
                        log::warn!("prune of {} failed, snapshot kept: {}", key, err);
                    }
                    PruneFailurePolicy::Discard => {
                        self.snapshots.discard(key);
                        log::warn!("prune of {} failed, snapshot discarded: {}", key, err);
                    }
                }
                return Err(err.into());
            }
        }

        log::info!("pruned {} ({} columns deleted)", key, deleted.len());
        Ok(SaveOutcome {
            mode: Mode::Prune,
            header: surviving,
            deleted,
            revertible: true,
        })
    }
}

fn validate_key(key: &SheetKey) -> Result<(), SheetError> {
    if key.source.as_str().trim().is_empty() || key.sheet.trim().is_empty() {
        return Err(SheetError::invalid_request(
            "Spreadsheet ID or sheet name not provided.",
        ));
    }
    Ok(())
}
