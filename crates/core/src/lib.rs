//! `sheetshape-core`: reorder or prune the columns of a remote sheet safely.
//!
//! Transport-agnostic: the remote service is a [`RemoteSheets`] trait object
//! and every call to it goes through a [`RetryExecutor`]. Prunes are
//! revertible once through a [`SnapshotStore`].

pub mod error;
pub mod layout;
pub mod model;
pub mod operations;
pub mod remote;
pub mod retry;
pub mod snapshot;

pub use error::{RemoteError, SheetError};
pub use layout::{compute_prune, compute_reorder, ReorderPlan};
pub use model::{Grid, Header, Mode, SaveOutcome, SheetKey, SheetListing, SourceId};
pub use operations::{OperationsConfig, PruneFailurePolicy, SheetOperations};
pub use remote::RemoteSheets;
pub use retry::{Disposition, RetryError, RetryExecutor, RetryPolicy};
pub use snapshot::{MemorySnapshotStore, SnapshotStore};
