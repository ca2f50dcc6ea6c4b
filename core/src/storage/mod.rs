mod error;
mod records;
mod writer;

pub use error::StorageError;
pub use records::{MapInstanceRecord, MapSpanRecord, SessionState, XpSnapshotRecord};
pub use writer::{StoreWriter, TrackerStore};
