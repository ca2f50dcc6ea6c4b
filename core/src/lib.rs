pub mod client_log;
pub mod context;
pub mod storage;
pub mod tracker;
pub mod xp_table;

// Re-exports for convenience
pub use client_log::{AreaInfo, LogEvent, LogParser, Reader, ReaderError};
pub use context::{AppConfig, BackgroundTasks, TrackingSession};
pub use storage::{SessionState, StoreWriter, TrackerStore};
pub use tracker::{
    BoundedHistory, InstanceTracker, MapInstance, MapSpan, SignalHandler, SnapshotOutcome,
    TrackerError, TrackerSignal, Waystone, XpSnapshot, XpSource,
};
