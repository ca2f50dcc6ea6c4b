mod error;
mod handler;
mod history;
mod instance;
mod instance_tracker;
mod ledger;
mod signal;
mod span;


pub use error::TrackerError;
pub use handler::SignalHandler;
pub use history::BoundedHistory;
pub use instance::{MapInstance, Waystone};
pub use instance_tracker::InstanceTracker;
pub use ledger::{SnapshotOutcome, XpLedger, XpSnapshot, XpSource};
pub use signal::TrackerSignal;
pub use span::MapSpan;
