use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use waystone_core::context::{AppConfig, BackgroundTasks, TrackingSession};

/// Shared handle to the tracking session, passed to the reader and queries.
pub type SessionHandle = Arc<RwLock<TrackingSession>>;

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the individual state types.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// The tracking session lives for the whole process; switching log
    /// files re-points it rather than discarding tracker state.
    session: SessionHandle,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
}

impl CliContext {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::load())),
            session: Arc::new(RwLock::new(TrackingSession::default())),
            tasks: Arc::new(Mutex::new(BackgroundTasks::default())),
        }
    }

    pub fn session(&self) -> SessionHandle {
        Arc::clone(&self.session)
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
