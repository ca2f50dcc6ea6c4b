mod background_tasks;
mod config;
mod session;

pub use background_tasks::BackgroundTasks;
pub use config::AppConfig;
pub use session::TrackingSession;
