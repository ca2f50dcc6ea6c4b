use thiserror::Error;

/// Errors surfaced by storage backends. The engine itself is external; this
/// is the shape its failures cross the boundary in.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
