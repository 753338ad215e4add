//! Error types for the inspector.
//!
//! Cell decoding never produces errors: missing or truncated data resolves to
//! an empty cell. These variants cover the collaborator-facing paths only
//! (replay fetches, format parsing, settings persistence).

use thiserror::Error;

/// Main error type for inspector operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer id unknown to the replay source
    #[error("Buffer not found: {0}")]
    BufferNotFound(u64),

    /// Texture id unknown to the replay source
    #[error("Texture not found: {0}")]
    TextureNotFound(u64),

    /// Replay backend failed to deliver data
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// A vertex buffer is read with both per-instance and per-vertex stepping
    #[error("Buffer {slot} used for both instance and vertex rendering")]
    ConflictingUsage { slot: usize },

    /// Format declaration could not be parsed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Worker thread is gone
    #[error("Fetch worker disconnected")]
    WorkerDisconnected,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid format error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a fetch failure.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }
}

/// Result type alias for inspector operations.
pub type Result<T> = std::result::Result<T, Error>;
