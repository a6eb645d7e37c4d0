//! Error types for sakani-sync.

use thiserror::Error;

/// Errors surfaced by configuration, storage, delivery and the CLI.
///
/// The queue operations themselves (`enqueue`, `replay_all`, `clear_all`)
/// never return these; they fold failures into queue state and logs.
#[derive(Debug, Error)]
pub enum SakaniError {
    /// Configuration could not be read, parsed or resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local key/value database failed.
    #[error("database error: {0}")]
    Database(String),

    /// A delivery or probe request could not be sent.
    #[error("transport error: {0}")]
    Transport(String),

    /// An action or intent is malformed.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
