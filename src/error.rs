//! Error types for the chartbench engine.

use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the chartbench engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog errors (unknown group, empty group)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Adapter lifecycle errors
    #[error("Adapter error: {library}: {message}")]
    Adapter { library: String, message: String },

    /// Appending initial data to the chart failed
    #[error("Data append failed: {0}")]
    AppendData(String),

    /// Per-frame chart update failed
    #[error("Chart update failed at frame {frame}: {message}")]
    UpdateChart { frame: u64, message: String },

    /// A checkpoint transition was invoked out of lifecycle order
    #[error("Checkpoint out of order: {checkpoint} while in phase {phase}")]
    CheckpointOrder {
        checkpoint: &'static str,
        phase: &'static str,
    },

    /// Result store errors
    #[error("Store error: {0}")]
    Store(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] Box<std::io::Error>),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] Box<serde_json::Error>),
}

impl Error {
    /// Create a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    /// Create an adapter error.
    pub fn adapter(library: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            library: library.into(),
            message: message.into(),
        }
    }

    /// Create a data-append error.
    pub fn append_data(message: impl Into<String>) -> Self {
        Self::AppendData(message.into())
    }

    /// Create a chart-update error.
    pub fn update_chart(frame: u64, message: impl Into<String>) -> Self {
        Self::UpdateChart {
            frame,
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Box::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(Box::new(value))
    }
}
