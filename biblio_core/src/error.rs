//! Error types for the biblio_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for biblio_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation referenced an ID that is not in the catalog
    #[error("No book with id '{0}'")]
    BookNotFound(String),

    /// A book with the same title already exists in this genre
    #[error("A book titled '{title}' already exists in genre '{genre}'")]
    DuplicateBook { title: String, genre: String },

    /// The highest existing ID is already the largest representable one
    #[error("No book IDs left after {}", u64::MAX)]
    IdsExhausted,

    /// Empty text field or out-of-range year
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog file missing at load time
    #[error("Catalog file not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the catalog file itself (missing, unreadable,
    /// corrupt, or unwritable).
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::CatalogNotFound(_) | Error::Io(_) | Error::Json(_)
        )
    }
}
