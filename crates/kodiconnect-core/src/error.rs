//! Error types for Kodiconnect core operations.
//!
//! Errors are grouped by domain. Each domain has its own enum and the
//! top-level [`Error`] wraps them, so callers can either match precisely or
//! branch on the flat [`ErrorKind`] returned by [`Error::kind`].

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Flat error category, useful for callers that only care about the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File system failures.
    FileSystem,
    /// SQLite failures.
    Database,
    /// XML parse or write failures.
    Xml,
    /// Configuration failures.
    Configuration,
    /// Logging setup failures.
    Logging,
}

/// File system errors.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Reading a file or directory failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// The path being read.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// The path being written.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// The directory being created.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },

    /// Deleting a file or directory failed.
    #[error("Failed to delete {path}: {reason}")]
    DeleteFailed {
        /// The path being deleted.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },
}

/// SQLite catalog errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Opening the database file failed.
    #[error("Failed to open database {path}: {source}")]
    OpenFailed {
        /// The database file.
        path: PathBuf,
        /// The SQLite error.
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed.
    #[error("Query failed on {path}: {source}")]
    QueryFailed {
        /// The database file.
        path: PathBuf,
        /// The SQLite error.
        #[source]
        source: rusqlite::Error,
    },
}

/// XML document errors.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document could not be parsed.
    #[error("Malformed XML: {reason}")]
    Parse {
        /// Parser message.
        reason: String,
    },

    /// The document has no root element.
    #[error("XML document has no root element")]
    MissingRoot,

    /// Serializing the document failed.
    #[error("Failed to serialize XML: {reason}")]
    Write {
        /// Writer message.
        reason: String,
    },
}

/// Errors that can occur in Kodiconnect core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Database operation failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// XML handling failed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FileSystem(_) => ErrorKind::FileSystem,
            Self::Database(_) => ErrorKind::Database,
            Self::Xml(_) => ErrorKind::Xml,
            Self::Configuration(_) | Self::Serialization(_) => ErrorKind::Configuration,
            Self::Logging(_) => ErrorKind::Logging,
        }
    }

    /// Shorthand for a missing path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileSystem(FileSystemError::NotFound { path: path.into() })
    }
}
