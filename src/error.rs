//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level library error enum
//! - [`QueryError`](crate::query::QueryError) never reaches this type; the
//!   query executor turns it into an empty result
//! - Unique-constraint violations are classified into
//!   [`Error::DuplicateAlbum`] and [`Error::DuplicateItem`] so callers can
//!   offer "merge instead of insert"
//!
//! # Example
//!
//! ```ignore
//! use tunekeeper::error::{Error, Result};
//!
//! match db::save_album(&mut session, &mut album).await {
//!     Err(Error::DuplicateAlbum { .. }) => { /* merge into the existing album */ }
//!     other => other?,
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// An album with the same path or (artist, title, year) already exists
    #[error("Duplicate album: {message}")]
    DuplicateAlbum { message: String },

    /// Any other identity-uniqueness violation (track path, track position, extra)
    #[error("Duplicate item: {message}")]
    DuplicateItem { message: String },

    /// Metadata reading error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Invalid field edit
    #[error("Edit error: {0}")]
    Edit(String),

    /// Track or extra whose album has not been saved yet
    #[error("{0} does not belong to a saved album")]
    Unsaved(PathBuf),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl From<sqlx::Error> for Error {
    /// Classify unique-constraint violations; everything else stays a
    /// database error.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.kind() == sqlx::error::ErrorKind::UniqueViolation
        {
            let message = db_err.message().to_string();
            // SQLite reports "UNIQUE constraint failed: albums.path" etc.
            if message.contains("albums.") {
                return Self::DuplicateAlbum { message };
            }
            return Self::DuplicateItem { message };
        }
        Self::Database(err)
    }
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an edit error.
    pub fn edit(message: impl Into<String>) -> Self {
        Self::Edit(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether this is a duplicate-album condition, looking through context.
    pub fn is_duplicate_album(&self) -> bool {
        match self {
            Self::DuplicateAlbum { .. } => true,
            Self::WithContext { source, .. } => source.is_duplicate_album(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::from(e).context(ctx))
    }
}
