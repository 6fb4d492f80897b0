//! Error types for the Faktur core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in store and migration operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File I/O error from the storage layer.
    #[error("storage error: {0}")]
    Fs(#[from] faktur_fsio::FsError),

    /// The store was used before `initialize`.
    #[error("store is not initialized")]
    NotInitialized,

    /// The store could not be brought up.
    ///
    /// Raised when the database file is present but unreadable or
    /// unparsable; the store refuses to fabricate a fresh record over a
    /// damaged one.
    #[error("store initialization failed: {message}")]
    InitializationFailed {
        /// Description of the failure.
        message: String,
    },

    /// The migration catalog could not carry the record to the current
    /// schema version. A configuration error, not a data error.
    #[error("migration incomplete: stopped at version {reached}, expected {expected}")]
    MigrationIncomplete {
        /// The version the migration loop stalled at.
        reached: String,
        /// The engine's current schema version.
        expected: String,
    },

    /// A migration transform failed.
    #[error("migration failed: {message}")]
    MigrationFailed {
        /// Description of the failure.
        message: String,
    },

    /// A numbering template failed validation.
    #[error("invalid numbering template: {0}")]
    InvalidTemplate(#[from] faktur_numbering::TemplateError),

    /// No document with the given identity exists.
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// Any other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Creates an initialization failure.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Creates a migration failure.
    pub fn migration_failed(message: impl Into<String>) -> Self {
        Self::MigrationFailed {
            message: message.into(),
        }
    }

    /// Creates a document-not-found error.
    pub fn document_not_found(id: impl Into<String>) -> Self {
        Self::DocumentNotFound { id: id.into() }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
