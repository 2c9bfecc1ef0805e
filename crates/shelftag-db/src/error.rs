//! # Database Error Types
//!
//! Error types for catalog operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Conflict / NotFound / Check / storage failure               │
//! │       │                                                                 │
//! │       ├──► CatalogError  (save service: + ValidationError)             │
//! │       ├──► TransferError (CSV reconciler: + FormatError, csv, io)      │
//! │       └──► PrintError    (shelftag-print)                              │
//! │                                                                         │
//! │  CLI prints the Display text of whatever reaches it.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shelftag_core::{FormatError, ValidationError};
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No record matches the key.
    ///
    /// ## When This Occurs
    /// - `get`, `update` or `delete` with a barcode nobody has
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (a conflict).
    ///
    /// ## When This Occurs
    /// - Inserting a barcode that already exists
    /// - Updating a product to another product's barcode
    ///
    /// Retryable when the barcode was allocated rather than typed.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A negative price or quantity slipped past validation
    #[error("Rejected by the store: {0}")]
    CheckViolation(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and key.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for barcode collisions.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    /// Fills in the offending value of a unique violation.
    ///
    /// SQLite only names the column, so the repository adds the value it
    /// tried to write.
    pub(crate) fn with_value(self, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.to_string(),
            },
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: products.barcode"
                // "CHECK constraint failed: sale_price_cents >= 0"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Catalog Save Errors
// =============================================================================

/// Failure to save a product from a form.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The form broke a field rule; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Every allocated candidate collided with an existing barcode.
    #[error("could not allocate a free barcode after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
}

impl CatalogError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, CatalogError::Db(e) if e.is_conflict())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// Import / Export Errors
// =============================================================================

/// Whole-file failure of an import or export.
///
/// Bad rows never produce one of these; they are counted in
/// [`ImportSummary`](crate::transfer::ImportSummary).
#[derive(Debug, Error)]
pub enum TransferError {
    /// Required headers are missing; nothing was written.
    #[error("invalid import file: {0}")]
    Format(#[from] FormatError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type TransferResult<T> = Result<T, TransferError>;

// =============================================================================
// Image Asset Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image file does not exist: {0}")]
    MissingSource(String),

    #[error("could not store image: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Unit Tests
// =============================================================================
