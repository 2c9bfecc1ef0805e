//! # Error Types
//!
//! Domain-specific error types for shelftag-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelftag-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Bad field value, never reaches the store       │
//! │  └── FormatError      - Import source unusable (aborts the import)     │
//! │                                                                         │
//! │  shelftag-db errors (separate crate)                                   │
//! │  └── DbError          - Conflict / NotFound / storage failures         │
//! │                                                                         │
//! │  shelftag-print errors (separate crate)                                │
//! │  └── PrintError       - Hardware (→ fallback) / raster / IO            │
//! │                                                                         │
//! │  Flow: ValidationError → CatalogError → CLI report                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, field, value)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A barcode contains characters the selected symbology cannot encode.
    ///
    /// ## When This Occurs
    /// - CODE128 subset B only covers printable ASCII (space through `~`)
    /// - A barcode with Arabic digits or a tab character cannot be drawn
    #[error("Barcode '{barcode}' cannot be encoded: {reason}")]
    InvalidBarcode { barcode: String, reason: String },

    /// Nothing to encode.
    #[error("Barcode data is empty")]
    EmptySymbol,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// They are raised by the validation layer and never by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric price, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Sale price lower than purchase price.
    #[error("sale price ({sale}) must be greater than or equal to purchase price ({purchase})")]
    SalePriceBelowPurchase { sale: String, purchase: String },

    /// Expiry date before the save date.
    #[error("expiry date {expiry} is in the past")]
    ExpiryInPast { expiry: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Format Error
// =============================================================================

/// The import source as a whole is unusable.
///
/// Raised before any row is written; a `FormatError` aborts the import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// One or more required header names are absent.
    #[error("missing required column(s): {}", missing.join(", "))]
    MissingHeaders { missing: Vec<String> },

    /// The source has no header row at all.
    #[error("import source is empty (no header row)")]
    EmptySource,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
