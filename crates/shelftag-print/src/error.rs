//! Error types for printing.

use shelftag_core::CoreError;
use shelftag_db::DbError;
use thiserror::Error;

/// Printing error types.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The thermal printer could not be acquired or rejected a write.
    #[error("Printer unavailable: {0}")]
    Hardware(String),

    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer or job configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A barcode raster could not be produced.
    #[error("Barcode raster failed: {0}")]
    Raster(String),

    /// IO error reading or writing scratch files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Product lookup failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A barcode could not be encoded.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Label text the thermal printer's code page cannot show.
    #[error("Not printable on the thermal printer: {0}")]
    Unprintable(String),

    /// The job was abandoned between copies.
    #[error("Print job cancelled")]
    Cancelled,

    /// The request selects no copies at all.
    #[error("Nothing to print")]
    NothingToPrint,
}

impl PrintError {
    /// Errors after which a label job is rendered as pages instead.
    ///
    /// Any failure of the thermal printer tier qualifies: a missing or
    /// failing device, and a job the device cannot encode. Cancellation,
    /// an empty request and store failures end the job on either tier.
    pub fn falls_back(&self) -> bool {
        !matches!(
            self,
            PrintError::Cancelled | PrintError::NothingToPrint | PrintError::Db(_)
        )
    }
}

/// Result type for printing operations
pub type PrintResult<T> = Result<T, PrintError>;
