//! # shelftag-db: Catalog Store for shelftag
//!
//! This crate provides every stateful catalog operation: the SQLite store,
//! barcode allocation, form saves, CSV import/export and image files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        shelftag Data Flow                               │
//! │                                                                         │
//! │  CLI (add / import / export / delete)     shelftag-print (lookups)     │
//! │       │                                        │                        │
//! │       ▼                                        ▼                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shelftag-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │  Catalog   │  │ Reconciler │  │ ImageStore│  │ cleanup  │  │   │
//! │  │   │ (forms)    │  │ (CSV)      │  │ (intake)  │  │(best-eff)│  │   │
//! │  │   └─────┬──────┘  └─────┬──────┘  └───────────┘  └────▲─────┘  │   │
//! │  │         └───────┬───────┘                             │        │   │
//! │  │                 ▼                                     │        │   │
//! │  │   ┌──────────────────┐    ┌───────────────────┐       │        │   │
//! │  │   │ BarcodeAllocator │───►│ ProductRepository │───────┘        │   │
//! │  │   └──────────────────┘    └─────────┬─────────┘                │   │
//! │  │                                     │      Migrations           │   │
//! │  └─────────────────────────────────────┼───────────────────────────┘   │
//! │                                        ▼                                │
//! │                             SQLite (shelftag.db)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Error types for every service in this crate
//! - [`repository`] - The Catalog Store
//! - [`allocator`] - Barcode allocation with conflict retry
//! - [`catalog`] - Validate-then-save for typed-in products
//! - [`transfer`] - CSV import and export
//! - [`assets`] - Image file intake
//! - [`cleanup`] - Best-effort file removal
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelftag_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shelftag.db")).await?;
//!
//! let summary = db.reconciler().import_file("products.csv".as_ref()).await?;
//! println!("{} imported, {} skipped", summary.imported, summary.skipped);
//!
//! let teas = db.products().list(Some("tea")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod assets;
pub mod catalog;
pub mod cleanup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod transfer;

// =============================================================================
// Re-exports
// =============================================================================

pub use allocator::BarcodeAllocator;
pub use assets::ImageStore;
pub use catalog::Catalog;
pub use cleanup::{remove_best_effort, FileRemover, FsRemover, RecordingRemover};
pub use error::{AssetError, CatalogError, DbError, DbResult, TransferError};
pub use pool::{Database, DbConfig};
pub use repository::product::ProductRepository;
pub use transfer::{ImportSummary, Reconciler};
