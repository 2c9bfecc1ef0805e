//! # shelftag-core: Pure Business Logic for shelftag
//!
//! This crate is the **heart** of shelftag. It contains the catalog rules,
//! the barcode policy and the label geometry as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        shelftag Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CLI (apps/cli)                               │   │
//! │  │    add ──► import ──► export ──► labels ──► listing ──► tag     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           shelftag-print (ESC/POS + raster fallback)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           shelftag-db (SQLite catalog, CSV reconciler)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelftag-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌────────┐ ┌──────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │  types  │ │ money  │ │validation│ │ barcode │ │ geometry │ │   │
//! │  │   │ Product │ │ Money  │ │   form   │ │ CB+seq  │ │ profiles │ │   │
//! │  │   └─────────┘ └────────┘ └──────────┘ └─────────┘ └──────────┘ │   │
//! │  │                      ┌──────────┐                               │   │
//! │  │                      │ columns  │ CSV header map, row parsing   │   │
//! │  │                      └──────────┘                               │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, ProductDraft)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Form validation before anything reaches the store
//! - [`barcode`] - Barcode allocation format and CODE128 symbol encoding
//! - [`columns`] - Import header resolution and row interpretation
//! - [`geometry`] - Label Geometry Engine (paper profiles → rectangles)
//!
//! ## Example Usage
//!
//! ```rust
//! use shelftag_core::barcode::allocated_barcode;
//! use shelftag_core::money::Money;
//!
//! assert_eq!(allocated_barcode(0), "CB00000001");
//!
//! let price = Money::parse("1,250.5").unwrap();
//! assert_eq!(price.cents(), 125050);
//! assert_eq!(price.to_string(), "1,250.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod columns;
pub mod error;
pub mod geometry;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, FormatError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of every barcode the allocator generates.
pub const ALLOCATED_BARCODE_PREFIX: &str = "CB";

/// Zero-padded width of the numeric part of an allocated barcode.
pub const ALLOCATED_BARCODE_DIGITS: usize = 8;

/// Largest stock quantity a product form accepts.
pub const MAX_QUANTITY: i64 = 999_999;

/// Largest price (in cents) a product form accepts: 9,999,999.00
pub const MAX_PRICE_CENTS: i64 = 999_999_900;
