//! # Domain Types
//!
//! The catalog has a single entity: the product.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                │
//! │  │   ProductDraft      │ insert │      Product        │                │
//! │  │  ─────────────────  │ ─────► │  ─────────────────  │                │
//! │  │  name               │        │  id (store-owned)   │                │
//! │  │  quantity           │        │  + every draft field│                │
//! │  │  purchase/sale cents│        │                     │                │
//! │  │  expiry_date?       │        └─────────────────────┘                │
//! │  │  barcode            │                                                │
//! │  │  image_path?        │                                                │
//! │  │  supplier name/phone│                                                │
//! │  └─────────────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: integer assigned by the store, monotonically increasing, never reused
//! - `barcode`: business identifier, globally unique, may change on edit

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,

    /// Display name printed on labels and tags.
    pub name: String,

    /// Units in stock (never negative).
    pub quantity: i64,

    /// Purchase price in cents.
    pub purchase_price_cents: i64,

    /// Sale price in cents.
    pub sale_price_cents: i64,

    /// Optional expiry date.
    pub expiry_date: Option<NaiveDate>,

    /// Globally unique barcode.
    pub barcode: String,

    /// Path of an externally stored image; the store never reads the bytes.
    pub image_path: Option<String>,

    pub supplier_name: Option<String>,

    pub supplier_phone: Option<String>,
}

impl Product {
    /// Returns the purchase price as a Money type.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Returns the sale price as a Money type.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns every field except `id`, as a draft.
    ///
    /// Handy for edits: load, modify the draft, `update(old_barcode, draft)`.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            quantity: self.quantity,
            purchase_price_cents: self.purchase_price_cents,
            sale_price_cents: self.sale_price_cents,
            expiry_date: self.expiry_date,
            barcode: self.barcode.clone(),
            image_path: self.image_path.clone(),
            supplier_name: self.supplier_name.clone(),
            supplier_phone: self.supplier_phone.clone(),
        }
    }
}

// =============================================================================
// Product Draft
// =============================================================================

/// A product about to be written (insert or full-record update).
///
/// The barcode is already decided at this point: either user-supplied or
/// produced by the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub quantity: i64,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub expiry_date: Option<NaiveDate>,
    pub barcode: String,
    pub image_path: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
}

impl ProductDraft {
    /// Creates a draft with the required fields; optional fields are absent.
    pub fn new(
        name: impl Into<String>,
        quantity: i64,
        purchase_price: Money,
        sale_price: Money,
        barcode: impl Into<String>,
    ) -> Self {
        ProductDraft {
            name: name.into(),
            quantity,
            purchase_price_cents: purchase_price.cents(),
            sale_price_cents: sale_price.cents(),
            expiry_date: None,
            barcode: barcode.into(),
            image_path: None,
            supplier_name: None,
            supplier_phone: None,
        }
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }
}

/// Turns an empty (after trimming) string into `None`.
///
/// Optional text fields are stored as NULL rather than `""` so that export
/// (absent → empty cell) and import (empty cell → absent) agree.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
