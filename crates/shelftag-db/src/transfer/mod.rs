//! # Import/Export Reconciler
//!
//! Moves the catalog in and out of CSV.
//!
//! ## Shape of the Exchange File
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ name,quantity,purchase_price,sale_price,expiry_date,barcode,            │
//! │      supplier_name,supplier_phone                                       │
//! │ Green Tea,24,150.00,200.00,2030-01-31,CB00000001,Atlas,0550123456       │
//! │ Sugar 1kg,80,95.00,110.00,,CB00000002,,                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Export always writes this header in this order. Import locates columns by
//! name in any order; only the first four are required.
//!
//! ## Failure Model
//! - Missing required header → [`TransferError::Format`](crate::error::TransferError::Format), nothing written
//! - Bad row → counted in [`ImportSummary::skipped`], batch continues
//! - Storage failure other than a conflict → import stops with the error,
//!   rows already committed stay committed

mod export;
mod import;

use std::fmt;

use crate::allocator::BarcodeAllocator;
use crate::repository::product::ProductRepository;

/// Counts reported by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows inserted into the catalog.
    pub imported: usize,
    /// Rows skipped as malformed or conflicting.
    pub skipped: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} imported, {} skipped", self.imported, self.skipped)
    }
}

/// CSV import and export against one catalog.
#[derive(Debug, Clone)]
pub struct Reconciler {
    products: ProductRepository,
    allocator: BarcodeAllocator,
}

impl Reconciler {
    pub fn new(products: ProductRepository) -> Self {
        Reconciler {
            allocator: BarcodeAllocator::new(products.clone()),
            products,
        }
    }
}
