//! # Identifier Allocator
//!
//! Produces a barcode when the caller did not supply one.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  high_water_id() ──► allocation_candidate(hw, 0) ──► write              │
//! │                                                       │                 │
//! │                           UniqueViolation ◄───────────┘                 │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │            allocation_candidate(hw, 1), (hw, 2), ...                    │
//! │            up to MAX_ALLOCATION_ATTEMPTS, then AllocationExhausted      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No lock is taken. Two writers computing the same candidate are separated
//! by the store's UNIQUE(barcode) constraint; the loser moves on to the next
//! candidate.

use std::future::Future;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult, DbResult};
use crate::repository::product::ProductRepository;
use shelftag_core::barcode::allocation_candidate;

/// Candidates tried before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 16;

/// Derives barcodes from the catalog's id high-water mark.
#[derive(Debug, Clone)]
pub struct BarcodeAllocator {
    products: ProductRepository,
}

impl BarcodeAllocator {
    pub fn new(products: ProductRepository) -> Self {
        BarcodeAllocator { products }
    }

    /// The barcode the next write without one would try first.
    pub async fn next(&self) -> DbResult<String> {
        let high_water = self.products.high_water_id().await?;
        Ok(allocation_candidate(high_water, 0))
    }

    /// Runs `write` with successive candidates until one is not a conflict.
    ///
    /// Any error other than a conflict is returned as-is.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let (id, barcode) = allocator
    ///     .write_with_allocation(|barcode| {
    ///         let repo = repo.clone();
    ///         let draft = valid.clone().into_draft(barcode.clone());
    ///         async move { repo.insert(&draft).await.map(|id| (id, barcode)) }
    ///     })
    ///     .await?;
    /// ```
    pub async fn write_with_allocation<T, F, Fut>(&self, mut write: F) -> CatalogResult<T>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = DbResult<T>>,
    {
        let high_water = self.products.high_water_id().await?;

        for attempt in 0..MAX_ALLOCATION_ATTEMPTS {
            let candidate = allocation_candidate(high_water, attempt);
            match write(candidate.clone()).await {
                Ok(value) => {
                    debug!(barcode = %candidate, attempt, "Allocated barcode");
                    return Ok(value);
                }
                Err(e) if e.is_conflict() => {
                    debug!(barcode = %candidate, attempt, "Allocated barcode already taken");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CatalogError::AllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
