//! # Catalog Save Service
//!
//! Turns a user-typed [`ProductForm`] into a stored product:
//!
//! ```text
//! ProductForm ──validate(today)──► ValidProduct ──┬─ barcode typed ──► insert / update
//!                  │                              └─ barcode blank ──► allocator loop
//!                  ▼
//!          ValidationError (nothing written)
//! ```

use chrono::NaiveDate;
use tracing::info;

use crate::allocator::BarcodeAllocator;
use crate::error::CatalogResult;
use crate::repository::product::ProductRepository;
use shelftag_core::validation::{ProductForm, ValidProduct};
use shelftag_core::Product;

/// Creates and edits products from forms.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: ProductRepository,
    allocator: BarcodeAllocator,
}

impl Catalog {
    pub fn new(products: ProductRepository) -> Self {
        Catalog {
            allocator: BarcodeAllocator::new(products.clone()),
            products,
        }
    }

    /// Validates and inserts a new product.
    ///
    /// A typed barcode that already exists fails with a conflict; a blank
    /// one is allocated.
    pub async fn create(&self, form: &ProductForm, today: NaiveDate) -> CatalogResult<Product> {
        let valid = form.validate(today)?;

        let barcode = match valid.barcode.clone() {
            Some(barcode) => {
                self.products.insert(&valid.into_draft(barcode.clone())).await?;
                barcode
            }
            None => self.insert_allocated(valid).await?,
        };

        info!(barcode = %barcode, "Product created");
        Ok(self.products.get(&barcode).await?)
    }

    /// Validates the form and replaces the product keyed by `old_barcode`.
    pub async fn edit(
        &self,
        old_barcode: &str,
        form: &ProductForm,
        today: NaiveDate,
    ) -> CatalogResult<Product> {
        let valid = form.validate(today)?;

        let barcode = match valid.barcode.clone() {
            Some(barcode) => {
                self.products
                    .update(old_barcode, &valid.into_draft(barcode.clone()))
                    .await?;
                barcode
            }
            None => {
                let products = self.products.clone();
                let old_barcode = old_barcode.to_string();
                self.allocator
                    .write_with_allocation(|barcode| {
                        let products = products.clone();
                        let old_barcode = old_barcode.clone();
                        let draft = valid.clone().into_draft(barcode.clone());
                        async move {
                            products.update(&old_barcode, &draft).await.map(|_| barcode)
                        }
                    })
                    .await?
            }
        };

        info!(old_barcode = %old_barcode, barcode = %barcode, "Product updated");
        Ok(self.products.get(&barcode).await?)
    }

    async fn insert_allocated(&self, valid: ValidProduct) -> CatalogResult<String> {
        let products = self.products.clone();
        self.allocator
            .write_with_allocation(|barcode| {
                let products = products.clone();
                let draft = valid.clone().into_draft(barcode.clone());
                async move { products.insert(&draft).await.map(|_| barcode) }
            })
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
