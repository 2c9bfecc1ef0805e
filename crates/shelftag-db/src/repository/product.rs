//! # Product Repository
//!
//! The Catalog Store: every read and write of a product record.
//!
//! ## Key Operations
//! - insert / update / delete / get, keyed by barcode
//! - Substring listing across name and barcode
//! - Id high-water mark for the barcode allocator
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  id       INTEGER PRIMARY KEY AUTOINCREMENT  (store-owned, never reused)│
//! │  barcode  TEXT NOT NULL UNIQUE              (business key)              │
//! │                                                                         │
//! │  update(old_barcode, draft)                                            │
//! │     WHERE barcode = old_barcode   ← the pre-edit value                 │
//! │     SET   barcode = draft.barcode ← may change, UNIQUE still applies   │
//! │                                                                         │
//! │  delete(barcode)                                                       │
//! │     DELETE ... RETURNING image_path ──► remove_best_effort(image)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cleanup::{remove_best_effort, FileRemover, FsRemover};
use crate::error::{DbError, DbResult};
use shelftag_core::{Product, ProductDraft};

const PRODUCT_COLUMNS: &str = "id, name, quantity, purchase_price_cents, sale_price_cents, \
     expiry_date, barcode, image_path, supplier_name, supplier_phone";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let id = repo.insert(&draft).await?;
/// let product = repo.get("CB00000001").await?;
/// let matches = repo.list(Some("tea")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    remover: Arc<dyn FileRemover>,
}

impl ProductRepository {
    /// Creates a new ProductRepository that removes image files from disk.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository {
            pool,
            remover: Arc::new(FsRemover),
        }
    }

    /// Replaces the file remover used when deleting products.
    pub fn with_remover(mut self, remover: Arc<dyn FileRemover>) -> Self {
        self.remover = remover;
        self
    }

    /// Inserts a product and returns its new id.
    ///
    /// ## Returns
    /// * `Ok(id)` - Product created
    /// * `Err(DbError::UniqueViolation)` - barcode already exists
    /// * `Err(DbError::CheckViolation)` - negative price or quantity
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<i64> {
        debug!(barcode = %draft.barcode, name = %draft.name, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, quantity, purchase_price_cents, sale_price_cents,
                expiry_date, barcode, image_path, supplier_name, supplier_phone
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&draft.name)
        .bind(draft.quantity)
        .bind(draft.purchase_price_cents)
        .bind(draft.sale_price_cents)
        .bind(draft.expiry_date)
        .bind(&draft.barcode)
        .bind(&draft.image_path)
        .bind(&draft.supplier_name)
        .bind(&draft.supplier_phone)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&draft.barcode))?;

        Ok(result.last_insert_rowid())
    }

    /// Replaces every field of the product currently keyed by `old_barcode`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no product has `old_barcode`
    /// * `Err(DbError::UniqueViolation)` - `draft.barcode` belongs to a
    ///   different product
    pub async fn update(&self, old_barcode: &str, draft: &ProductDraft) -> DbResult<()> {
        debug!(old_barcode = %old_barcode, barcode = %draft.barcode, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                name = ?1,
                quantity = ?2,
                purchase_price_cents = ?3,
                sale_price_cents = ?4,
                expiry_date = ?5,
                barcode = ?6,
                image_path = ?7,
                supplier_name = ?8,
                supplier_phone = ?9
            WHERE barcode = ?10
            "#,
        )
        .bind(&draft.name)
        .bind(draft.quantity)
        .bind(draft.purchase_price_cents)
        .bind(draft.sale_price_cents)
        .bind(draft.expiry_date)
        .bind(&draft.barcode)
        .bind(&draft.image_path)
        .bind(&draft.supplier_name)
        .bind(&draft.supplier_phone)
        .bind(old_barcode)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&draft.barcode))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", old_barcode));
        }

        Ok(())
    }

    /// Deletes a product, then tries to remove its image file.
    ///
    /// The file removal is best-effort: a failure is logged and the delete
    /// still succeeds.
    pub async fn delete(&self, barcode: &str) -> DbResult<()> {
        debug!(barcode = %barcode, "Deleting product");

        let image_path: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM products WHERE barcode = ?1 RETURNING image_path")
                .bind(barcode)
                .fetch_optional(&self.pool)
                .await?;

        match image_path {
            None => Err(DbError::not_found("Product", barcode)),
            Some(image_path) => {
                if let Some(path) = image_path.filter(|p| !p.trim().is_empty()) {
                    remove_best_effort(self.remover.as_ref(), Path::new(&path), "product image");
                }
                info!(barcode = %barcode, "Product deleted");
                Ok(())
            }
        }
    }

    /// Gets a product by barcode.
    pub async fn get(&self, barcode: &str) -> DbResult<Product> {
        self.find(barcode)
            .await?
            .ok_or_else(|| DbError::not_found("Product", barcode))
    }

    /// Gets a product by barcode, `None` when absent.
    pub async fn find(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Products whose name or barcode contains `filter`, ignoring case.
    ///
    /// An empty or absent filter returns everything. Results are in
    /// insertion (id) order.
    ///
    /// Matching folds case with Unicode rules on both sides. SQLite's
    /// `lower()` and `LIKE` only fold A-Z, so the comparison runs here
    /// rather than in SQL.
    pub async fn list(&self, filter: Option<&str>) -> DbResult<Vec<Product>> {
        let needle = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);
        debug!(filter = ?needle, "Listing products");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(match needle {
            None => products,
            Some(needle) => products
                .into_iter()
                .filter(|p| {
                    contains_folded(&p.name, &needle) || contains_folded(&p.barcode, &needle)
                })
                .collect(),
        })
    }

    /// Products for the given barcodes, in id order. Unknown barcodes are
    /// skipped.
    pub async fn get_many(&self, barcodes: &[String]) -> DbResult<Vec<Product>> {
        if barcodes.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode IN ("));
        let mut separated = qb.separated(", ");
        for barcode in barcodes {
            separated.push_bind(barcode.as_str());
        }
        separated.push_unseparated(") ORDER BY id");

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Largest live id, 0 when the catalog is empty.
    pub async fn max_id(&self) -> DbResult<i64> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(max.unwrap_or(0))
    }

    /// Largest id ever handed out, including ids of deleted rows.
    ///
    /// Never decreases, so barcodes derived from it do not collide with
    /// barcodes of rows that outlived a deletion gap.
    pub async fn high_water_id(&self) -> DbResult<i64> {
        let sequence: Option<i64> =
            sqlx::query_scalar("SELECT seq FROM sqlite_sequence WHERE name = 'products'")
                .fetch_optional(&self.pool)
                .await?;

        Ok(sequence.unwrap_or(0).max(self.max_id().await?))
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// `haystack` contains the already lower-cased `needle`, ignoring case.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::RecordingRemover;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use shelftag_core::Money;
    use std::path::PathBuf;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn draft(name: &str, barcode: &str) -> ProductDraft {
        ProductDraft::new(
            name,
            10,
            Money::from_cents(1000),
            Money::from_cents(1500),
            barcode,
        )
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_fields() {
        let db = db().await;
        let repo = db.products();

        let mut d = draft("Green Tea", "6130001");
        d.expiry_date = NaiveDate::from_ymd_opt(2031, 12, 31);
        d.image_path = Some("product_images/abc.png".to_string());
        d.supplier_name = Some("Atlas".to_string());
        d.supplier_phone = Some("0550000000".to_string());

        let id = repo.insert(&d).await.unwrap();
        let product = repo.get("6130001").await.unwrap();

        assert_eq!(product.id, id);
        assert_eq!(product.to_draft(), d);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_is_conflict() {
        let db = db().await;
        let repo = db.products();

        let first = repo.insert(&draft("A", "DUP")).await;
        let second = repo.insert(&draft("B", "DUP")).await;

        assert!(first.is_ok());
        let err = second.unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "DUP"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_negative_price_rejected_by_store() {
        let db = db().await;
        let mut d = draft("A", "NEG");
        d.purchase_price_cents = -1;

        let err = db.products().insert(&d).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));
    }

    #[tokio::test]
    async fn test_update_by_old_barcode() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&draft("Tea", "OLD")).await.unwrap();

        let mut d = draft("Tea 250g", "NEW");
        d.quantity = 3;
        repo.update("OLD", &d).await.unwrap();

        assert!(repo.find("OLD").await.unwrap().is_none());
        let product = repo.get("NEW").await.unwrap();
        assert_eq!(product.name, "Tea 250g");
        assert_eq!(product.quantity, 3);
    }

    #[tokio::test]
    async fn test_update_keeping_own_barcode() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&draft("Tea", "SAME")).await.unwrap();

        repo.update("SAME", &draft("Black Tea", "SAME")).await.unwrap();
        assert_eq!(repo.get("SAME").await.unwrap().name, "Black Tea");
    }

    #[tokio::test]
    async fn test_update_errors() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&draft("A", "A1")).await.unwrap();
        repo.insert(&draft("B", "B1")).await.unwrap();

        let err = repo.update("ZZZ", &draft("Z", "ZZZ")).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.update("B1", &draft("B", "A1")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.get("B1").await.unwrap().name, "B");
    }

    #[tokio::test]
    async fn test_delete_removes_image_best_effort() {
        let db = db().await;
        let remover = Arc::new(RecordingRemover::failing());
        let repo = db.products().with_remover(remover.clone());

        let mut d = draft("A", "IMG");
        d.image_path = Some("product_images/a.png".to_string());
        repo.insert(&d).await.unwrap();
        repo.insert(&draft("B", "NOIMG")).await.unwrap();

        // removal fails, delete still succeeds
        repo.delete("IMG").await.unwrap();
        repo.delete("NOIMG").await.unwrap();

        assert_eq!(
            remover.attempts(),
            vec![PathBuf::from("product_images/a.png")]
        );
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_and_get_missing() {
        let db = db().await;
        let repo = db.products();
        assert!(repo.delete("NOPE").await.unwrap_err().is_not_found());
        assert!(repo.get("NOPE").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_name_or_barcode_ignoring_case() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&draft("Green Tea", "X-001")).await.unwrap();
        repo.insert(&draft("Coffee", "TEA-9")).await.unwrap();
        repo.insert(&draft("Sugar", "S-1")).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Green Tea");

        let names: Vec<String> = repo
            .list(Some("tea"))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Green Tea", "Coffee"]);

        assert_eq!(repo.list(Some("  ")).await.unwrap().len(), 3);
        assert!(repo.list(Some("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&draft("A", "A1")).await.unwrap();
        repo.insert(&draft("B", "B1")).await.unwrap();

        let found = repo
            .get_many(&["B1".to_string(), "missing".to_string(), "A1".to_string()])
            .await
            .unwrap();
        let barcodes: Vec<&str> = found.iter().map(|p| p.barcode.as_str()).collect();
        assert_eq!(barcodes, vec!["A1", "B1"]);
        assert!(repo.get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_max_id_and_high_water() {
        let db = db().await;
        let repo = db.products();
        assert_eq!(repo.max_id().await.unwrap(), 0);
        assert_eq!(repo.high_water_id().await.unwrap(), 0);

        repo.insert(&draft("A", "A1")).await.unwrap();
        repo.insert(&draft("B", "B1")).await.unwrap();
        repo.delete("B1").await.unwrap();

        assert_eq!(repo.max_id().await.unwrap(), 1);
        assert_eq!(repo.high_water_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_filter_folds_non_ascii_case() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&draft("Éclair", "E1")).await.unwrap();
        repo.insert(&draft("Çay Demlik", "E2")).await.unwrap();
        repo.insert(&draft("Eclair", "E3")).await.unwrap();

        let barcodes = |products: Vec<Product>| -> Vec<String> {
            products.into_iter().map(|p| p.barcode).collect()
        };

        assert_eq!(barcodes(repo.list(Some("Éclair")).await.unwrap()), vec!["E1"]);
        assert_eq!(barcodes(repo.list(Some("éclair")).await.unwrap()), vec!["E1"]);
        assert_eq!(barcodes(repo.list(Some("ÉCLAIR")).await.unwrap()), vec!["E1"]);
        assert_eq!(barcodes(repo.list(Some("çay")).await.unwrap()), vec!["E2"]);
        assert_eq!(barcodes(repo.list(Some("e")).await.unwrap()), vec!["E1", "E2", "E3"]);
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Green Tea", "tea"));
        assert!(contains_folded("ÉCLAIR", "éclair"));
        assert!(contains_folded("50%_off", "%_"));
        assert!(!contains_folded("Coffee", "tea"));
    }
}
