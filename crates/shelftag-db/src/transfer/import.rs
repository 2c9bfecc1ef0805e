//! CSV import.

use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::{ImportSummary, Reconciler};
use crate::error::{CatalogError, DbError, TransferError, TransferResult};
use shelftag_core::columns::{ColumnMap, ImportRow};

/// What happened to one row that parsed.
enum RowWrite {
    Inserted(String),
    Rejected(String),
}

impl Reconciler {
    /// Imports every row of the CSV file at `path`.
    pub async fn import_file(&self, path: &Path) -> TransferResult<ImportSummary> {
        info!(path = %path.display(), "Importing products");
        let bytes = tokio::fs::read(path).await?;
        self.import_reader(bytes.as_slice()).await
    }

    /// Imports CSV text with a header row.
    ///
    /// Rows are processed in order; each allocated barcode sees the rows
    /// committed before it.
    pub async fn import_reader<R: Read>(&self, source: R) -> TransferResult<ImportSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let columns = ColumnMap::resolve(reader.headers()?.iter())?;
        debug!(?columns, "Resolved import columns");

        let mut summary = ImportSummary::default();

        for (index, record) in reader.records().enumerate() {
            // header is line 1
            let line = index + 2;

            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(TransferError::Csv(e)),
                Err(e) => {
                    debug!(line, error = %e, "Skipping unreadable row");
                    summary.skipped += 1;
                    continue;
                }
            };

            let fields: Vec<&str> = record.iter().collect();
            let row = match columns.parse_row(&fields) {
                Ok(row) => row,
                Err(reason) => {
                    debug!(line, %reason, "Skipping malformed row");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.write_row(row).await? {
                RowWrite::Inserted(barcode) => {
                    debug!(line, barcode = %barcode, "Imported row");
                    summary.imported += 1;
                }
                RowWrite::Rejected(reason) => {
                    debug!(line, %reason, "Skipping rejected row");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Import finished"
        );

        Ok(summary)
    }

    /// Inserts one parsed row, allocating a barcode when the row has none.
    async fn write_row(&self, row: ImportRow) -> TransferResult<RowWrite> {
        let outcome = match row.barcode.clone() {
            Some(barcode) => self
                .products
                .insert(&row.into_draft(barcode.clone()))
                .await
                .map(|_| barcode)
                .map_err(CatalogError::Db),
            None => {
                let products = self.products.clone();
                self.allocator
                    .write_with_allocation(|barcode| {
                        let products = products.clone();
                        let draft = row.clone().into_draft(barcode.clone());
                        async move { products.insert(&draft).await.map(|_| barcode) }
                    })
                    .await
            }
        };

        match outcome {
            Ok(barcode) => Ok(RowWrite::Inserted(barcode)),
            Err(CatalogError::Db(e @ (DbError::UniqueViolation { .. } | DbError::CheckViolation(_)))) => {
                Ok(RowWrite::Rejected(e.to_string()))
            }
            Err(e @ CatalogError::AllocationExhausted { .. }) => Ok(RowWrite::Rejected(e.to_string())),
            Err(CatalogError::Db(e)) => Err(TransferError::Db(e)),
            Err(CatalogError::Validation(e)) => Ok(RowWrite::Rejected(e.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::TransferError;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use shelftag_core::FormatError;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_ten_rows_one_bad_quantity() {
        let db = db().await;
        let mut csv = String::from("name,quantity,purchase_price,sale_price\n");
        for i in 1..=10 {
            let qty = if i == 5 { "-3".to_string() } else { i.to_string() };
            csv.push_str(&format!("Item {i},{qty},10,12\n"));
        }

        let summary = db.reconciler().import_reader(csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported, 9);
        assert_eq!(summary.skipped, 1);
        assert_eq!(db.products().count().await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_missing_header_writes_nothing() {
        let db = db().await;
        let csv = "name,purchase_price,sale_price\nTea,1,2\n";

        let err = db.reconciler().import_reader(csv.as_bytes()).await.unwrap_err();
        match err {
            TransferError::Format(FormatError::MissingHeaders { missing }) => {
                assert_eq!(missing, vec!["quantity".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let db = db().await;
        let err = db.reconciler().import_reader("".as_bytes()).await.unwrap_err();
        assert!(matches!(err, TransferError::Format(FormatError::EmptySource)));
    }

    #[tokio::test]
    async fn test_columns_in_any_order_with_optionals() {
        let db = db().await;
        let csv = "\
barcode,sale_price,name,expiry_date,quantity,purchase_price
6130001,2.50,Tea,15/03/2030,4,2
,3,Coffee,2030-03-15,1,2
,3,Sugar,soon,1,2
";
        let summary = db.reconciler().import_reader(csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped, 0);

        let tea = db.products().get("6130001").await.unwrap();
        assert_eq!(tea.sale_price_cents, 250);
        assert_eq!(tea.expiry_date, NaiveDate::from_ymd_opt(2030, 3, 15));

        // allocation sees the rows committed before it
        let coffee = db.products().get("CB00000002").await.unwrap();
        assert_eq!(coffee.name, "Coffee");
        assert_eq!(coffee.expiry_date, tea.expiry_date);

        let sugar = db.products().get("CB00000003").await.unwrap();
        assert_eq!(sugar.expiry_date, None);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_counted() {
        let db = db().await;
        let csv = "\
name,quantity,purchase_price,sale_price,barcode
Tea,1,2,3,A1
Short,1
,1,2,3,A2
Zero,1,0,3,A3
Words,one,2,3,A4
Dup,1,2,3,A1
Fine,1,2,3
";
        let summary = db.reconciler().import_reader(csv.as_bytes()).await.unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 5);
        assert_eq!(db.products().get("A1").await.unwrap().name, "Tea");
    }

    #[tokio::test]
    async fn test_import_file() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "\u{feff}Name,Quantity,Purchase_Price,Sale_Price\nTea,1,2,3\n").unwrap();

        let summary = db.reconciler().import_file(&path).await.unwrap();
        assert_eq!(summary.imported, 1);

        let missing = db.reconciler().import_file(&dir.path().join("nope.csv")).await;
        assert!(matches!(missing, Err(TransferError::Io(_))));
    }
}
