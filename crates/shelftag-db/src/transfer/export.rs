//! CSV export.

use std::io::Write;
use std::path::Path;
use tracing::info;

use super::Reconciler;
use crate::error::TransferResult;
use shelftag_core::columns::{export_record, EXPORT_HEADER};

impl Reconciler {
    /// Writes the whole catalog to `path`. Returns the number of products.
    pub async fn export_file(&self, path: &Path) -> TransferResult<usize> {
        let mut buffer = Vec::new();
        let count = self.export_writer(&mut buffer).await?;
        tokio::fs::write(path, buffer).await?;

        info!(path = %path.display(), count, "Catalog exported");
        Ok(count)
    }

    /// Writes the fixed header and one row per product, in id order.
    pub async fn export_writer<W: Write>(&self, sink: W) -> TransferResult<usize> {
        let products = self.products.list(None).await?;

        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(EXPORT_HEADER)?;
        for product in &products {
            writer.write_record(export_record(product))?;
        }
        writer.flush()?;

        Ok(products.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
