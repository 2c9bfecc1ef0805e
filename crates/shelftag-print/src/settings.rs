//! Print settings shared by every output path.

use serde::{Deserialize, Serialize};
use shelftag_core::Money;
use std::path::PathBuf;

/// Thermal printers and label stock are typically 203 dpi.
pub const DEFAULT_DPI: u32 = 203;

pub const DEFAULT_CURRENCY: &str = "DA";

/// How prices are labelled and where rasters are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Appended to every printed price.
    pub currency: String,
    /// Device units per inch for fallback pages.
    pub dpi: u32,
    /// Where temporary barcode rasters are written.
    pub scratch_dir: PathBuf,
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            currency: DEFAULT_CURRENCY.to_string(),
            dpi: DEFAULT_DPI,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl PrintSettings {
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// `"1,250.00 DA"`
    pub fn price_text(&self, price: Money) -> String {
        format!("{} {}", price, self.currency)
    }

    /// The price line under a barcode label: `"Prix: 1,250.00 DA"`.
    pub fn label_price_text(&self, price: Money) -> String {
        format!("Prix: {}", self.price_text(price))
    }
}
