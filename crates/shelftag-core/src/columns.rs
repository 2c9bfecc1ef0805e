//! # Columns Module
//!
//! Interpretation of the tabular exchange format, without touching files.
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  header row ──► ColumnMap::resolve ──► FormatError (abort, no writes)   │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │  each data row ──► ColumnMap::parse_row ──► ImportRow                  │
//! │                                     └────► RowError (count, skip)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mapping is built once from the header. Optional columns are either
//! `Some(index)` or `None` for the whole file; a short row simply reads an
//! optional field as absent.

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::FormatError;
use crate::money::Money;
use crate::types::{non_empty, Product, ProductDraft};

/// Header names an import cannot do without, in export order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "quantity", "purchase_price", "sale_price"];

/// Header names located when present.
pub const OPTIONAL_COLUMNS: [&str; 4] = ["expiry_date", "barcode", "supplier_name", "supplier_phone"];

/// The fixed export header. Uses the same names import looks for.
pub const EXPORT_HEADER: [&str; 8] = [
    "name",
    "quantity",
    "purchase_price",
    "sale_price",
    "expiry_date",
    "barcode",
    "supplier_name",
    "supplier_phone",
];

/// Date formats tried in order by [`coerce_date`].
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

// =============================================================================
// Column Map
// =============================================================================

/// Field positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub quantity: usize,
    pub purchase_price: usize,
    pub sale_price: usize,
    pub expiry_date: Option<usize>,
    pub barcode: Option<usize>,
    pub supplier_name: Option<usize>,
    pub supplier_phone: Option<usize>,
}

impl ColumnMap {
    /// Locates every known column by name.
    ///
    /// Names are compared after trimming whitespace and a leading UTF-8 BOM,
    /// ignoring ASCII case. The first occurrence of a duplicated name wins.
    ///
    /// ## Example
    /// ```rust
    /// use shelftag_core::columns::ColumnMap;
    ///
    /// let map = ColumnMap::resolve(["barcode", "Name", "sale_price", "quantity", "purchase_price"])
    ///     .unwrap();
    /// assert_eq!(map.name, 1);
    /// assert_eq!(map.barcode, Some(0));
    /// assert_eq!(map.expiry_date, None);
    /// ```
    pub fn resolve<I, S>(headers: I) -> Result<ColumnMap, FormatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(FormatError::EmptySource);
        }

        let find = |wanted: &str| headers.iter().position(|h| h == wanted);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| find(**col).is_none())
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FormatError::MissingHeaders { missing });
        }

        // Every required column was found above.
        let required = |wanted: &str| find(wanted).unwrap_or_default();

        Ok(ColumnMap {
            name: required("name"),
            quantity: required("quantity"),
            purchase_price: required("purchase_price"),
            sale_price: required("sale_price"),
            expiry_date: find("expiry_date"),
            barcode: find("barcode"),
            supplier_name: find("supplier_name"),
            supplier_phone: find("supplier_phone"),
        })
    }

    /// Fewest fields a row must carry to reach every required column.
    pub fn min_fields(&self) -> usize {
        [self.name, self.quantity, self.purchase_price, self.sale_price]
            .into_iter()
            .max()
            .unwrap_or_default()
            + 1
    }

    /// Interprets one data row.
    pub fn parse_row<S: AsRef<str>>(&self, fields: &[S]) -> Result<ImportRow, RowError> {
        if fields.len() < self.min_fields() {
            return Err(RowError::TooFewFields {
                found: fields.len(),
                required: self.min_fields(),
            });
        }

        let required = |index: usize, column: &'static str| {
            let value = fields[index].as_ref().trim();
            if value.is_empty() {
                Err(RowError::EmptyField(column))
            } else {
                Ok(value)
            }
        };
        let optional = |index: Option<usize>| {
            index
                .and_then(|i| fields.get(i))
                .and_then(|v| non_empty(v.as_ref()))
        };

        let name = required(self.name, "name")?;
        let quantity = required(self.quantity, "quantity")?;
        let purchase = required(self.purchase_price, "purchase_price")?;
        let sale = required(self.sale_price, "sale_price")?;

        Ok(ImportRow {
            name: name.to_string(),
            quantity: parse_row_quantity(quantity)?,
            purchase_price: parse_row_price("purchase_price", purchase)?,
            sale_price: parse_row_price("sale_price", sale)?,
            expiry_date: optional(self.expiry_date).and_then(|d| coerce_date(&d)),
            barcode: optional(self.barcode),
            supplier_name: optional(self.supplier_name),
            supplier_phone: optional(self.supplier_phone),
        })
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Why a data row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row has {found} field(s), at least {required} required")]
    TooFewFields { found: usize, required: usize },

    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("quantity '{0}' is not a non-negative integer")]
    BadQuantity(String),

    #[error("{field} '{value}' is not a positive amount")]
    BadPrice { field: &'static str, value: String },
}

/// A data row that passed every per-row rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub name: String,
    pub quantity: i64,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub expiry_date: Option<NaiveDate>,
    /// `None` when the column is absent or the cell is blank.
    pub barcode: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
}

impl ImportRow {
    pub fn into_draft(self, barcode: String) -> ProductDraft {
        ProductDraft {
            name: self.name,
            quantity: self.quantity,
            purchase_price_cents: self.purchase_price.cents(),
            sale_price_cents: self.sale_price.cents(),
            expiry_date: self.expiry_date,
            barcode,
            image_path: None,
            supplier_name: self.supplier_name,
            supplier_phone: self.supplier_phone,
        }
    }
}

fn parse_row_quantity(text: &str) -> Result<i64, RowError> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<i64>() {
        Ok(qty) if qty >= 0 => Ok(qty),
        _ => Err(RowError::BadQuantity(text.to_string())),
    }
}

/// Prices are rounded to cents before the positivity check, so an amount
/// below half a cent ("0.004") is zero and rejected.
fn parse_row_price(field: &'static str, text: &str) -> Result<Money, RowError> {
    match Money::parse(text) {
        Ok(price) if price.is_positive() => Ok(price),
        _ => Err(RowError::BadPrice {
            field,
            value: text.to_string(),
        }),
    }
}

/// Lenient expiry parsing: `DD/MM/YYYY`, then `YYYY-MM-DD`, else absent.
///
/// ## Example
/// ```rust
/// use shelftag_core::columns::coerce_date;
///
/// assert_eq!(coerce_date("15/03/2025"), coerce_date("2025-03-15"));
/// assert!(coerce_date("15/03/2025").is_some());
/// assert_eq!(coerce_date("not-a-date"), None);
/// ```
pub fn coerce_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

// =============================================================================
// Export
// =============================================================================

/// One product as the eight export fields; absent values become `""`.
pub fn export_record(product: &Product) -> [String; 8] {
    [
        product.name.clone(),
        product.quantity.to_string(),
        product.purchase_price().plain(),
        product.sale_price().plain(),
        product
            .expiry_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        product.barcode.clone(),
        product.supplier_name.clone().unwrap_or_default(),
        product.supplier_phone.clone().unwrap_or_default(),
    ]
}

// =============================================================================
// Unit Tests
// =============================================================================
