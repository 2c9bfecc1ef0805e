//! # Validation Module
//!
//! Input validation for manual product entry.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form / CLI input                                             │
//! │  └── Raw text: "1,250.50", "12", "2030-01-31"                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Parsing (quantity, prices)                                        │
//! │  ├── Field rules (non-empty name, positive prices)                     │
//! │  └── Cross-field rules (sale ≥ purchase, expiry ≥ today)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(barcode)                                                   │
//! │  └── CHECK(prices ≥ 0, quantity ≥ 0)                                   │
//! │                                                                         │
//! │  A ValidationError never reaches the store.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use shelftag_core::validation::ProductForm;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
//! let form = ProductForm {
//!     name: "Green Tea".into(),
//!     quantity: "24".into(),
//!     purchase_price: "150".into(),
//!     sale_price: "200".into(),
//!     ..ProductForm::default()
//! };
//! let valid = form.validate(today).unwrap();
//! assert!(valid.barcode.is_none()); // allocator will assign one
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{non_empty, ProductDraft};
use crate::{MAX_PRICE_CENTS, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted user-supplied barcode.
pub const MAX_BARCODE_LEN: usize = 64;

// =============================================================================
// Product Form
// =============================================================================

/// Raw product input as typed by a user.
///
/// Numeric fields are kept as text so parsing failures surface as
/// `ValidationError`s with the offending field named.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub quantity: String,
    pub purchase_price: String,
    pub sale_price: String,
    pub expiry_date: Option<NaiveDate>,
    /// Blank means "allocate one".
    pub barcode: String,
    pub image_path: Option<String>,
    pub supplier_name: String,
    pub supplier_phone: String,
}

/// A form that passed every rule; only the barcode may still be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub quantity: i64,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub expiry_date: Option<NaiveDate>,
    pub barcode: Option<String>,
    pub image_path: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
}

impl ValidProduct {
    /// Completes the product with its final barcode.
    pub fn into_draft(self, barcode: String) -> ProductDraft {
        ProductDraft {
            name: self.name,
            quantity: self.quantity,
            purchase_price_cents: self.purchase_price.cents(),
            sale_price_cents: self.sale_price.cents(),
            expiry_date: self.expiry_date,
            barcode,
            image_path: self.image_path,
            supplier_name: self.supplier_name,
            supplier_phone: self.supplier_phone,
        }
    }
}

impl ProductForm {
    /// Runs every rule against the form.
    ///
    /// `today` is passed in rather than read from the clock so the function
    /// stays pure.
    pub fn validate(&self, today: NaiveDate) -> ValidationResult<ValidProduct> {
        let name = validate_product_name(&self.name)?;
        let quantity = parse_quantity(&self.quantity)?;
        let purchase_price = parse_price("purchase_price", &self.purchase_price)?;
        let sale_price = parse_price("sale_price", &self.sale_price)?;

        if sale_price < purchase_price {
            return Err(ValidationError::SalePriceBelowPurchase {
                sale: sale_price.to_string(),
                purchase: purchase_price.to_string(),
            });
        }

        if let Some(expiry) = self.expiry_date {
            validate_expiry(expiry, today)?;
        }

        let barcode = non_empty(&self.barcode);
        if let Some(ref bc) = barcode {
            validate_barcode(bc)?;
        }

        let supplier_phone = non_empty(&self.supplier_phone);
        if let Some(ref phone) = supplier_phone {
            validate_phone(phone)?;
        }

        Ok(ValidProduct {
            name,
            quantity,
            purchase_price,
            sale_price,
            expiry_date: self.expiry_date,
            barcode,
            image_path: self.image_path.as_deref().and_then(non_empty),
            supplier_name: non_empty(&self.supplier_name),
            supplier_phone,
        })
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use shelftag_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Green Tea").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Parses a stock quantity: integer, thousands separators allowed, 0..=999,999.
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ValidationError::required("quantity"));
    }

    let qty: i64 = cleaned
        .parse()
        .map_err(|_| ValidationError::invalid_format("quantity", "must be a whole number"))?;

    if !(0..=MAX_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }

    Ok(qty)
}

/// Parses a price that must be strictly positive and at most 9,999,999.
pub fn parse_price(field: &str, text: &str) -> ValidationResult<Money> {
    if text.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    let price = Money::parse(text).map_err(|e| ValidationError::invalid_format(field, e.to_string()))?;

    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS / 100,
        });
    }

    Ok(price)
}

/// Rejects expiry dates before `today`. Today itself is accepted.
pub fn validate_expiry(expiry: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    if expiry < today {
        return Err(ValidationError::ExpiryInPast {
            expiry: expiry.to_string(),
        });
    }
    Ok(())
}

/// Validates a user-supplied barcode.
///
/// ## Rules
/// - At most 64 characters
/// - No whitespace inside
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "barcode",
            "must not contain spaces",
        ));
    }

    Ok(())
}

/// Supplier phone numbers are digits only.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "supplier_phone",
            "must contain digits only",
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
