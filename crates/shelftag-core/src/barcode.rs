//! # Barcode Module
//!
//! Two unrelated-looking jobs that both answer "what goes in the bars":
//!
//! 1. **Allocation format** - the text of a barcode the system invents when
//!    the user left the field blank: `"CB" + zeroPad(n, 8)`.
//! 2. **Symbol encoding** - turning barcode text into CODE128 bar/space
//!    modules for the raster fallback path.
//!
//! ## Allocation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  high-water id (from store) ──► +1 ──► "CB" + 8 digits                  │
//! │                                                                         │
//! │     0 ──► CB00000001                                                    │
//! │     1 ──► CB00000002                                                    │
//! │   123 ──► CB00000124                                                    │
//! │                                                                         │
//! │  Deterministic, not random. Two concurrent allocations against the     │
//! │  same store state produce the same candidate; the store's UNIQUE       │
//! │  constraint catches that and the caller retries with the next one.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::{ALLOCATED_BARCODE_DIGITS, ALLOCATED_BARCODE_PREFIX};

// =============================================================================
// Allocation
// =============================================================================

/// First candidate barcode for a store whose id high-water mark is `last_id`.
///
/// ## Example
/// ```rust
/// use shelftag_core::barcode::allocated_barcode;
///
/// assert_eq!(allocated_barcode(0), "CB00000001");
/// assert_eq!(allocated_barcode(41), "CB00000042");
/// ```
pub fn allocated_barcode(last_id: i64) -> String {
    allocation_candidate(last_id, 0)
}

/// Candidate number `attempt` (0-based) after a conflict on earlier ones.
pub fn allocation_candidate(last_id: i64, attempt: u32) -> String {
    let next = last_id.max(0) + 1 + i64::from(attempt);
    format!(
        "{}{:0width$}",
        ALLOCATED_BARCODE_PREFIX,
        next,
        width = ALLOCATED_BARCODE_DIGITS
    )
}

// =============================================================================
// Symbology
// =============================================================================

/// Barcode symbologies the printers are asked to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbology {
    Code128,
}

impl Symbology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Code128 => "CODE128",
        }
    }
}

// =============================================================================
// CODE128 Encoding
// =============================================================================

/// Bar/space widths for every CODE128 symbol value (0..=105) plus STOP.
///
/// Each entry alternates bar, space, bar, ... starting with a bar.
const CODE128_PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

const START_B: usize = 104;
const STOP: usize = 106;

/// Encodes `data` as CODE128 subset B and returns the symbol values,
/// start code and checksum included, stop excluded.
pub fn code128_values(data: &str) -> CoreResult<Vec<usize>> {
    if data.is_empty() {
        return Err(CoreError::EmptySymbol);
    }

    let mut values = Vec::with_capacity(data.len() + 2);
    values.push(START_B);

    for ch in data.chars() {
        let code = ch as u32;
        if !(32..=126).contains(&code) {
            return Err(CoreError::InvalidBarcode {
                barcode: data.to_string(),
                reason: format!("character {:?} is outside CODE128 subset B", ch),
            });
        }
        values.push((code - 32) as usize);
    }

    let checksum = values
        .iter()
        .enumerate()
        .map(|(pos, v)| if pos == 0 { *v } else { v * pos })
        .sum::<usize>()
        % 103;
    values.push(checksum);

    Ok(values)
}

/// Encodes `data` into a flat run of modules (`true` = dark), without quiet
/// zones. The length is `11 × (symbols + 2) + 13`.
///
/// ## Example
/// ```rust
/// use shelftag_core::barcode::code128_modules;
///
/// let modules = code128_modules("CB01").unwrap();
/// assert_eq!(modules.len(), 11 * 6 + 13);
/// assert!(modules[0]);           // starts with a bar
/// assert!(modules[modules.len() - 1]); // ends with the stop bar
/// ```
pub fn code128_modules(data: &str) -> CoreResult<Vec<bool>> {
    let values = code128_values(data)?;
    let mut modules = Vec::with_capacity(values.len() * 11 + 13);

    for value in values.into_iter().chain(std::iter::once(STOP)) {
        for (i, width) in CODE128_PATTERNS[value].bytes().enumerate() {
            let dark = i % 2 == 0;
            for _ in 0..(width - b'0') {
                modules.push(dark);
            }
        }
    }

    Ok(modules)
}

// =============================================================================
// Unit Tests
// =============================================================================
