//! # Label Geometry Engine
//!
//! Turns a paper profile plus a page rectangle into the rectangles every
//! renderer draws into. Pure functions only; identical input always yields
//! identical output.
//!
//! ## Label Layout
//! ```text
//! ┌──────────────────────── page width (W) ────────────────────────┐
//! │                          ▲ 0.1 × H                             │
//! │     ┌────────────────────┴───────────────────────────────┐     │
//! │     │ ║│║║│║│║║║│║│║║│║║║│║│║║│║  barcode  0.9 × W       │     │
//! │     │ height = w × moduleH / (moduleW × symbolLength)     │     │
//! │     └────────────────────┬───────────────────────────────┘     │
//! │                          ▼ NAME_GAP                            │
//! │  ┌──────────────────── name (W - 2·INSET) ──────────────────┐  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │  ┌──────────── price (NAME_GAP + PRICE_OFFSET below) ───────┐  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Profiles
//! | profile | size mm | module w | module h | quiet | name pt | price pt |
//! |---------|---------|----------|----------|-------|---------|----------|
//! | small   | 40×20   | 0.25     | 8        | 3     | 8       | 10       |
//! | medium  | 50×30   | 0.30     | 12       | 4     | 10      | 12       |
//! | large   | 58×40   | 0.35     | 16       | 5     | 12      | 14       |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Layout Constants (device units)
// =============================================================================

/// Horizontal inset of the text lines on both sides.
pub const TEXT_INSET: f64 = 10.0;

/// Gap between the bottom of the barcode and the name line.
pub const NAME_GAP: f64 = 5.0;

/// Distance from the top of the name line to the top of the price line.
pub const PRICE_OFFSET: f64 = 20.0;

/// Height of one text line.
pub const TEXT_LINE_HEIGHT: f64 = 30.0;

/// Share of the page width the barcode image spans.
pub const BARCODE_WIDTH_RATIO: f64 = 0.9;

/// Vertical origin of the barcode as a share of the page height.
pub const BARCODE_TOP_RATIO: f64 = 0.1;

/// Share of a price tag's height given to the price.
pub const PRICE_TAG_SPLIT: f64 = 0.7;

/// Physical size of a price tag.
pub const PRICE_TAG_WIDTH_MM: f64 = 50.0;
pub const PRICE_TAG_HEIGHT_MM: f64 = 30.0;

/// Point sizes of the price tag texts.
pub const PRICE_TAG_PRICE_PT: u32 = 16;
pub const PRICE_TAG_NAME_PT: u32 = 12;

/// ESC/POS barcode module width, shared by every profile.
pub const ESCPOS_BARCODE_WIDTH: u8 = 2;

const MM_PER_INCH: f64 = 25.4;

// =============================================================================
// Paper Size
// =============================================================================

/// The three supported label stocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    Small,
    Medium,
    Large,
}

impl PaperSize {
    pub const ALL: [PaperSize; 3] = [PaperSize::Small, PaperSize::Medium, PaperSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSize::Small => "small",
            PaperSize::Medium => "medium",
            PaperSize::Large => "large",
        }
    }

    /// Fixed parameters of this stock.
    pub fn profile(&self) -> LabelProfile {
        match self {
            PaperSize::Small => LabelProfile {
                paper: *self,
                width_mm: 40.0,
                height_mm: 20.0,
                module_width: 0.25,
                module_height: 8.0,
                quiet_zone: 3.0,
                name_pt: 8,
                price_pt: 10,
                escpos_scale: 1,
                escpos_bar_height: 40,
            },
            PaperSize::Medium => LabelProfile {
                paper: *self,
                width_mm: 50.0,
                height_mm: 30.0,
                module_width: 0.30,
                module_height: 12.0,
                quiet_zone: 4.0,
                name_pt: 10,
                price_pt: 12,
                escpos_scale: 2,
                escpos_bar_height: 60,
            },
            PaperSize::Large => LabelProfile {
                paper: *self,
                width_mm: 58.0,
                height_mm: 40.0,
                module_width: 0.35,
                module_height: 16.0,
                quiet_zone: 5.0,
                name_pt: 12,
                price_pt: 14,
                escpos_scale: 3,
                escpos_bar_height: 80,
            },
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown paper size name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown paper size '{0}' (expected small, medium or large)")]
pub struct UnknownPaperSize(pub String);

impl FromStr for PaperSize {
    type Err = UnknownPaperSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(PaperSize::Small),
            "medium" => Ok(PaperSize::Medium),
            "large" => Ok(PaperSize::Large),
            _ => Err(UnknownPaperSize(s.to_string())),
        }
    }
}

// =============================================================================
// Label Profile
// =============================================================================

/// Everything a renderer needs to know about a label stock.
///
/// `module_width`, `module_height` and `quiet_zone` are millimetres; the
/// quiet zone is applied on both sides of the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelProfile {
    pub paper: PaperSize,
    pub width_mm: f64,
    pub height_mm: f64,
    pub module_width: f64,
    pub module_height: f64,
    pub quiet_zone: f64,
    pub name_pt: u32,
    pub price_pt: u32,
    /// ESC/POS character magnification for the whole label.
    pub escpos_scale: u8,
    /// ESC/POS barcode height in dots.
    pub escpos_bar_height: u8,
}

impl LabelProfile {
    /// Page rectangle of one label at `dpi`.
    pub fn page(&self, dpi: u32) -> PageSize {
        PageSize::from_mm(self.width_mm, self.height_mm, dpi)
    }
}

// =============================================================================
// Rectangles
// =============================================================================

/// Page dimensions in device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        PageSize { width, height }
    }

    /// Converts a physical size to device units: `mm × dpi / 25.4`.
    ///
    /// ## Example
    /// ```rust
    /// use shelftag_core::geometry::PageSize;
    ///
    /// let page = PageSize::from_mm(25.4, 50.8, 203);
    /// assert_eq!(page.width, 203.0);
    /// assert_eq!(page.height, 406.0);
    /// ```
    pub fn from_mm(width_mm: f64, height_mm: f64, dpi: u32) -> Self {
        PageSize {
            width: mm_to_units(width_mm, dpi),
            height: mm_to_units(height_mm, dpi),
        }
    }
}

/// Millimetres to device units at `dpi`.
pub fn mm_to_units(mm: f64, dpi: u32) -> f64 {
    mm * f64::from(dpi) / MM_PER_INCH
}

/// Axis-aligned rectangle in device units, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

// =============================================================================
// Layout Computation
// =============================================================================

/// Where the pieces of one barcode label go.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelLayout {
    pub barcode: Rect,
    pub name: Rect,
    /// Present only when the price line is enabled.
    pub price: Option<Rect>,
}

/// Computes the label layout for a barcode of `symbol_len` characters.
///
/// A zero length is treated as one so the height stays finite.
///
/// ## Example
/// ```rust
/// use shelftag_core::geometry::{compute_layout, PageSize, PaperSize};
///
/// let profile = PaperSize::Medium.profile();
/// let page = PageSize::new(400.0, 240.0);
/// let layout = compute_layout(&profile, page, 10, true);
///
/// assert_eq!(layout.barcode.width, 360.0);
/// assert_eq!(layout.barcode.x, 20.0);
/// assert_eq!(layout.barcode.y, 24.0);
/// assert!(layout.price.is_some());
/// ```
pub fn compute_layout(
    profile: &LabelProfile,
    page: PageSize,
    symbol_len: usize,
    show_price: bool,
) -> LabelLayout {
    let symbols = symbol_len.max(1) as f64;

    let bar_width = page.width * BARCODE_WIDTH_RATIO;
    let bar_height = bar_width * (profile.module_height / (profile.module_width * symbols));
    let bar_x = (page.width - bar_width) / 2.0;
    let bar_y = page.height * BARCODE_TOP_RATIO;
    let barcode = Rect::new(bar_x, bar_y, bar_width, bar_height);

    let text_width = page.width - 2.0 * TEXT_INSET;
    let name_y = barcode.bottom() + NAME_GAP;
    let name = Rect::new(TEXT_INSET, name_y, text_width, TEXT_LINE_HEIGHT);

    let price = show_price
        .then(|| Rect::new(TEXT_INSET, name_y + PRICE_OFFSET, text_width, TEXT_LINE_HEIGHT));

    LabelLayout {
        barcode,
        name,
        price,
    }
}

/// Where the two text blocks of a price tag go.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTagLayout {
    pub price: Rect,
    pub name: Rect,
}

/// Price across the top 70% of the page, name across the remaining 30%.
pub fn price_tag_layout(page: PageSize) -> PriceTagLayout {
    let split = page.height * PRICE_TAG_SPLIT;
    PriceTagLayout {
        price: Rect::new(0.0, 0.0, page.width, split),
        name: Rect::new(0.0, split, page.width, page.height - split),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_stock_sizes() {
        let small = PaperSize::Small.profile();
        assert_eq!((small.width_mm, small.height_mm), (40.0, 20.0));
        assert_eq!(small.escpos_scale, 1);

        let medium = PaperSize::Medium.profile();
        assert_eq!((medium.width_mm, medium.height_mm), (50.0, 30.0));
        assert_eq!(medium.module_height, 12.0);

        let large = PaperSize::Large.profile();
        assert_eq!((large.width_mm, large.height_mm), (58.0, 40.0));
        assert_eq!(large.price_pt, 14);
    }

    #[test]
    fn test_paper_size_parsing() {
        assert_eq!("Small".parse::<PaperSize>().unwrap(), PaperSize::Small);
        assert_eq!(" large ".parse::<PaperSize>().unwrap(), PaperSize::Large);
        assert!("a4".parse::<PaperSize>().is_err());
        for paper in PaperSize::ALL {
            assert_eq!(paper.as_str().parse::<PaperSize>().unwrap(), paper);
        }
    }

    #[test]
    fn test_barcode_rect() {
        let profile = PaperSize::Small.profile();
        let page = PageSize::new(320.0, 160.0);
        let layout = compute_layout(&profile, page, 8, false);

        // 288 × 8 / (0.25 × 8) = 1152
        assert_eq!(layout.barcode.width, 288.0);
        assert_eq!(layout.barcode.height, 1152.0);
        assert_eq!(layout.barcode.x, 16.0);
        assert_eq!(layout.barcode.y, 16.0);
    }

    #[test]
    fn test_text_lines_follow_barcode() {
        let profile = PaperSize::Medium.profile();
        let page = PageSize::new(400.0, 240.0);
        let layout = compute_layout(&profile, page, 10, true);

        assert_eq!(layout.name.x, TEXT_INSET);
        assert_eq!(layout.name.width, 380.0);
        assert_eq!(layout.name.y, layout.barcode.bottom() + NAME_GAP);
        assert_eq!(layout.name.height, TEXT_LINE_HEIGHT);

        let price = layout.price.unwrap();
        assert_eq!(price.y, layout.name.y + PRICE_OFFSET);
        assert_eq!(price.width, layout.name.width);
    }

    #[test]
    fn test_price_line_omitted_when_disabled() {
        let profile = PaperSize::Large.profile();
        let layout = compute_layout(&profile, PageSize::new(460.0, 320.0), 12, false);
        assert!(layout.price.is_none());
    }

    #[test]
    fn test_longer_symbol_gives_shorter_barcode() {
        let profile = PaperSize::Medium.profile();
        let page = PageSize::new(400.0, 240.0);
        let short = compute_layout(&profile, page, 4, false);
        let long = compute_layout(&profile, page, 16, false);
        assert_eq!(short.barcode.width, long.barcode.width);
        assert!(long.barcode.height < short.barcode.height);
    }

    #[test]
    fn test_zero_length_symbol_is_finite() {
        let profile = PaperSize::Small.profile();
        let layout = compute_layout(&profile, PageSize::new(320.0, 160.0), 0, false);
        assert!(layout.barcode.height.is_finite());
    }

    #[test]
    fn test_layout_is_deterministic() {
        for paper in PaperSize::ALL {
            let profile = paper.profile();
            let page = profile.page(203);
            let a = compute_layout(&profile, page, 10, true);
            let b = compute_layout(&profile, page, 10, true);
            assert_eq!(a, b);

            let bits = |r: Rect| {
                [r.x, r.y, r.width, r.height].map(f64::to_bits)
            };
            assert_eq!(bits(a.barcode), bits(b.barcode));
            assert_eq!(bits(a.name), bits(b.name));
        }
    }

    #[test]
    fn test_mm_conversion() {
        assert_eq!(mm_to_units(25.4, 300), 300.0);
        let page = PaperSize::Medium.profile().page(254);
        assert!((page.width - 500.0).abs() < 1e-9);
        assert!((page.height - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_tag_split() {
        let layout = price_tag_layout(PageSize::new(400.0, 200.0));
        assert_eq!(layout.price, Rect::new(0.0, 0.0, 400.0, 140.0));
        assert_eq!(layout.name.y, 140.0);
        assert!((layout.name.height - 60.0).abs() < 1e-9);
    }
}
