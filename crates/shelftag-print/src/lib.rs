//! # shelftag-print
//!
//! Barcode labels, price tags and product listings.
//!
//! ## Scope
//!
//! - ESC/POS command building and raw TCP printer transport
//! - The label [`Dispatcher`]: thermal printer first, rendered pages when
//!   the printer is missing or fails
//! - CODE128 rasterization through scratch PNG files
//! - Page documents ([`Document`]) for fallback labels and price tags
//! - HTML product listings
//!
//! Layout numbers come from `shelftag_core::geometry`; product data comes
//! from the store at print time.
//!
//! ## Example
//!
//! ```ignore
//! use shelftag_print::{Dispatcher, LabelItem, NetworkPrinter, PrintRequest, PrintSettings};
//! use shelftag_core::geometry::PaperSize;
//! use tokio_util::sync::CancellationToken;
//!
//! let printer = NetworkPrinter::from_addr("192.168.1.100:9100")?;
//! let dispatcher = Dispatcher::new(db.products(), printer, PrintSettings::default());
//!
//! let request = PrintRequest {
//!     items: vec![LabelItem::new("CB00000001", 3)],
//!     paper: PaperSize::Medium,
//!     show_price: true,
//! };
//! let outcome = dispatcher.dispatch(&request, &CancellationToken::new()).await?;
//! ```

mod device;
mod dispatcher;
mod error;
mod escpos;
mod listing;
mod page;
mod price_tag;
mod raster;
mod settings;

// Re-exports
pub use device::{NetworkPrinter, NetworkSession, PrinterSession, ThermalPrinter, DEFAULT_TIMEOUT};
pub use dispatcher::{Dispatcher, LabelItem, PrintOutcome, PrintRequest};
pub use error::{PrintError, PrintResult};
pub use escpos::{check_printable, encode_ops, Align, EscPosBuilder, Font, PrinterOp};
pub use listing::{Listing, DEFAULT_LISTING_PAGE_SIZE, MAX_LISTING_PAGE_SIZE};
pub use page::{Document, DrawOp, Page, TextStyle};
pub use price_tag::{price_tag, price_tag_for};
pub use raster::{BarcodeRaster, BarcodeRasterizer};
pub use settings::{PrintSettings, DEFAULT_CURRENCY, DEFAULT_DPI};
