//! # Product Listing
//!
//! A printable table of products, split into fixed-size pages.
//!
//! ```text
//! products ──chunks(page_size)──► [title, printed-at, table] ── break ── [...] ── (no break)
//! ```

use chrono::NaiveDateTime;
use shelftag_core::Product;

use crate::error::{PrintError, PrintResult};
use crate::page::escape_html;

pub const DEFAULT_LISTING_PAGE_SIZE: usize = 20;
pub const MAX_LISTING_PAGE_SIZE: usize = 100;

const HEADERS: [(&str, u8); 7] = [
    ("Name", 25),
    ("Quantity", 10),
    ("Purchase price", 12),
    ("Sale price", 12),
    ("Expiry date", 12),
    ("Barcode", 15),
    ("Supplier", 14),
];

const STYLE: &str = "<style>
table { width: 100%; border-collapse: collapse; font-family: Arial, sans-serif; font-size: 11pt; margin-bottom: 20px; }
th { background-color: #f2f2f2; padding: 8px; text-align: center; border: 1px solid #ddd; font-weight: bold; }
td { padding: 8px; text-align: center; border: 1px solid #ddd; }
h2 { text-align: center; margin-bottom: 10px; }
.date { text-align: center; color: #666; margin-bottom: 16px; }
</style>
";

/// Listing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    title: String,
    page_size: usize,
}

impl Listing {
    /// `page_size` rows per page, 1..=100.
    pub fn new(page_size: usize) -> PrintResult<Self> {
        if !(1..=MAX_LISTING_PAGE_SIZE).contains(&page_size) {
            return Err(PrintError::InvalidConfig(format!(
                "listing page size must be between 1 and {}, got {}",
                MAX_LISTING_PAGE_SIZE, page_size
            )));
        }
        Ok(Listing {
            title: "Product list".to_string(),
            page_size,
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages `count` rows take.
    pub fn page_count(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Renders `products` in the given order.
    pub fn render_html(&self, products: &[Product], printed_at: NaiveDateTime) -> PrintResult<String> {
        if products.is_empty() {
            return Err(PrintError::NothingToPrint);
        }

        let stamp = printed_at.format("%Y/%m/%d %H:%M").to_string();
        let mut html = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\n");
        html.push_str(STYLE);
        html.push_str("</head><body>\n");

        let pages = self.page_count(products.len());
        for (index, chunk) in products.chunks(self.page_size).enumerate() {
            html.push_str(&format!(
                "<h2>{}</h2>\n<p class=\"date\">Printed: {}</p>\n<table>\n<tr>",
                escape_html(&self.title),
                stamp
            ));
            for (header, width) in HEADERS {
                html.push_str(&format!("<th width=\"{}%\">{}</th>", width, header));
            }
            html.push_str("</tr>\n");

            for product in chunk {
                html.push_str(&row(product));
            }
            html.push_str("</table>\n");

            if index + 1 < pages {
                html.push_str("<div style=\"page-break-after: always;\"></div>\n");
            }
        }

        html.push_str("</body></html>\n");
        Ok(html)
    }
}

fn row(product: &Product) -> String {
    let expiry = product
        .expiry_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let supplier = product
        .supplier_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("-");

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape_html(&product.name),
        grouped(product.quantity),
        product.purchase_price(),
        product.sale_price(),
        expiry,
        escape_html(&product.barcode),
        escape_html(supplier)
    )
}

/// `1234567` -> `1,234,567`
fn grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn product(n: i64) -> Product {
        Product {
            id: n,
            name: format!("Item {n}"),
            quantity: n * 1000,
            purchase_price_cents: 150,
            sale_price_cents: 200,
            expiry_date: None,
            barcode: format!("B{n}"),
            image_path: None,
            supplier_name: None,
            supplier_phone: None,
        }
    }

    fn printed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 15)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(Listing::new(0).is_err());
        assert!(Listing::new(101).is_err());
        assert_eq!(Listing::new(100).unwrap().page_size(), 100);
    }

    #[test]
    fn test_breaks_between_pages_only() {
        let products: Vec<Product> = (1..=45).map(product).collect();
        let html = Listing::new(20).unwrap().render_html(&products, printed_at()).unwrap();

        assert_eq!(html.matches("<table>").count(), 3);
        assert_eq!(html.matches("page-break-after").count(), 2);
        assert_eq!(html.matches("<tr><td>").count(), 45);
        assert!(html.contains("Printed: 2025/03/15 09:05"));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_break() {
        let products: Vec<Product> = (1..=40).map(product).collect();
        let html = Listing::new(20).unwrap().render_html(&products, printed_at()).unwrap();
        assert_eq!(html.matches("<table>").count(), 2);
        assert_eq!(html.matches("page-break-after").count(), 1);
    }

    #[test]
    fn test_row_formatting() {
        let mut p = product(1234);
        p.name = "Tea & Co".to_string();
        p.expiry_date = NaiveDate::from_ymd_opt(2030, 1, 31);
        p.supplier_name = Some("Atlas".to_string());
        p.sale_price_cents = 125050;

        let html = Listing::new(5).unwrap().render_html(&[p], printed_at()).unwrap();
        assert!(html.contains(
            "<tr><td>Tea &amp; Co</td><td>1,234,000</td><td>1.50</td><td>1,250.50</td><td>2030-01-31</td><td>B1234</td><td>Atlas</td></tr>"
        ));

        let html = Listing::new(5)
            .unwrap()
            .render_html(&[product(1)], printed_at())
            .unwrap();
        assert!(html.contains("<td>-</td><td>B1</td><td>-</td>"));
    }

    #[test]
    fn test_empty_selection() {
        let err = Listing::new(5).unwrap().render_html(&[], printed_at()).unwrap_err();
        assert!(matches!(err, PrintError::NothingToPrint));
    }
}
