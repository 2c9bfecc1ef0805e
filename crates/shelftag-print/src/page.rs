//! Rendered page output.
//!
//! Fallback labels and price tags come out as a [`Document`]: fixed-size
//! pages of drawing instructions (image at rect, text at rect) that any
//! page renderer can replay. Coordinates are device units at the
//! document's dpi, origin top-left.

use serde::{Deserialize, Serialize};
use shelftag_core::geometry::{PageSize, Rect};

use crate::escpos::Align;

/// Text appearance for one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: u32,
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size_pt: u32) -> Self {
        TextStyle {
            size_pt,
            bold: false,
        }
    }

    pub fn bold(size_pt: u32) -> Self {
        TextStyle {
            size_pt,
            bold: true,
        }
    }
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawOp {
    /// A PNG given as a data URI, scaled to fill `rect`.
    Image { rect: Rect, src: String },
    /// Text centred vertically in `rect`, aligned horizontally by `align`.
    Text {
        rect: Rect,
        text: String,
        style: TextStyle,
        align: Align,
    },
}

/// One physical sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn image(&mut self, rect: Rect, src: impl Into<String>) -> &mut Self {
        self.ops.push(DrawOp::Image {
            rect,
            src: src.into(),
        });
        self
    }

    pub fn text(&mut self, rect: Rect, text: impl Into<String>, style: TextStyle) -> &mut Self {
        self.ops.push(DrawOp::Text {
            rect,
            text: text.into(),
            style,
            align: Align::Center,
        });
        self
    }
}

/// A run of same-sized pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: u32,
    /// Page size in device units.
    pub page: PageSize,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(width_mm: f64, height_mm: f64, dpi: u32) -> Self {
        Document {
            width_mm,
            height_mm,
            dpi,
            page: PageSize::from_mm(width_mm, height_mm, dpi),
            pages: Vec::new(),
        }
    }

    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Printable HTML, one sheet per page, breaking between pages only.
    pub fn to_html(&self) -> String {
        // device units -> CSS points
        let pt = 72.0 / f64::from(self.dpi.max(1));

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><style>\n");
        html.push_str(&format!(
            "@page {{ size: {w}mm {h}mm; margin: 0; }}\n\
             body {{ margin: 0; font-family: Arial, sans-serif; }}\n\
             .sheet {{ position: relative; width: {w}mm; height: {h}mm; overflow: hidden; }}\n\
             .sheet > * {{ position: absolute; box-sizing: border-box; }}\n\
             .text {{ display: flex; align-items: center; white-space: nowrap; }}\n",
            w = self.width_mm,
            h = self.height_mm
        ));
        html.push_str("</style></head><body>\n");

        for (i, page) in self.pages.iter().enumerate() {
            let last = i + 1 == self.pages.len();
            let brk = if last { "" } else { " style=\"page-break-after: always;\"" };
            html.push_str(&format!("<div class=\"sheet\"{}>\n", brk));

            for op in &page.ops {
                match op {
                    DrawOp::Image { rect, src } => html.push_str(&format!(
                        "<img style=\"{}\" src=\"{}\">\n",
                        placement(rect, pt),
                        src
                    )),
                    DrawOp::Text {
                        rect,
                        text,
                        style,
                        align,
                    } => html.push_str(&format!(
                        "<div class=\"text\" style=\"{} justify-content: {}; font-size: {}pt; font-weight: {};\">{}</div>\n",
                        placement(rect, pt),
                        justify(*align),
                        style.size_pt,
                        if style.bold { "bold" } else { "normal" },
                        escape_html(text)
                    )),
                }
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body></html>\n");
        html
    }
}

fn placement(rect: &Rect, pt: f64) -> String {
    format!(
        "left: {:.2}pt; top: {:.2}pt; width: {:.2}pt; height: {:.2}pt;",
        rect.x * pt,
        rect.y * pt,
        rect.width * pt,
        rect.height * pt
    )
}

fn justify(align: Align) -> &'static str {
    match align {
        Align::Left => "flex-start",
        Align::Center => "center",
        Align::Right => "flex-end",
    }
}

/// Minimal escaping for text placed in element content.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_page_doc() -> Document {
        let mut doc = Document::new(50.0, 30.0, 203);
        for name in ["Tea", "Salt & <Pepper>"] {
            let mut page = Page::default();
            page.text(Rect::new(0.0, 0.0, 100.0, 30.0), name, TextStyle::bold(10));
            doc.push(page);
        }
        doc
    }

    #[test]
    fn test_page_breaks_between_pages_only() {
        let html = two_page_doc().to_html();
        assert_eq!(html.matches("class=\"sheet\"").count(), 2);
        assert_eq!(html.matches("page-break-after").count(), 1);
        assert!(html.contains("Salt &amp; &lt;Pepper&gt;"));
        assert!(html.contains("size: 50mm 30mm"));
    }

    #[test]
    fn test_document_json_shape() {
        let json = serde_json::to_value(two_page_doc()).unwrap();
        assert_eq!(json["pages"].as_array().unwrap().len(), 2);
        assert_eq!(json["pages"][0]["ops"][0]["type"], "text");
        assert_eq!(json["pages"][0]["ops"][0]["align"], "center");
        assert_eq!(json["pages"][0]["ops"][0]["style"]["bold"], true);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new(40.0, 20.0, 203);
        assert!(doc.is_empty());
        assert!(!doc.to_html().contains("sheet\""));
    }
}
