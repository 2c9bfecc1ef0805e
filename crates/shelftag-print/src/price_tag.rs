//! Single-product shelf price tag.

use shelftag_core::geometry::{
    price_tag_layout, PRICE_TAG_HEIGHT_MM, PRICE_TAG_NAME_PT, PRICE_TAG_PRICE_PT,
    PRICE_TAG_WIDTH_MM,
};
use shelftag_core::Product;
use shelftag_db::ProductRepository;

use crate::error::PrintResult;
use crate::page::{Document, Page, TextStyle};
use crate::settings::PrintSettings;

/// A one-page tag: large bold price on top, the name underneath.
pub fn price_tag(product: &Product, settings: &PrintSettings) -> Document {
    let mut document = Document::new(PRICE_TAG_WIDTH_MM, PRICE_TAG_HEIGHT_MM, settings.dpi);
    let layout = price_tag_layout(document.page);

    let mut page = Page::default();
    page.text(
        layout.price,
        settings.price_text(product.sale_price()),
        TextStyle::bold(PRICE_TAG_PRICE_PT),
    )
    .text(
        layout.name,
        product.name.clone(),
        TextStyle::regular(PRICE_TAG_NAME_PT),
    );
    document.push(page);
    document
}

/// Looks the product up and builds its tag.
pub async fn price_tag_for(
    products: &ProductRepository,
    barcode: &str,
    settings: &PrintSettings,
) -> PrintResult<Document> {
    let product = products.get(barcode).await?;
    Ok(price_tag(&product, settings))
}
