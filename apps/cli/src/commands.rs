//! Subcommand handlers.

use std::path::Path;

use anyhow::{bail, Context};
use chrono::Local;
use shelftag_core::geometry::PaperSize;
use shelftag_core::validation::ProductForm;
use shelftag_core::Product;
use shelftag_db::{remove_best_effort, Database, FsRemover, ImageStore};
use shelftag_print::{
    price_tag_for, Dispatcher, Document, LabelItem, Listing, NetworkPrinter, PrintOutcome,
    PrintRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::ProductArgs;

pub async fn list(db: &Database, filter: Option<&str>) -> anyhow::Result<()> {
    let products = db.products().list(filter).await?;
    for product in &products {
        println!("{}", summary_line(product));
    }
    println!("{} product(s)", products.len());
    Ok(())
}

pub async fn add(db: &Database, config: &AppConfig, args: ProductArgs) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let (form, stored_image) = product_form(config, args).await?;

    match db.catalog().create(&form, today).await {
        Ok(product) => {
            println!("Added {}", summary_line(&product));
            Ok(())
        }
        Err(e) => {
            discard_image(stored_image.as_deref());
            Err(e.into())
        }
    }
}

pub async fn edit(
    db: &Database,
    config: &AppConfig,
    old_barcode: &str,
    args: ProductArgs,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let previous = db.products().get(old_barcode).await?;
    let (mut form, stored_image) = product_form(config, args).await?;
    if form.image_path.is_none() {
        form.image_path = previous.image_path.clone();
    }

    match db.catalog().edit(old_barcode, &form, today).await {
        Ok(product) => {
            // the replaced image is no longer referenced
            if stored_image.is_some() {
                if let Some(old_image) = previous.image_path.as_deref() {
                    remove_best_effort(&FsRemover, Path::new(old_image), "replaced product image");
                }
            }
            println!("Updated {}", summary_line(&product));
            Ok(())
        }
        Err(e) => {
            discard_image(stored_image.as_deref());
            Err(e.into())
        }
    }
}

pub async fn delete(db: &Database, barcode: &str) -> anyhow::Result<()> {
    db.products().delete(barcode).await?;
    println!("Deleted {}", barcode);
    Ok(())
}

pub async fn import(db: &Database, file: &Path) -> anyhow::Result<()> {
    let summary = db
        .reconciler()
        .import_file(file)
        .await
        .with_context(|| format!("importing {}", file.display()))?;
    println!("{}", summary);
    Ok(())
}

pub async fn export(db: &Database, file: &Path) -> anyhow::Result<()> {
    let count = db
        .reconciler()
        .export_file(file)
        .await
        .with_context(|| format!("exporting to {}", file.display()))?;
    println!("Exported {} product(s) to {}", count, file.display());
    Ok(())
}

pub async fn labels(
    db: &Database,
    config: &AppConfig,
    paper: PaperSize,
    items: &[String],
    show_price: bool,
    out: &Path,
) -> anyhow::Result<()> {
    let request = PrintRequest {
        items: items
            .iter()
            .map(|spec| parse_label_item(spec))
            .collect::<anyhow::Result<_>>()?,
        paper,
        show_price,
    };

    let printer = match &config.printer_addr {
        Some(addr) => NetworkPrinter::from_addr(addr)?.with_timeout(config.printer_timeout),
        None => NetworkPrinter::unconfigured(),
    };
    let dispatcher = Dispatcher::new(db.products(), printer, config.print_settings());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current label");
            on_interrupt.cancel();
        }
    });

    match dispatcher.dispatch(&request, &cancel).await? {
        PrintOutcome::Direct { labels } => {
            println!("Sent {} label(s) to the printer", labels);
        }
        PrintOutcome::Fallback(document) => {
            write_document(&document, out).await?;
            println!(
                "Printer unavailable; wrote {} page(s) to {}",
                document.len(),
                out.display()
            );
        }
    }
    Ok(())
}

pub async fn listing(
    db: &Database,
    filter: Option<&str>,
    barcodes: &[String],
    page_size: usize,
    out: &Path,
) -> anyhow::Result<()> {
    let listing = Listing::new(page_size)?;

    let products = if barcodes.is_empty() {
        db.products().list(filter).await?
    } else {
        let selected = db.products().get_many(barcodes).await?;
        if selected.len() < barcodes.len() {
            warn!(
                requested = barcodes.len(),
                found = selected.len(),
                "Some barcodes are not in the catalog"
            );
        }
        selected
    };

    let html = listing.render_html(&products, Local::now().naive_local())?;
    tokio::fs::write(out, html)
        .await
        .with_context(|| format!("writing {}", out.display()))?;

    info!(products = products.len(), "Listing written");
    println!(
        "Wrote {} product(s) on {} page(s) to {}",
        products.len(),
        listing.page_count(products.len()),
        out.display()
    );
    Ok(())
}

pub async fn tag(db: &Database, config: &AppConfig, barcode: &str, out: &Path) -> anyhow::Result<()> {
    let document = price_tag_for(&db.products(), barcode, &config.print_settings()).await?;
    write_document(&document, out).await?;
    println!("Wrote price tag for {} to {}", barcode, out.display());
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// `"CB00000001"` is one copy, `"CB00000001:3"` three.
fn parse_label_item(spec: &str) -> anyhow::Result<LabelItem> {
    let spec = spec.trim();
    let (barcode, copies) = match spec.rsplit_once(':') {
        Some((barcode, copies)) => {
            let copies: u32 = copies
                .trim()
                .parse()
                .with_context(|| format!("invalid copy count in '{}'", spec))?;
            (barcode.trim(), copies)
        }
        None => (spec, 1),
    };
    if barcode.is_empty() {
        bail!("missing barcode in '{}'", spec);
    }
    Ok(LabelItem::new(barcode, copies))
}

/// Builds the form, copying a picked image into the image directory first.
///
/// Returns the stored image path too, so a failed save can remove it.
async fn product_form(
    config: &AppConfig,
    args: ProductArgs,
) -> anyhow::Result<(ProductForm, Option<String>)> {
    let stored_image = match &args.image {
        Some(source) => {
            let stored = ImageStore::new(&config.image_dir).import(source).await?;
            Some(stored.display().to_string())
        }
        None => None,
    };

    let form = ProductForm {
        name: args.name,
        quantity: args.quantity,
        purchase_price: args.purchase_price,
        sale_price: args.sale_price,
        expiry_date: args.expiry,
        barcode: args.barcode,
        image_path: stored_image.clone(),
        supplier_name: args.supplier,
        supplier_phone: args.phone,
    };
    Ok((form, stored_image))
}

fn discard_image(stored_image: Option<&str>) {
    if let Some(path) = stored_image {
        remove_best_effort(&FsRemover, Path::new(path), "unsaved product image");
    }
}

async fn write_document(document: &Document, out: &Path) -> anyhow::Result<()> {
    let is_json = out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let body = if is_json {
        serde_json::to_string_pretty(document)?
    } else {
        document.to_html()
    };
    tokio::fs::write(out, body)
        .await
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

fn summary_line(product: &Product) -> String {
    format!(
        "{:<12} {:<32} qty {:>6}  {:>12}",
        product.barcode,
        product.name,
        product.quantity,
        product.sale_price().to_string()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_item() {
        assert_eq!(parse_label_item("CB00000001").unwrap(), LabelItem::new("CB00000001", 1));
        assert_eq!(parse_label_item(" 6130002:3 ").unwrap(), LabelItem::new("6130002", 3));
        assert_eq!(parse_label_item("A:B:2").unwrap(), LabelItem::new("A:B", 2));
        assert!(parse_label_item("CB01:many").is_err());
        assert!(parse_label_item(":2").is_err());
    }
}
