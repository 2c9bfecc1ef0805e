//! # shelftag
//!
//! Command-line front end: catalog maintenance, CSV transfer and printing.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          shelftag CLI                                   │
//! │                                                                         │
//! │  args ──► Cli ──► commands::* ──► shelftag-db (catalog, reconciler)     │
//! │                        │                                                │
//! │                        └────────► shelftag-print (dispatcher, listing)  │
//! │                                                                         │
//! │  Ctrl-C ──► CancellationToken ──► label job stops between copies       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shelftag_core::geometry::PaperSize;
use shelftag_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "shelftag")]
#[command(about = "Product catalog with barcode labels, price tags and listings")]
#[command(version)]
struct Cli {
    /// Catalog database file (overrides SHELFTAG_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List products, optionally filtered by name or barcode
    List { filter: Option<String> },

    /// Add a product; a blank barcode is allocated
    Add(ProductArgs),

    /// Replace every field of the product with barcode OLD
    Edit {
        old: String,
        #[command(flatten)]
        product: ProductArgs,
    },

    /// Delete a product and its image file
    Delete { barcode: String },

    /// Import products from a CSV file with a header row
    Import { file: PathBuf },

    /// Export the whole catalog to a CSV file
    Export { file: PathBuf },

    /// Print barcode labels: BARCODE or BARCODE:COPIES
    Labels {
        /// small, medium or large
        paper: PaperSize,

        #[arg(required = true)]
        items: Vec<String>,

        /// Print the sale price under the name
        #[arg(long)]
        price: bool,

        /// Where rendered pages go when the thermal printer is unavailable
        /// (.json for draw instructions, anything else for HTML)
        #[arg(long, default_value = "labels.html")]
        out: PathBuf,
    },

    /// Write a paginated product listing as HTML
    Listing {
        filter: Option<String>,

        /// Only these barcodes (repeatable)
        #[arg(long = "barcode")]
        barcodes: Vec<String>,

        /// Rows per page (overrides SHELFTAG_LISTING_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<usize>,

        #[arg(long, default_value = "listing.html")]
        out: PathBuf,
    },

    /// Render a price tag for one product
    Tag {
        barcode: String,

        #[arg(long, default_value = "tag.html")]
        out: PathBuf,
    },
}

/// Product fields as typed; validated before anything is written.
#[derive(Args, Debug, Clone)]
struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    quantity: String,

    #[arg(long)]
    purchase_price: String,

    #[arg(long)]
    sale_price: String,

    /// YYYY-MM-DD
    #[arg(long)]
    expiry: Option<chrono::NaiveDate>,

    /// Leave out to allocate one
    #[arg(long, default_value = "")]
    barcode: String,

    /// Image file to copy into the image directory
    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(long, default_value = "")]
    supplier: String,

    #[arg(long, default_value = "")]
    phone: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    info!(db = %config.db_path.display(), "Configuration loaded");

    let db = Database::new(DbConfig::new(&config.db_path)).await?;

    let result = match cli.command {
        Command::List { filter } => commands::list(&db, filter.as_deref()).await,
        Command::Add(product) => commands::add(&db, &config, product).await,
        Command::Edit { old, product } => commands::edit(&db, &config, &old, product).await,
        Command::Delete { barcode } => commands::delete(&db, &barcode).await,
        Command::Import { file } => commands::import(&db, &file).await,
        Command::Export { file } => commands::export(&db, &file).await,
        Command::Labels {
            paper,
            items,
            price,
            out,
        } => commands::labels(&db, &config, paper, &items, price, &out).await,
        Command::Listing {
            filter,
            barcodes,
            page_size,
            out,
        } => {
            let page_size = page_size.unwrap_or(config.listing_page_size);
            commands::listing(&db, filter.as_deref(), &barcodes, page_size, &out).await
        }
        Command::Tag { barcode, out } => commands::tag(&db, &config, &barcode, &out).await,
    };

    db.close().await;
    result
}
