//! # Seed Data Generator
//!
//! Populates a catalog with sample products for development.
//!
//! ## Usage
//! ```bash
//! # 60 products (default)
//! cargo run -p shelftag-db --bin seed
//!
//! # Custom amount and file
//! cargo run -p shelftag-db --bin seed -- --count 200 --db ./data/shelftag.db
//! ```
//!
//! Every product goes through the same save path as a typed-in product, with
//! a blank barcode, so the seeded catalog holds `CB00000001`, `CB00000002`, ...

use chrono::{Days, Local};
use std::env;

use shelftag_core::validation::ProductForm;
use shelftag_db::{Database, DbConfig};

/// (name, purchase price, margin %)
const PRODUCTS: &[(&str, i64, i64)] = &[
    ("Semoule fine 1kg", 120, 15),
    ("Huile de table 1L", 230, 10),
    ("Sucre blanc 1kg", 95, 12),
    ("Café moulu 250g", 380, 20),
    ("Thé vert 500g", 450, 25),
    ("Lait en poudre 500g", 560, 14),
    ("Pâtes spaghetti 500g", 85, 18),
    ("Lentilles 1kg", 260, 15),
    ("Tomate concentrée 400g", 140, 22),
    ("Eau minérale 1.5L", 35, 40),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Atlas Distribution", "0550123456"),
    ("Sahel Grossiste", "0661987654"),
    ("", ""),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./shelftag_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("shelftag seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./shelftag_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Database: {}", db_path);
    println!("Products: {}", count);

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products; skipping.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let catalog = db.catalog();
    let mut generated = 0;

    for n in 0..count {
        let form = sample_form(n, today);
        match catalog.create(&form, today).await {
            Ok(product) => {
                generated += 1;
                if generated % 20 == 0 {
                    println!("  {} products... (last: {})", generated, product.barcode);
                }
            }
            Err(e) => eprintln!("Failed to insert {}: {}", form.name, e),
        }
    }

    println!("Generated {} products", generated);
    println!("Next allocated barcode: {}", db.allocator().next().await?);

    Ok(())
}

/// Deterministic product `n`: cycles the base list, varies stock and batch.
fn sample_form(n: usize, today: chrono::NaiveDate) -> ProductForm {
    let (name, purchase, margin) = PRODUCTS[n % PRODUCTS.len()];
    let batch = n / PRODUCTS.len() + 1;
    let (supplier, phone) = SUPPLIERS[n % SUPPLIERS.len()];
    let sale = purchase + purchase * margin / 100;

    ProductForm {
        name: format!("{} (lot {})", name, batch),
        quantity: ((n * 7) % 120).to_string(),
        purchase_price: purchase.to_string(),
        sale_price: sale.to_string(),
        expiry_date: (n % 3 != 2).then(|| today + Days::new(30 * (n as u64 % 12 + 1))),
        supplier_name: supplier.to_string(),
        supplier_phone: phone.to_string(),
        ..ProductForm::default()
    }
}
