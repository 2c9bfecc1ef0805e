//! # Repository Module
//!
//! SQL lives here and nowhere else in the crate.
//!
//! ```text
//! Catalog / Reconciler / BarcodeAllocator
//!        │
//!        ▼
//! ProductRepository
//! ├── insert(draft)              → id | UniqueViolation
//! ├── update(old_barcode, draft) → () | NotFound | UniqueViolation
//! ├── delete(barcode)            → () | NotFound   (+ image cleanup)
//! ├── get / find / get_many
//! ├── list(filter)
//! └── max_id / high_water_id / count
//!        │
//!        ▼
//! SQLite `products`
//! ```

pub mod product;
