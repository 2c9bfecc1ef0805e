//! CLI configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use shelftag_print::{
    PrintSettings, DEFAULT_CURRENCY, DEFAULT_DPI, DEFAULT_LISTING_PAGE_SIZE, MAX_LISTING_PAGE_SIZE,
};

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite catalog file
    pub db_path: PathBuf,

    /// Where imported product images are copied
    pub image_dir: PathBuf,

    /// Where temporary barcode rasters are written
    pub scratch_dir: PathBuf,

    /// ESC/POS printer `host:port`; unset means always render pages
    pub printer_addr: Option<String>,

    pub printer_timeout: Duration,

    /// Resolution of rendered label pages
    pub raster_dpi: u32,

    pub currency: String,

    /// Rows per listing page (1..=100)
    pub listing_page_size: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str, default: &str| -> Result<u64, ConfigError> {
            lookup(key)
                .unwrap_or_else(|| default.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        };

        let config = AppConfig {
            db_path: lookup("SHELFTAG_DB_PATH")
                .unwrap_or_else(|| "shelftag.db".to_string())
                .into(),

            image_dir: lookup("SHELFTAG_IMAGE_DIR")
                .unwrap_or_else(|| "product_images".to_string())
                .into(),

            scratch_dir: lookup("SHELFTAG_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),

            printer_addr: lookup("SHELFTAG_PRINTER_ADDR").filter(|addr| !addr.trim().is_empty()),

            printer_timeout: Duration::from_millis(parse("SHELFTAG_PRINTER_TIMEOUT_MS", "3000")?),

            raster_dpi: u32::try_from(parse("SHELFTAG_RASTER_DPI", &DEFAULT_DPI.to_string())?)
                .map_err(|_| ConfigError::InvalidValue("SHELFTAG_RASTER_DPI".to_string()))?,

            currency: lookup("SHELFTAG_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),

            listing_page_size: parse(
                "SHELFTAG_LISTING_PAGE_SIZE",
                &DEFAULT_LISTING_PAGE_SIZE.to_string(),
            )? as usize,
        };

        if config.raster_dpi == 0 {
            return Err(ConfigError::InvalidValue("SHELFTAG_RASTER_DPI".to_string()));
        }
        if !(1..=MAX_LISTING_PAGE_SIZE).contains(&config.listing_page_size) {
            return Err(ConfigError::InvalidValue("SHELFTAG_LISTING_PAGE_SIZE".to_string()));
        }

        Ok(config)
    }

    pub fn print_settings(&self) -> PrintSettings {
        PrintSettings::default()
            .currency(self.currency.clone())
            .dpi(self.raster_dpi)
            .scratch_dir(self.scratch_dir.clone())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("shelftag.db"));
        assert_eq!(config.image_dir, PathBuf::from("product_images"));
        assert_eq!(config.printer_addr, None);
        assert_eq!(config.printer_timeout, Duration::from_millis(3000));
        assert_eq!(config.raster_dpi, 203);
        assert_eq!(config.currency, "DA");
        assert_eq!(config.listing_page_size, 20);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHELFTAG_PRINTER_ADDR", "10.0.0.9:9100"),
            ("SHELFTAG_RASTER_DPI", "300"),
            ("SHELFTAG_CURRENCY", "EUR"),
            ("SHELFTAG_LISTING_PAGE_SIZE", "50"),
        ])
        .unwrap();
        assert_eq!(config.printer_addr.as_deref(), Some("10.0.0.9:9100"));
        assert_eq!(config.print_settings().dpi, 300);
        assert_eq!(config.print_settings().currency, "EUR");
        assert_eq!(config.listing_page_size, 50);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = load(&[("SHELFTAG_PRINTER_TIMEOUT_MS", "soon")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for SHELFTAG_PRINTER_TIMEOUT_MS");

        let err = load(&[("SHELFTAG_LISTING_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var) if var == "SHELFTAG_LISTING_PAGE_SIZE"));

        assert!(load(&[("SHELFTAG_RASTER_DPI", "0")]).is_err());
    }

    #[test]
    fn test_blank_printer_addr_is_unset() {
        let config = load(&[("SHELFTAG_PRINTER_ADDR", "  ")]).unwrap();
        assert_eq!(config.printer_addr, None);
    }
}
