//! Barcode rasterization for fallback pages.
//!
//! ```text
//! "CB00000001" ──code128_modules──► [bool] ──► GrayImage (quiet zones, bars)
//!                                                 │
//!                                      scratch PNG (tempfile in scratch dir)
//!                                                 │ read back + decode
//!                                                 ▼
//!                                   BarcodeRaster { png bytes, w, h }
//!                                                 │
//!                    remove_best_effort(scratch PNG)  ← always, success or not
//! ```

use base64::Engine;
use image::{GrayImage, ImageFormat, Luma};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use shelftag_core::barcode::code128_modules;
use shelftag_core::geometry::{mm_to_units, LabelProfile};
use shelftag_db::{remove_best_effort, FileRemover, FsRemover};

use crate::error::{PrintError, PrintResult};

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// A PNG-encoded barcode image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRaster {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl BarcodeRaster {
    /// `data:image/png;base64,...`, for HTML and JSON page consumers.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// Draws CODE128 symbols at a fixed resolution.
#[derive(Debug, Clone)]
pub struct BarcodeRasterizer {
    dpi: u32,
    scratch_dir: PathBuf,
    remover: Arc<dyn FileRemover>,
}

impl BarcodeRasterizer {
    pub fn new(dpi: u32, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            dpi,
            scratch_dir: scratch_dir.into(),
            remover: Arc::new(FsRemover),
        }
    }

    /// Replaces how scratch files are removed.
    pub fn with_remover(mut self, remover: Arc<dyn FileRemover>) -> Self {
        self.remover = remover;
        self
    }

    /// Renders `data` for `profile` through a scratch PNG file.
    ///
    /// The scratch file is removed on every path once it exists; a removal
    /// failure is logged and ignored.
    pub async fn render(&self, data: &str, profile: &LabelProfile) -> PrintResult<BarcodeRaster> {
        let image = self.draw(data, profile)?;

        let path = self.scratch_file()?;
        let result = write_and_reload(&image, &path).await;
        remove_best_effort(self.remover.as_ref(), &path, "barcode raster");

        let raster = result?;
        debug!(data, width = raster.width, height = raster.height, "Barcode rasterized");
        Ok(raster)
    }

    /// The bars as an 8-bit image, quiet zones on both sides.
    pub fn draw(&self, data: &str, profile: &LabelProfile) -> PrintResult<GrayImage> {
        let modules = code128_modules(data)?;

        let module_px = pixels(profile.module_width, self.dpi);
        let quiet_px = pixels(profile.quiet_zone, self.dpi);
        let height = pixels(profile.module_height, self.dpi);
        let width = u32::try_from(modules.len())
            .ok()
            .and_then(|n| n.checked_mul(module_px))
            .and_then(|bars| bars.checked_add(2 * quiet_px))
            .ok_or_else(|| PrintError::Raster(format!("barcode '{}' is too wide", data)))?;

        Ok(GrayImage::from_fn(width, height, |x, _| {
            let dark = x
                .checked_sub(quiet_px)
                .map(|bar_x| (bar_x / module_px) as usize)
                .and_then(|module| modules.get(module).copied())
                .unwrap_or(false);
            if dark {
                BLACK
            } else {
                WHITE
            }
        }))
    }

    /// Creates a uniquely named empty PNG in the scratch directory and keeps it.
    fn scratch_file(&self) -> PrintResult<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("barcode-")
            .suffix(".png")
            .tempfile_in(&self.scratch_dir)?;
        let (_, path) = file.keep().map_err(|e| PrintError::Io(e.error))?;
        Ok(path)
    }
}

/// Whole pixels for a physical length, never less than one.
fn pixels(mm: f64, dpi: u32) -> u32 {
    mm_to_units(mm, dpi).round().max(1.0) as u32
}

async fn write_and_reload(image: &GrayImage, path: &Path) -> PrintResult<BarcodeRaster> {
    image.save_with_format(path, ImageFormat::Png)?;

    let png = tokio::fs::read(path).await?;
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)?;

    Ok(BarcodeRaster {
        width: decoded.width(),
        height: decoded.height(),
        png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelftag_core::geometry::PaperSize;
    use shelftag_db::RecordingRemover;

    #[test]
    fn test_draw_dimensions() {
        let profile = PaperSize::Medium.profile();
        let rasterizer = BarcodeRasterizer::new(254, std::env::temp_dir());
        let image = rasterizer.draw("CB01", &profile).unwrap();

        // 0.30mm at 254dpi = 3px per module, 4mm quiet = 40px, 12mm = 120px
        let modules = 11 * 6 + 13;
        assert_eq!(image.width(), modules * 3 + 2 * 40);
        assert_eq!(image.height(), 120);

        assert_eq!(image.get_pixel(0, 0), &WHITE);
        assert_eq!(image.get_pixel(40, 0), &BLACK);
        assert_eq!(image.get_pixel(image.width() - 41, 60), &BLACK);
        assert_eq!(image.get_pixel(image.width() - 1, 60), &WHITE);
    }

    #[test]
    fn test_draw_rejects_empty() {
        let rasterizer = BarcodeRasterizer::new(203, std::env::temp_dir());
        let err = rasterizer.draw("", &PaperSize::Small.profile()).unwrap_err();
        assert!(matches!(err, PrintError::Core(_)));
    }

    #[tokio::test]
    async fn test_render_removes_scratch_file() {
        let scratch = tempfile::tempdir().unwrap();
        let rasterizer = BarcodeRasterizer::new(203, scratch.path());

        let raster = rasterizer
            .render("CB00000001", &PaperSize::Large.profile())
            .await
            .unwrap();

        assert!(raster.width > 0);
        assert!(raster.png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(raster.data_uri().starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_render_attempts_cleanup_even_when_removal_fails() {
        let scratch = tempfile::tempdir().unwrap();
        let remover = Arc::new(RecordingRemover::failing());
        let rasterizer =
            BarcodeRasterizer::new(203, scratch.path()).with_remover(remover.clone());

        let raster = rasterizer.render("X1", &PaperSize::Small.profile()).await;

        assert!(raster.is_ok());
        let attempts = remover.attempts();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].starts_with(scratch.path()));
    }

    #[tokio::test]
    async fn test_missing_scratch_dir_is_io_error() {
        let scratch = tempfile::tempdir().unwrap();
        let rasterizer = BarcodeRasterizer::new(203, scratch.path().join("gone"));
        let err = rasterizer
            .render("X1", &PaperSize::Small.profile())
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::Io(_)));
    }
}
