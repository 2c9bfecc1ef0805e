//! # Image Assets
//!
//! Copies a picked image into the managed image directory. The catalog only
//! ever stores the returned path; the bytes are never read.

use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::AssetError;

/// The directory product images are copied into.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ImageStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `source` in under a fresh random name, keeping its extension.
    ///
    /// ## Returns
    /// * `Ok(path)` - where the copy now lives; store this on the product
    /// * `Err(AssetError::MissingSource)` - `source` does not exist
    pub async fn import(&self, source: &Path) -> Result<PathBuf, AssetError> {
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(AssetError::MissingSource(source.display().to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let stem = Uuid::new_v4().simple().to_string();
        let file_name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
        let target = self.dir.join(file_name);

        tokio::fs::copy(source, &target).await?;
        info!(source = %source.display(), target = %target.display(), "Image stored");

        Ok(target)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_copies_with_fresh_name() {
        let src_dir = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("photo.JPG");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let store = ImageStore::new(store_dir.path().join("product_images"));
        let first = store.import(&source).await.unwrap();
        let second = store.import(&source).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.extension().unwrap(), "JPG");
        assert!(first.starts_with(store.dir()));
        assert_eq!(std::fs::read(&first).unwrap(), b"jpeg bytes");
        // the original stays where it was
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_import_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let err = store.import(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, AssetError::MissingSource(_)));
    }
}
