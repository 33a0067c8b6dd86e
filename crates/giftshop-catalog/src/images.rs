//! Product image directory.
//!
//! # Design
//! - Only plain file names are ever joined onto the directory.
//! - New files are created with `create_new`, so two uploads racing for the
//!   same name cannot overwrite each other.
//! - Removal is best-effort: a missing file is not an error and other
//!   failures are logged, never surfaced.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{ImageFile, IncomingImage};
use crate::naming::{is_image_name, is_plain_file_name, sanitize_filename, split_extension};

const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Directory of product images.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    root: PathBuf,
}

impl ImageLibrary {
    /// Library rooted at `root`; the directory is created by [`Self::ensure_dir`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the images.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub async fn ensure_dir(&self) -> CatalogResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| CatalogError::io("images.create_dir", &self.root, source))
    }

    /// Path of `name` inside the library, or `None` for names that would escape it.
    #[must_use]
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        is_plain_file_name(name).then(|| self.root.join(name))
    }

    /// Whether an image with this plain name exists.
    pub async fn contains(&self, name: &str) -> bool {
        match self.path_for(name) {
            Some(path) => fs::metadata(&path)
                .await
                .is_ok_and(|metadata| metadata.is_file()),
            None => false,
        }
    }

    /// Every image file in the directory, in directory order.
    ///
    /// Non-image files, sub-directories and names that are not valid UTF-8
    /// are skipped. A missing directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory exists but cannot be read.
    pub async fn list(&self) -> CatalogResult<Vec<ImageFile>> {
        let mut reader = match fs::read_dir(&self.root).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(CatalogError::io("images.read_dir", &self.root, source)),
        };
        let mut images = Vec::new();

        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|source| CatalogError::io("images.next_entry", &self.root, source))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_image_name(&name) {
                continue;
            }
            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(err) => {
                    warn!(error = %err, file = %name, "failed to stat product image");
                    continue;
                }
            };
            let modified_ms = metadata.modified().map_or(0, system_time_to_ms);
            images.push(ImageFile { name, modified_ms });
        }

        Ok(images)
    }

    /// Write an uploaded image under a sanitised, unused name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnsupportedImage`] when the original name lacks
    /// an image extension, or an IO error when the file cannot be written.
    pub async fn store(&self, image: &IncomingImage) -> CatalogResult<String> {
        if !is_image_name(&image.original_name) {
            return Err(CatalogError::UnsupportedImage {
                filename: image.original_name.clone(),
            });
        }
        let sanitized = sanitize_filename(&image.original_name);
        let stamp = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(&sanitized, stamp, attempt);
            let path = self.root.join(&name);
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(CatalogError::io("images.create", &path, source)),
            };
            let written = async {
                file.write_all(&image.bytes).await?;
                file.flush().await
            }
            .await;
            if let Err(source) = written {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(CatalogError::io("images.write", &path, source));
            }
            return Ok(name);
        }

        Err(CatalogError::InvalidInput {
            field: "filename",
            reason: "no_free_name",
            value: Some(sanitized),
        })
    }

    /// Delete an image. Returns whether a file was removed.
    pub async fn remove(&self, name: &str) -> bool {
        let Some(path) = self.path_for(name) else {
            warn!(file = %name, "refusing to remove image outside the products directory");
            return false;
        };
        match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                warn!(error = %err, path = %path.display(), "failed to remove product image");
                false
            }
        }
    }
}

/// `name`, then `{stem}-{stamp}{ext}`, then `{stem}-{stamp}-{n}{ext}`.
fn candidate_name(sanitized: &str, stamp: i64, attempt: u32) -> String {
    if attempt == 0 {
        return sanitized.to_string();
    }
    let (stem, ext) = split_extension(sanitized);
    if attempt == 1 {
        format!("{stem}-{stamp}{ext}")
    } else {
        format!("{stem}-{stamp}-{attempt}{ext}")
    }
}

fn system_time_to_ms(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use giftshop_test_support::fixtures::{TempShop, sample_png};

    fn incoming(name: &str) -> IncomingImage {
        IncomingImage {
            original_name: name.to_string(),
            bytes: sample_png(),
        }
    }

    #[test]
    fn candidate_names_add_stamp_then_counter() {
        assert_eq!(candidate_name("mug.png", 17, 0), "mug.png");
        assert_eq!(candidate_name("mug.png", 17, 1), "mug-17.png");
        assert_eq!(candidate_name("mug.png", 17, 2), "mug-17-2.png");
    }

    #[tokio::test]
    async fn store_sanitizes_and_avoids_collisions() -> Result<()> {
        let shop = TempShop::new()?;
        let library = ImageLibrary::new(shop.products_dir());
        library.ensure_dir().await?;

        let first = library.store(&incoming("Gift Box.png")).await?;
        let second = library.store(&incoming("Gift Box.png")).await?;

        assert_eq!(first, "Gift-Box.png");
        assert_ne!(first, second);
        assert!(second.starts_with("Gift-Box-"));
        assert!(second.ends_with(".png"));
        assert_eq!(std::fs::read(shop.products_dir().join(&second))?, sample_png());
        Ok(())
    }

    #[tokio::test]
    async fn store_rejects_non_images_without_writing() -> Result<()> {
        let shop = TempShop::new()?;
        let library = ImageLibrary::new(shop.products_dir());
        library.ensure_dir().await?;

        let result = library.store(&incoming("notes.txt")).await;
        assert!(matches!(result, Err(CatalogError::UnsupportedImage { .. })));
        assert!(library.list().await?.is_empty());
        assert_eq!(std::fs::read_dir(shop.products_dir())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn list_skips_non_images_and_directories() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("a.png")?;
        shop.write_image("B.JPEG")?;
        std::fs::write(shop.products_dir().join("readme.txt"), b"x")?;
        std::fs::create_dir_all(shop.products_dir().join("nested.png"))?;

        let library = ImageLibrary::new(shop.products_dir());
        let mut names: Vec<String> = library
            .list()
            .await?
            .into_iter()
            .map(|image| image.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["B.JPEG".to_string(), "a.png".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn list_of_missing_directory_is_empty() -> Result<()> {
        let shop = TempShop::empty()?;
        let library = ImageLibrary::new(shop.root().join("absent"));
        assert!(library.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn remove_is_best_effort_and_confined() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("a.png")?;
        let library = ImageLibrary::new(shop.products_dir());

        assert!(library.remove("a.png").await);
        assert!(!library.remove("a.png").await);
        assert!(!library.remove("../items.json").await);
        assert!(shop.data_file().exists());
        Ok(())
    }

    #[tokio::test]
    async fn contains_requires_a_regular_file() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("a.png")?;
        let library = ImageLibrary::new(shop.products_dir());

        assert!(library.contains("a.png").await);
        assert!(!library.contains("b.png").await);
        assert!(!library.contains("../public").await);
        Ok(())
    }
}
