//! Temporary shop directories and sample image bytes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use tempfile::TempDir;

/// Smallest valid PNG: one transparent pixel.
const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// JFIF header followed by an end-of-image marker.
const JPEG_STUB: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

/// PNG bytes for upload tests.
#[must_use]
pub fn sample_png() -> Vec<u8> {
    PNG_1X1.to_vec()
}

/// JPEG bytes for upload tests.
#[must_use]
pub fn sample_jpeg() -> Vec<u8> {
    JPEG_STUB.to_vec()
}

/// Shop root in a temporary directory, removed on drop.
///
/// Layout mirrors a deployment: `public/`, `public/products/` and `items.json`
/// directly under the root.
#[derive(Debug)]
pub struct TempShop {
    dir: TempDir,
}

impl TempShop {
    /// Root with `public/products/` created and `items.json` holding `[]`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directories or the store cannot be created.
    pub fn new() -> Result<Self> {
        let shop = Self::empty()?;
        fs::create_dir_all(shop.products_dir())?;
        fs::write(shop.data_file(), "[]")?;
        Ok(shop)
    }

    /// Bare temporary root with nothing in it.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `<root>/public`.
    #[must_use]
    pub fn public_dir(&self) -> PathBuf {
        self.root().join("public")
    }

    /// `<root>/public/products`.
    #[must_use]
    pub fn products_dir(&self) -> PathBuf {
        self.public_dir().join("products")
    }

    /// `<root>/items.json`.
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.root().join("items.json")
    }

    /// Drop a PNG into the products directory under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write_image(&self, name: &str) -> Result<PathBuf> {
        let path = self.products_dir().join(name);
        fs::write(&path, PNG_1X1)?;
        Ok(path)
    }

    /// Write a file into the public directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write_public(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.public_dir().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Replace `items.json` with `items`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or the write fails.
    pub fn write_items(&self, items: &Value) -> Result<()> {
        fs::write(self.data_file(), serde_json::to_string_pretty(items)?)?;
        Ok(())
    }

    /// Parsed contents of `items.json`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing or not JSON.
    pub fn read_items(&self) -> Result<Value> {
        Ok(serde_json::from_str(&fs::read_to_string(self.data_file())?)?)
    }

    /// Sorted file names in the products directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be read.
    pub fn product_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.products_dir())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_shop_has_expected_layout() -> Result<()> {
        let shop = TempShop::new()?;
        assert!(shop.products_dir().is_dir());
        assert_eq!(shop.read_items()?, json!([]));
        assert!(shop.product_files()?.is_empty());
        Ok(())
    }

    #[test]
    fn helpers_write_into_the_shop() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("b.png")?;
        shop.write_image("a.png")?;
        shop.write_items(&json!([{ "id": "x", "filename": "a.png" }]))?;

        assert_eq!(shop.product_files()?, vec!["a.png", "b.png"]);
        assert_eq!(shop.read_items()?[0]["id"], json!("x"));
        Ok(())
    }

    #[test]
    fn samples_carry_format_signatures() {
        assert!(sample_png().starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(sample_jpeg().starts_with(&[0xFF, 0xD8]));
    }
}
