//! Catalog operations over the image library and the metadata store.
//!
//! # Design
//! - Mutations hold one async mutex for their whole read-modify-write cycle.
//! - Files are written only after every input check passed; if persisting
//!   the store fails, files written by the same call are removed again.
//! - An image is deleted only when no remaining record points at it.
//! - Field values are stored exactly as sent; only empty values are skipped.

use std::path::PathBuf;

use chrono::Utc;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::images::ImageLibrary;
use crate::listing::{merge_listing, synthesize_item};
use crate::model::{Item, ItemEdit, Product, UploadBatch};
use crate::naming::{ORPHAN_ID_PREFIX, is_image_name, is_plain_file_name, truncate_chars};
use crate::store::{ItemDocument, ItemStore};

/// Default cap on title length, in characters.
pub const DEFAULT_MAX_TITLE_CHARS: usize = 120;

/// Product catalog: images in a directory, metadata in a JSON file.
#[derive(Debug)]
pub struct Catalog {
    images: ImageLibrary,
    store: ItemStore,
    write_lock: Mutex<()>,
    max_title_chars: usize,
}

impl Catalog {
    /// Catalog over `products_dir` and `data_file`.
    pub fn new(products_dir: impl Into<PathBuf>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            images: ImageLibrary::new(products_dir),
            store: ItemStore::new(data_file),
            write_lock: Mutex::new(()),
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
        }
    }

    /// Override the title length cap.
    #[must_use]
    pub fn with_title_limit(mut self, max_title_chars: usize) -> Self {
        self.max_title_chars = max_title_chars;
        self
    }

    /// Create the image directory and an empty store when missing.
    ///
    /// # Errors
    ///
    /// Returns an IO error when either cannot be created.
    pub async fn initialize(&self) -> CatalogResult<()> {
        self.images.ensure_dir().await?;
        self.store.ensure_initialized().await
    }

    /// Listing of every image with its metadata, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error when the image directory cannot be read.
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        let images = self.images.list().await?;
        let document = self.store.load().await;
        Ok(merge_listing(&images, &document.items))
    }

    /// Store every file of the batch and append one record per file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnsupportedImage`] before anything is written
    /// when any file is not an image, or an IO/JSON error when storing fails.
    pub async fn upload(&self, batch: UploadBatch) -> CatalogResult<Vec<Item>> {
        if let Some(rejected) = batch
            .files
            .iter()
            .find(|file| !is_image_name(&file.original_name))
        {
            return Err(CatalogError::UnsupportedImage {
                filename: rejected.original_name.clone(),
            });
        }
        if batch.files.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await;
        let shared_title = non_empty(batch.title);
        let price = non_empty(batch.price).unwrap_or_default();
        let desc = non_empty(batch.desc).unwrap_or_default();

        let mut created = Vec::with_capacity(batch.files.len());
        let mut written = Vec::with_capacity(batch.files.len());
        for file in &batch.files {
            let filename = match self.images.store(file).await {
                Ok(filename) => filename,
                Err(err) => {
                    self.discard(&written).await;
                    return Err(err);
                }
            };
            written.push(filename.clone());

            let title = shared_title
                .clone()
                .unwrap_or_else(|| file.original_name.clone());
            let mut item = Item::new(
                unique_item_id(&document.items),
                filename,
                truncate_chars(&title, self.max_title_chars),
            );
            item.price.clone_from(&price);
            item.desc.clone_from(&desc);
            document.items.push(item.clone());
            created.push(item);
        }

        if let Err(err) = self.store.save(&document).await {
            self.discard(&written).await;
            return Err(err);
        }
        info!(count = created.len(), "uploaded catalog items");
        Ok(created)
    }

    /// Apply `edit` to one record, adopting an undescribed image when the id
    /// names one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] without touching the disk when the
    /// id is unknown, [`CatalogError::UnsupportedImage`] for a non-image
    /// replacement, or an IO/JSON error when storing fails.
    pub async fn edit(&self, edit: ItemEdit) -> CatalogResult<Item> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await;

        let index = match document.items.iter().position(|item| item.id == edit.id) {
            Some(index) => index,
            None => {
                let filename = self
                    .orphan_filename(&edit.id, &document)
                    .await
                    .ok_or_else(|| CatalogError::not_found(&edit.id))?;
                document.items.push(synthesize_item(&filename));
                document.items.len() - 1
            }
        };

        let replacement = match &edit.image {
            Some(image) => Some(self.images.store(image).await?),
            None => None,
        };

        let ItemEdit { title, price, desc, .. } = edit;
        let item = &mut document.items[index];
        let previous = replacement
            .as_ref()
            .map(|filename| std::mem::replace(&mut item.filename, filename.clone()));
        if let Some(title) = non_empty(title) {
            item.title = truncate_chars(&title, self.max_title_chars);
        }
        if let Some(price) = non_empty(price) {
            item.price = price;
        }
        if let Some(desc) = non_empty(desc) {
            item.desc = desc;
        }
        let updated = item.clone();

        if let Err(err) = self.store.save(&document).await {
            if let Some(filename) = &replacement {
                self.images.remove(filename).await;
            }
            return Err(err);
        }
        if let Some(previous) = previous {
            self.release(&previous, &document).await;
        }
        info!(id = %updated.id, filename = %updated.filename, "edited catalog item");
        Ok(updated)
    }

    /// Remove a record and its image, or an undescribed image by its
    /// synthesised id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when nothing matches, or an IO/JSON
    /// error when the store cannot be rewritten.
    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await;

        if let Some(index) = document.items.iter().position(|item| item.id == id) {
            let removed = document.items.remove(index);
            self.store.save(&document).await?;
            self.release(&removed.filename, &document).await;
            info!(id = %removed.id, filename = %removed.filename, "deleted catalog item");
            return Ok(());
        }

        let filename = self
            .orphan_filename(id, &document)
            .await
            .ok_or_else(|| CatalogError::not_found(id))?;
        self.images.remove(&filename).await;
        info!(id = %id, filename = %filename, "deleted undescribed image");
        Ok(())
    }

    /// File behind an `img-<file>` id, when that image exists and no record
    /// describes it.
    async fn orphan_filename(&self, id: &str, document: &ItemDocument) -> Option<String> {
        let filename = id.strip_prefix(ORPHAN_ID_PREFIX)?;
        if !is_plain_file_name(filename) || !is_image_name(filename) {
            return None;
        }
        if document.items.iter().any(|item| item.filename == filename) {
            return None;
        }
        self.images
            .contains(filename)
            .await
            .then(|| filename.to_string())
    }

    /// Remove `filename` unless another entry still uses it.
    async fn release(&self, filename: &str, remaining: &ItemDocument) {
        if remaining.references(filename) {
            return;
        }
        self.images.remove(filename).await;
    }

    async fn discard(&self, written: &[String]) {
        for filename in written {
            if !self.images.remove(filename).await {
                warn!(filename = %filename, "failed to clean up image after aborted write");
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn unique_item_id(items: &[Item]) -> String {
    let mut rng = rand::rng();
    loop {
        let candidate = format!(
            "item-{}-{}",
            Utc::now().timestamp_millis(),
            rng.random_range(0..1000)
        );
        if !items.iter().any(|item| item.id == candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IncomingImage;
    use anyhow::Result;
    use giftshop_test_support::fixtures::{TempShop, sample_jpeg, sample_png};
    use std::sync::Arc;

    fn catalog(shop: &TempShop) -> Catalog {
        Catalog::new(shop.products_dir(), shop.data_file())
    }

    fn png(name: &str) -> IncomingImage {
        IncomingImage {
            original_name: name.to_string(),
            bytes: sample_png(),
        }
    }

    #[tokio::test]
    async fn initialize_creates_directory_and_store() -> Result<()> {
        let shop = TempShop::empty()?;
        let catalog = Catalog::new(
            shop.root().join("public").join("products"),
            shop.root().join("items.json"),
        );
        catalog.initialize().await?;
        assert!(shop.root().join("public").join("products").is_dir());
        assert_eq!(
            std::fs::read_to_string(shop.root().join("items.json"))?,
            "[]"
        );
        Ok(())
    }

    #[tokio::test]
    async fn upload_creates_one_item_per_file() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        let batch = UploadBatch {
            files: vec![png("Blue Mug.png"), png("card.png")],
            title: Some("Holiday set".to_string()),
            price: Some("N2,500".to_string()),
            desc: None,
        };

        let created = catalog.upload(batch).await?;

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].filename, "Blue-Mug.png");
        assert!(created.iter().all(|item| item.title == "Holiday set"));
        assert!(created.iter().all(|item| item.price == "N2,500"));
        assert!(created.iter().all(|item| item.id.starts_with("item-")));
        assert_ne!(created[0].id, created[1].id);
        assert_eq!(catalog.store.load().await.items, created);
        assert_eq!(catalog.list_products().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn upload_titles_fall_back_to_original_name_and_truncate() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop).with_title_limit(8);
        let batch = UploadBatch {
            files: vec![png("Ceramic Vase.png")],
            title: Some(String::new()),
            ..UploadBatch::default()
        };

        let created = catalog.upload(batch).await?;
        assert_eq!(created[0].title, "Ceramic ");
        Ok(())
    }

    #[tokio::test]
    async fn upload_and_edit_store_text_exactly_as_sent() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        let created = catalog
            .upload(UploadBatch {
                files: vec![png("mug.png")],
                title: Some("  Mug ".to_string()),
                desc: Some("  line one\n".to_string()),
                ..UploadBatch::default()
            })
            .await?;
        assert_eq!(created[0].title, "  Mug ");
        assert_eq!(created[0].desc, "  line one\n");

        let updated = catalog
            .edit(ItemEdit {
                id: created[0].id.clone(),
                price: Some(" ".to_string()),
                desc: Some("line one\n\nline two ".to_string()),
                ..ItemEdit::default()
            })
            .await?;
        assert_eq!(updated.price, " ");
        assert_eq!(updated.desc, "line one\n\nline two ");
        assert_eq!(catalog.store.load().await.items, vec![updated]);
        Ok(())
    }

    #[tokio::test]
    async fn mutations_keep_entries_the_store_cannot_read() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("legacy.png")?;
        shop.write_image("scarf.png")?;
        let legacy = serde_json::json!([
            { "id": 7, "filename": "legacy.png", "title": "Legacy mug", "price": "5" },
            { "filename": "scarf.png", "title": "No id yet" },
            { "id": "item-a", "filename": "scarf.png", "title": "Scarf" }
        ]);
        std::fs::write(shop.data_file(), serde_json::to_string(&legacy)?)?;
        let catalog = catalog(&shop);

        let created = catalog
            .upload(UploadBatch {
                files: vec![png("new.png")],
                ..UploadBatch::default()
            })
            .await?;

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(shop.data_file())?)?;
        let entries = saved.as_array().map(Vec::as_slice).unwrap_or_default();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["id"], "7");
        assert_eq!(entries[0]["title"], "Legacy mug");
        assert_eq!(entries[0]["price"], "5");
        assert_eq!(entries[1]["id"], "item-a");
        assert_eq!(entries[2]["id"], created[0].id.as_str());
        assert_eq!(entries[3], legacy[1]);

        catalog.delete("item-a").await?;
        catalog.delete("7").await?;
        assert_eq!(
            shop.product_files()?,
            vec!["new.png".to_string(), "scarf.png".to_string()]
        );
        assert_eq!(catalog.store.load().await.retained(), [legacy[1].clone()]);
        Ok(())
    }

    #[tokio::test]
    async fn upload_rejects_batch_with_any_non_image() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        let batch = UploadBatch {
            files: vec![png("fine.png"), png("script.sh")],
            ..UploadBatch::default()
        };

        let result = catalog.upload(batch).await;

        assert!(matches!(
            result,
            Err(CatalogError::UnsupportedImage { ref filename }) if filename == "script.sh"
        ));
        assert!(shop.product_files()?.is_empty());
        assert!(catalog.store.load().await.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_upload_is_a_no_op() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        assert!(catalog.upload(UploadBatch::default()).await?.is_empty());
        assert_eq!(std::fs::read_to_string(shop.data_file())?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_uploads_do_not_lose_records() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = Arc::new(catalog(&shop));

        let mut handles = Vec::new();
        for index in 0..8 {
            let catalog = Arc::clone(&catalog);
            handles.push(tokio::spawn(async move {
                catalog
                    .upload(UploadBatch {
                        files: vec![png(&format!("gift-{index}.png"))],
                        ..UploadBatch::default()
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await??;
        }

        assert_eq!(catalog.store.load().await.items.len(), 8);
        assert_eq!(shop.product_files()?.len(), 8);
        Ok(())
    }

    #[tokio::test]
    async fn edit_updates_only_non_empty_fields() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        let created = catalog
            .upload(UploadBatch {
                files: vec![png("mug.png")],
                title: Some("Mug".to_string()),
                price: Some("10".to_string()),
                desc: Some("Blue".to_string()),
            })
            .await?;

        let updated = catalog
            .edit(ItemEdit {
                id: created[0].id.clone(),
                title: Some(String::new()),
                price: Some("12".to_string()),
                ..ItemEdit::default()
            })
            .await?;

        assert_eq!(updated.title, "Mug");
        assert_eq!(updated.price, "12");
        assert_eq!(updated.desc, "Blue");
        assert_eq!(catalog.store.load().await.items, vec![updated]);
        Ok(())
    }

    #[tokio::test]
    async fn edit_replaces_image_and_removes_old_file() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        let created = catalog
            .upload(UploadBatch {
                files: vec![png("old.png")],
                ..UploadBatch::default()
            })
            .await?;

        let updated = catalog
            .edit(ItemEdit {
                id: created[0].id.clone(),
                image: Some(IncomingImage {
                    original_name: "new photo.jpg".to_string(),
                    bytes: sample_jpeg(),
                }),
                ..ItemEdit::default()
            })
            .await?;

        assert_eq!(updated.filename, "new-photo.jpg");
        assert_eq!(shop.product_files()?, vec!["new-photo.jpg".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn edit_keeps_old_file_shared_with_another_record() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("shared.png")?;
        let catalog = catalog(&shop);
        catalog
            .store
            .save(&ItemDocument::new(vec![
                Item::new("item-a", "shared.png", "A"),
                Item::new("item-b", "shared.png", "B"),
            ]))
            .await?;

        let updated = catalog
            .edit(ItemEdit {
                id: "item-a".to_string(),
                image: Some(png("fresh.png")),
                ..ItemEdit::default()
            })
            .await?;

        assert_eq!(updated.filename, "fresh.png");
        assert_eq!(
            shop.product_files()?,
            vec!["fresh.png".to_string(), "shared.png".to_string()]
        );
        let stored = catalog.store.load().await.items;
        assert_eq!(stored[1].filename, "shared.png");
        Ok(())
    }

    #[tokio::test]
    async fn edit_of_unknown_id_writes_nothing() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);

        let result = catalog
            .edit(ItemEdit {
                id: "item-missing".to_string(),
                image: Some(png("ghost.png")),
                ..ItemEdit::default()
            })
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
        assert!(shop.product_files()?.is_empty());
        assert_eq!(std::fs::read_to_string(shop.data_file())?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn edit_adopts_undescribed_image() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("scarf_red.png")?;
        let catalog = catalog(&shop);

        let updated = catalog
            .edit(ItemEdit {
                id: "img-scarf_red.png".to_string(),
                price: Some("7".to_string()),
                ..ItemEdit::default()
            })
            .await?;

        assert_eq!(updated.id, "img-scarf_red.png");
        assert_eq!(updated.filename, "scarf_red.png");
        assert_eq!(updated.title, "scarf red");
        assert_eq!(updated.price, "7");
        let listed = catalog.list_products().await?;
        assert_eq!(listed[0].item, updated);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_record_and_file() -> Result<()> {
        let shop = TempShop::new()?;
        let catalog = catalog(&shop);
        let created = catalog
            .upload(UploadBatch {
                files: vec![png("mug.png")],
                ..UploadBatch::default()
            })
            .await?;

        catalog.delete(&created[0].id).await?;

        assert!(catalog.store.load().await.items.is_empty());
        assert!(shop.product_files()?.is_empty());
        assert!(matches!(
            catalog.delete(&created[0].id).await,
            Err(CatalogError::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn delete_keeps_file_shared_with_another_record() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("shared.png")?;
        let catalog = catalog(&shop);
        catalog
            .store
            .save(&ItemDocument::new(vec![
                Item::new("item-a", "shared.png", "A"),
                Item::new("item-b", "shared.png", "B"),
            ]))
            .await?;

        catalog.delete("item-a").await?;

        assert_eq!(shop.product_files()?, vec!["shared.png".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_of_undescribed_image_removes_file() -> Result<()> {
        let shop = TempShop::new()?;
        shop.write_image("loose.webp")?;
        let catalog = catalog(&shop);

        catalog.delete("img-loose.webp").await?;
        assert!(shop.product_files()?.is_empty());

        assert!(matches!(
            catalog.delete("img-../items.json").await,
            Err(CatalogError::NotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn item_ids_follow_the_expected_shape() {
        let id = unique_item_id(&[]);
        let mut parts = id.splitn(3, '-');
        assert_eq!(parts.next(), Some("item"));
        assert!(parts.next().is_some_and(|millis| millis.parse::<i64>().is_ok()));
        assert!(
            parts
                .next()
                .and_then(|suffix| suffix.parse::<u32>().ok())
                .is_some_and(|suffix| suffix < 1000)
        );
    }
}
