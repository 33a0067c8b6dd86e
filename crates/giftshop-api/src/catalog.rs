//! Catalog facade abstraction for the API layer.

use std::sync::Arc;

use async_trait::async_trait;
use giftshop_catalog::{Catalog, CatalogResult, Item, ItemEdit, Product, UploadBatch};

/// Catalog operations the HTTP handlers depend on.
#[async_trait]
pub trait CatalogFacade: Send + Sync {
    /// Merged listing of images and metadata, newest first.
    async fn list_products(&self) -> CatalogResult<Vec<Product>>;
    /// Store a batch of images and return the created records.
    async fn upload(&self, batch: UploadBatch) -> CatalogResult<Vec<Item>>;
    /// Apply an edit and return the updated record.
    async fn edit(&self, edit: ItemEdit) -> CatalogResult<Item>;
    /// Delete a record (or an undescribed image) by identifier.
    async fn delete(&self, id: &str) -> CatalogResult<()>;
}

/// Shared reference to the catalog backend.
pub type SharedCatalog = Arc<dyn CatalogFacade>;

#[async_trait]
impl CatalogFacade for Catalog {
    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        Self::list_products(self).await
    }

    async fn upload(&self, batch: UploadBatch) -> CatalogResult<Vec<Item>> {
        Self::upload(self, batch).await
    }

    async fn edit(&self, edit: ItemEdit) -> CatalogResult<Item> {
        Self::edit(self, edit).await
    }

    async fn delete(&self, id: &str) -> CatalogResult<()> {
        Self::delete(self, id).await
    }
}
