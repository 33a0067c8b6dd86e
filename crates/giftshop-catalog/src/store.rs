//! Flat JSON metadata store (`items.json`).
//!
//! # Design
//! - The whole list is read on every access and rewritten on every mutation.
//! - Reads never fail: a missing or damaged file is an empty catalog.
//! - Entries that are not usable records are kept aside verbatim and written
//!   back after the records, so a rewrite never drops data it did not parse.
//! - Writes go to a sibling temp file that is renamed over the original.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::model::Item;

const EMPTY_STORE: &str = "[]";

/// Parsed contents of `items.json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDocument {
    /// Usable records, in file order.
    pub items: Vec<Item>,
    retained: Vec<Value>,
}

impl ItemDocument {
    /// Document holding only `items`.
    #[must_use]
    pub const fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            retained: Vec::new(),
        }
    }

    /// Entries that could not be read as records; saved back unchanged.
    #[must_use]
    pub fn retained(&self) -> &[Value] {
        &self.retained
    }

    /// Whether any record or set-aside entry points at `filename`.
    #[must_use]
    pub fn references(&self, filename: &str) -> bool {
        self.items.iter().any(|item| item.filename == filename)
            || self
                .retained
                .iter()
                .any(|entry| entry.get("filename").and_then(Value::as_str) == Some(filename))
    }

    fn to_entries(&self, path: &Path) -> CatalogResult<Vec<Value>> {
        let mut entries = Vec::with_capacity(self.items.len() + self.retained.len());
        for item in &self.items {
            entries.push(
                serde_json::to_value(item)
                    .map_err(|source| CatalogError::json("store.serialize", path, source))?,
            );
        }
        entries.extend(self.retained.iter().cloned());
        Ok(entries)
    }
}

/// Metadata records persisted as a JSON array.
#[derive(Debug, Clone)]
pub struct ItemStore {
    path: PathBuf,
}

impl ItemStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty list when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the parent directory or the file cannot be created.
    pub async fn ensure_initialized(&self) -> CatalogResult<()> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| CatalogError::io("store.create_dir", parent, source))?;
        }
        fs::write(&self.path, EMPTY_STORE)
            .await
            .map_err(|source| CatalogError::io("store.init", &self.path, source))?;
        debug!(path = %self.path.display(), "initialised empty item store");
        Ok(())
    }

    /// Every record in file order, plus the entries that are not records.
    pub async fn load(&self) -> ItemDocument {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return ItemDocument::default(),
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "failed to read item store");
                return ItemDocument::default();
            }
        };
        parse_document(&raw, &self.path)
    }

    /// Replace the file contents with `document`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation, the temp write, or the rename fails.
    pub async fn save(&self, document: &ItemDocument) -> CatalogResult<()> {
        let entries = document.to_entries(&self.path)?;
        let serialised = serde_json::to_string_pretty(&entries)
            .map_err(|source| CatalogError::json("store.serialize", &self.path, source))?;
        let temp = self.temp_path();
        fs::write(&temp, serialised)
            .await
            .map_err(|source| CatalogError::io("store.write", &temp, source))?;
        if let Err(source) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(CatalogError::io("store.rename", &self.path, source));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn parse_document(raw: &str, path: &Path) -> ItemDocument {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(path = %path.display(), "item store is not a JSON array; treating as empty");
            return ItemDocument::default();
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "item store is not valid JSON; treating as empty");
            return ItemDocument::default();
        }
    };

    let mut document = ItemDocument::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match Item::deserialize(&entry) {
            Ok(item) => document.items.push(item),
            Err(err) => {
                warn!(error = %err, index, path = %path.display(), "keeping unreadable item entry as is");
                document.retained.push(entry);
            }
        }
    }
    document
}
