#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Product catalog backed by an image directory and a flat JSON store.
//!
//! Layout: `model.rs` (records and requests), `naming.rs` (file name rules),
//! `images.rs` (image directory), `store.rs` (`items.json`), `listing.rs`
//! (image/metadata merge), `service.rs` (`Catalog` CRUD operations).

pub mod error;
pub mod images;
pub mod listing;
pub mod model;
pub mod naming;
pub mod service;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use images::ImageLibrary;
pub use listing::merge_listing;
pub use model::{ImageFile, IncomingImage, Item, ItemEdit, Product, UploadBatch};
pub use service::{Catalog, DEFAULT_MAX_TITLE_CHARS};
pub use store::{ItemDocument, ItemStore};
