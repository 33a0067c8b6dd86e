#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! HTTP surface of the storefront: public listing, admin mutations, static files.
//! Layout: catalog.rs (catalog facade), contact.rs (`WhatsApp` links), error.rs
//! (server errors), state.rs (shared handler state), http/ (router, handlers, middleware).

pub mod catalog;
pub mod contact;
pub mod error;
pub mod http;
pub(crate) mod state;

pub use catalog::{CatalogFacade, SharedCatalog};
pub use error::{ApiServerError, ApiServerResult};
pub use http::router::{ApiServer, ApiSettings};
