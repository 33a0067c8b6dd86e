#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Bootstrap wiring for the gift shop server.
//!
//! Loads configuration, installs logging, prepares the catalog on disk, and
//! serves the HTTP API until a shutdown signal arrives.

pub mod bootstrap;
pub mod error;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
