#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Shared test helpers used across the workspace.
//! Layout: fixtures.rs (temporary shop directories, sample images), metrics.rs
//! (Prometheus exposition lookups), multipart.rs (request bodies).

pub mod fixtures;
pub mod metrics;
pub mod multipart;
