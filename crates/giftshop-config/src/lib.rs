#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Layered configuration for the storefront: environment first, then the
//! optional `config.json`, then built-in defaults.
//!
//! Layout: `model.rs` (typed config), `loader.rs` (env + file layering),
//! `validate.rs` (parsing helpers), `secret.rs` (admin password hashing).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod secret;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigLoader, ConfigNotice, EnvSource, LoadedConfig, ProcessEnv, load_env_file,
};
pub use model::{ContactConfig, ShopConfig, StoragePaths, UploadLimits};
pub use secret::AdminSecret;
