//! Typed configuration models.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use giftshop_telemetry::LogFormat;

use crate::defaults::{MAX_FILE_BYTES, MAX_FILES_PER_UPLOAD, MAX_TITLE_CHARS};
use crate::secret::AdminSecret;

/// Fully resolved storefront configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Interface the HTTP server binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP server binds to.
    pub http_port: u16,
    /// On-disk locations used by the catalog and static file serving.
    pub paths: StoragePaths,
    /// Shared admin password, when one is configured.
    pub admin: Option<AdminSecret>,
    /// Seller contact details surfaced on the storefront.
    pub contact: ContactConfig,
    /// Upload size and count limits.
    pub upload: UploadLimits,
    /// Explicit log format override.
    pub log_format: Option<LogFormat>,
}

impl ShopConfig {
    /// Socket address assembled from the bind address and port.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

/// Filesystem layout of the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// Directory served as the public site.
    pub public_dir: PathBuf,
    /// Directory holding product images.
    pub products_dir: PathBuf,
    /// JSON array of item metadata.
    pub data_file: PathBuf,
    /// Optional settings file consulted for values missing from the environment.
    pub config_file: PathBuf,
}

/// Seller contact settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    /// Display name of the shop.
    pub shop_name: String,
    /// WhatsApp number as digits only, including the country code.
    pub whatsapp_number: Option<String>,
}

/// Limits applied to admin uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum bytes per uploaded file.
    pub max_file_bytes: usize,
    /// Maximum number of files per upload request.
    pub max_files: usize,
    /// Maximum title length in characters.
    pub max_title_chars: usize,
}

impl UploadLimits {
    /// Upper bound for a whole multipart request body.
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_files)
            .saturating_add(1024 * 1024)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            max_files: MAX_FILES_PER_UPLOAD,
            max_title_chars: MAX_TITLE_CHARS,
        }
    }
}
