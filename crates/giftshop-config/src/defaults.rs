//! Default values applied when neither the environment nor `config.json`
//! supplies a setting.

/// Port used when `PORT` is unset.
pub const DEFAULT_HTTP_PORT: u16 = 3000;
/// Bind address used when `GIFTSHOP_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
/// Shop name shown on the storefront.
pub const DEFAULT_SHOP_NAME: &str = "Gift Shop";
/// Static asset directory, relative to the root directory.
pub const PUBLIC_DIR_NAME: &str = "public";
/// Image directory, relative to the public directory.
pub const PRODUCTS_DIR_NAME: &str = "products";
/// Metadata store, relative to the root directory.
pub const DATA_FILE_NAME: &str = "items.json";
/// Optional `KEY=value` file read into the process environment at startup.
pub const ENV_FILE_NAME: &str = ".env";
/// Optional settings file, relative to the root directory.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Maximum size of a single uploaded image.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Maximum number of images per upload request.
pub const MAX_FILES_PER_UPLOAD: usize = 20;
/// Titles longer than this are truncated.
pub const MAX_TITLE_CHARS: usize = 120;
