//! Environment and `config.json` layering.
//!
//! # Design
//! - Environment variables win over `config.json`, which wins over defaults.
//!   A `.env` file only fills variables the process environment leaves unset.
//! - Empty values count as unset, matching how the shop has always been deployed.
//! - Problems that should not stop the server (an unreadable settings file, no
//!   admin password) come back as [`ConfigNotice`]s so the caller can log them
//!   once logging is installed.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::defaults::{
    CONFIG_FILE_NAME, DATA_FILE_NAME, DEFAULT_BIND_ADDR, DEFAULT_HTTP_PORT, DEFAULT_SHOP_NAME,
    PRODUCTS_DIR_NAME, PUBLIC_DIR_NAME,
};
use crate::error::ConfigResult;
use crate::model::{ContactConfig, ShopConfig, StoragePaths, UploadLimits};
use crate::secret::AdminSecret;
use crate::validate::{
    normalize_whatsapp_number, parse_bind_addr, parse_log_format, parse_port,
};

const ENV_PORT: &str = "PORT";
const ENV_BIND_ADDR: &str = "GIFTSHOP_BIND_ADDR";
const ENV_ROOT: &str = "GIFTSHOP_ROOT";
const ENV_PUBLIC_DIR: &str = "GIFTSHOP_PUBLIC_DIR";
const ENV_PRODUCTS_DIR: &str = "GIFTSHOP_PRODUCTS_DIR";
const ENV_DATA_FILE: &str = "GIFTSHOP_DATA_FILE";
const ENV_CONFIG_FILE: &str = "GIFTSHOP_CONFIG";
const ENV_ADMIN_PASS: &str = "ADMIN_PASS";
const ENV_SHOP_NAME: &str = "GIFTSHOP_SHOP_NAME";
const ENV_WHATSAPP_NUMBER: &str = "GIFTSHOP_WHATSAPP_NUMBER";
const ENV_LOG_FORMAT: &str = "GIFTSHOP_LOG_FORMAT";

/// Source of environment variables.
pub trait EnvSource {
    /// Look up a variable; `None` when unset or not valid UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Non-fatal findings produced while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNotice {
    /// The settings file exists but could not be read or parsed.
    ConfigFileUnreadable {
        /// Path of the settings file.
        path: PathBuf,
        /// Human-readable failure detail.
        detail: String,
    },
    /// The `.env` file exists but could not be read or parsed.
    EnvFileUnreadable {
        /// Path of the `.env` file.
        path: PathBuf,
        /// Human-readable failure detail.
        detail: String,
    },
    /// No admin password was configured; admin mutations will be refused.
    AdminPasswordMissing,
}

/// Copy variables from the `.env` file at `path` into the process environment.
///
/// Variables already set in the environment keep their values. A missing file
/// is silently ignored; any other failure comes back as a notice.
#[must_use]
pub fn load_env_file(path: &Path) -> Option<ConfigNotice> {
    match dotenvy::from_path(path) {
        Ok(()) => None,
        Err(err) if err.not_found() => None,
        Err(err) => Some(ConfigNotice::EnvFileUnreadable {
            path: path.to_path_buf(),
            detail: err.to_string(),
        }),
    }
}

/// Configuration plus the notices gathered while building it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved configuration.
    pub config: ShopConfig,
    /// Findings to log after logging is initialised.
    pub notices: Vec<ConfigNotice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    admin_pass: Option<String>,
    shop_name: Option<String>,
    whatsapp_number: Option<String>,
}

/// Builds a [`ShopConfig`] from an environment source and the settings file.
pub struct ConfigLoader<E> {
    env: E,
}

impl ConfigLoader<ProcessEnv> {
    /// Loader backed by the process environment.
    #[must_use]
    pub const fn from_process_env() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: EnvSource> ConfigLoader<E> {
    /// Loader backed by a custom environment source.
    pub const fn new(env: E) -> Self {
        Self { env }
    }

    /// Resolve every setting.
    ///
    /// # Errors
    ///
    /// Returns an error when a supplied value is invalid or the admin password
    /// cannot be hashed. A missing or unreadable settings file is not an error.
    pub fn load(&self) -> ConfigResult<LoadedConfig> {
        let mut notices = Vec::new();
        let paths = self.storage_paths();
        let file = match read_file_config(&paths.config_file) {
            Ok(file) => file.unwrap_or_default(),
            Err(detail) => {
                notices.push(ConfigNotice::ConfigFileUnreadable {
                    path: paths.config_file.clone(),
                    detail,
                });
                FileConfig::default()
            }
        };

        let http_port = match self.value(ENV_PORT) {
            Some(raw) => parse_port(ENV_PORT, &raw)?,
            None => DEFAULT_HTTP_PORT,
        };
        let bind_addr = parse_bind_addr(
            ENV_BIND_ADDR,
            &self
                .value(ENV_BIND_ADDR)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;
        let log_format = self
            .value(ENV_LOG_FORMAT)
            .map(|raw| parse_log_format(ENV_LOG_FORMAT, &raw))
            .transpose()?;

        // Passwords are taken verbatim; only an empty value counts as unset.
        let admin_password = self
            .env
            .var(ENV_ADMIN_PASS)
            .filter(|value| !value.is_empty())
            .or_else(|| file.admin_pass.filter(|value| !value.is_empty()));
        let admin = admin_password
            .as_deref()
            .map(AdminSecret::from_plaintext)
            .transpose()?;
        if admin.is_none() {
            notices.push(ConfigNotice::AdminPasswordMissing);
        }

        let shop_name = self
            .value(ENV_SHOP_NAME)
            .or_else(|| non_empty(file.shop_name))
            .unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string());
        let whatsapp_number = match self.value(ENV_WHATSAPP_NUMBER) {
            Some(raw) => Some(normalize_whatsapp_number(ENV_WHATSAPP_NUMBER, &raw)?),
            None => non_empty(file.whatsapp_number)
                .map(|raw| normalize_whatsapp_number("whatsappNumber", &raw))
                .transpose()?,
        };

        Ok(LoadedConfig {
            config: ShopConfig {
                bind_addr,
                http_port,
                paths,
                admin,
                contact: ContactConfig {
                    shop_name,
                    whatsapp_number,
                },
                upload: UploadLimits::default(),
                log_format,
            },
            notices,
        })
    }

    fn storage_paths(&self) -> StoragePaths {
        let root = self
            .value(ENV_ROOT)
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let public_dir = self
            .value(ENV_PUBLIC_DIR)
            .map_or_else(|| root.join(PUBLIC_DIR_NAME), PathBuf::from);
        let products_dir = self
            .value(ENV_PRODUCTS_DIR)
            .map_or_else(|| public_dir.join(PRODUCTS_DIR_NAME), PathBuf::from);
        let data_file = self
            .value(ENV_DATA_FILE)
            .map_or_else(|| root.join(DATA_FILE_NAME), PathBuf::from);
        let config_file = self
            .value(ENV_CONFIG_FILE)
            .map_or_else(|| root.join(CONFIG_FILE_NAME), PathBuf::from);
        StoragePaths {
            public_dir,
            products_dir,
            data_file,
            config_file,
        }
    }

    fn value(&self, name: &str) -> Option<String> {
        non_empty(self.env.var(name))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// `Ok(None)` when the file does not exist; `Err` carries a readable detail.
fn read_file_config(path: &Path) -> Result<Option<FileConfig>, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.to_string()),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| err.to_string())
}
