//! # Design
//!
//! - Centralize application-level errors for bootstrap.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be resolved.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: giftshop_config::ConfigError,
    },
    /// Telemetry setup failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: giftshop_telemetry::TelemetryError,
    },
    /// Preparing the catalog on disk failed.
    #[error("catalog operation failed")]
    Catalog {
        /// Operation identifier.
        operation: &'static str,
        /// Source catalog error.
        source: giftshop_catalog::CatalogError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: giftshop_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: giftshop_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: giftshop_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn catalog(
        operation: &'static str,
        source: giftshop_catalog::CatalogError,
    ) -> Self {
        Self::Catalog { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: giftshop_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;
    use std::net::SocketAddr;

    #[test]
    fn app_error_helpers_build_variants() -> Result<(), Box<dyn Error>> {
        let config = AppError::config(
            "config.load",
            giftshop_config::ConfigError::InvalidField {
                field: "PORT",
                reason: "zero",
                value: Some("0".to_string()),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.load",
                ..
            }
        ));

        let catalog = AppError::catalog(
            "catalog.initialize",
            giftshop_catalog::CatalogError::Io {
                operation: "images.ensure_dir",
                path: "public/products".into(),
                source: io::Error::other("read-only"),
            },
        );
        assert!(matches!(catalog, AppError::Catalog { .. }));
        assert!(catalog.source().is_some());

        let addr: SocketAddr = "127.0.0.1:3000".parse()?;
        let api = AppError::api_server(
            "api_server.serve",
            giftshop_api::ApiServerError::Bind {
                addr,
                source: io::Error::from(io::ErrorKind::AddrInUse),
            },
        );
        assert_eq!(api.to_string(), "api server operation failed");
        Ok(())
    }
}
