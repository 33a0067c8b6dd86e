//! Startup sequence: configuration, logging, catalog preparation, HTTP serving.

use std::future::{Future, pending};
use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use giftshop_api::{ApiServer, ApiSettings};
use giftshop_catalog::Catalog;
use giftshop_config::defaults::ENV_FILE_NAME;
use giftshop_config::{ConfigLoader, ConfigNotice, LoadedConfig, ShopConfig, load_env_file};
use giftshop_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha};
use tokio::signal;
use tracing::{info, warn};

/// Dependencies required to bootstrap the gift shop.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    config: ShopConfig,
    notices: Vec<ConfigNotice>,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the process environment, after
    /// filling it from `.env` in the working directory.
    pub(crate) fn from_env() -> AppResult<Self> {
        let env_notice = load_env_file(Path::new(ENV_FILE_NAME));
        let mut loaded = ConfigLoader::from_process_env()
            .load()
            .map_err(|err| AppError::config("config.load", err))?;
        loaded.notices.extend(env_notice);
        Self::from_loaded(loaded)
    }

    fn from_loaded(loaded: LoadedConfig) -> AppResult<Self> {
        let LoadedConfig { config, notices } = loaded;
        let logging = LoggingConfig {
            format: config.log_format.unwrap_or_else(LogFormat::infer),
            ..LoggingConfig::default()
        };
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

        Ok(Self {
            logging,
            config,
            notices,
            telemetry,
        })
    }
}

/// Entry point for the gift shop boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed,
/// the catalog directories cannot be created, or the listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies, shutdown_signal()).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with<F>(dependencies: BootstrapDependencies, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    giftshop_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    launch(dependencies, shutdown).await
}

async fn launch<F>(dependencies: BootstrapDependencies, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let _context = GlobalContextGuard::new("bootstrap");
    info!(build_sha = build_sha(), "gift shop bootstrap starting");

    let BootstrapDependencies {
        logging: _,
        config,
        notices,
        telemetry,
    } = dependencies;

    for notice in &notices {
        report_notice(notice);
    }

    let catalog = Catalog::new(
        config.paths.products_dir.clone(),
        config.paths.data_file.clone(),
    )
    .with_title_limit(config.upload.max_title_chars);
    catalog
        .initialize()
        .await
        .map_err(|err| AppError::catalog("catalog.initialize", err))?;
    info!(
        products_dir = %config.paths.products_dir.display(),
        data_file = %config.paths.data_file.display(),
        "catalog storage ready"
    );

    let api = ApiServer::new(
        ApiSettings::from_config(&config),
        Arc::new(catalog),
        telemetry,
    );

    let addr = config.socket_addr();
    info!(addr = %addr, "Launching API listener");
    api.serve(addr, shutdown)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

fn report_notice(notice: &ConfigNotice) {
    match notice {
        ConfigNotice::ConfigFileUnreadable { path, detail } => warn!(
            path = %path.display(),
            detail = %detail,
            "ignoring unreadable settings file"
        ),
        ConfigNotice::EnvFileUnreadable { path, detail } => warn!(
            path = %path.display(),
            detail = %detail,
            "ignoring unreadable .env file"
        ),
        ConfigNotice::AdminPasswordMissing => {
            warn!("no admin password configured; upload, edit and delete are disabled");
        }
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn load(dir: &TempDir, extra: &[(&str, &str)]) -> Result<LoadedConfig> {
        let mut vars: HashMap<String, String> = extra
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        vars.insert("GIFTSHOP_ROOT".to_string(), dir.path().display().to_string());
        vars.insert("GIFTSHOP_BIND_ADDR".to_string(), "127.0.0.1".to_string());
        Ok(ConfigLoader::new(vars).load()?)
    }

    #[test]
    fn explicit_log_format_overrides_inferred_default() -> Result<()> {
        let dir = TempDir::new()?;
        let deps = BootstrapDependencies::from_loaded(load(
            &dir,
            &[("GIFTSHOP_LOG_FORMAT", "json"), ("ADMIN_PASS", "letmein")],
        )?)?;
        assert_eq!(deps.logging.format, LogFormat::Json);
        assert!(deps.notices.is_empty());
        Ok(())
    }

    #[test]
    fn missing_password_surfaces_as_notice() -> Result<()> {
        let dir = TempDir::new()?;
        let deps = BootstrapDependencies::from_loaded(load(&dir, &[])?)?;
        assert_eq!(deps.logging.format, LogFormat::infer());
        assert!(deps.notices.contains(&ConfigNotice::AdminPasswordMissing));
        for notice in &deps.notices {
            report_notice(notice);
        }
        Ok(())
    }

    #[test]
    fn every_notice_kind_can_be_reported() {
        for notice in [
            ConfigNotice::ConfigFileUnreadable {
                path: "config.json".into(),
                detail: "expected value".to_string(),
            },
            ConfigNotice::EnvFileUnreadable {
                path: ".env".into(),
                detail: "line 1: unexpected character".to_string(),
            },
            ConfigNotice::AdminPasswordMissing,
        ] {
            report_notice(&notice);
        }
    }

    #[tokio::test]
    async fn launch_prepares_storage_and_stops_on_shutdown() -> Result<()> {
        let dir = TempDir::new()?;
        let mut deps =
            BootstrapDependencies::from_loaded(load(&dir, &[("ADMIN_PASS", "letmein")])?)?;
        deps.config.http_port = 0;

        launch(deps, async {}).await?;

        assert!(dir.path().join("public").join("products").is_dir());
        let items: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("items.json"))?)?;
        assert_eq!(items, serde_json::json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn launch_reports_bind_failures() -> Result<()> {
        let dir = TempDir::new()?;
        let occupied = std::net::TcpListener::bind("127.0.0.1:0")?;
        let mut deps = BootstrapDependencies::from_loaded(load(&dir, &[])?)?;
        deps.config.http_port = occupied.local_addr()?.port();

        let result = launch(deps, async {}).await;

        assert!(matches!(
            result,
            Err(AppError::ApiServer {
                operation: "api_server.serve",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn launch_keeps_existing_items() -> Result<()> {
        let dir = TempDir::new()?;
        let existing = r#"[{"id":"item-1","filename":"a.png","title":"Mug","price":"","desc":""}]"#;
        fs::write(dir.path().join("items.json"), existing)?;
        let mut deps = BootstrapDependencies::from_loaded(load(&dir, &[])?)?;
        deps.config.http_port = 0;

        launch(deps, async {}).await?;

        assert_eq!(fs::read_to_string(dir.path().join("items.json"))?, existing);
        Ok(())
    }
}
