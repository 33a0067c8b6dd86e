//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, get_service, post},
};
use giftshop_config::{AdminSecret, ContactConfig, ShopConfig, UploadLimits};
use giftshop_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{Span, info};

use crate::catalog::SharedCatalog;
use crate::error::{ApiServerError, ApiServerResult};
use crate::http::admin::{delete, edit, upload};
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::health::{health, metrics};
use crate::http::products::{list_products, storefront};
use crate::http::telemetry::HttpMetricsLayer;
use crate::state::ApiState;

const ADMIN_PAGE: &str = "admin.html";

/// Settings the HTTP layer needs from the shop configuration.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Shared admin password; admin mutations are refused when absent.
    pub admin: Option<AdminSecret>,
    /// Seller contact details for listing links.
    pub contact: ContactConfig,
    /// Upload size and count limits.
    pub limits: UploadLimits,
    /// Directory served for unmatched paths (`/` serves `index.html`).
    pub public_dir: PathBuf,
    /// Directory served under `/products`.
    pub products_dir: PathBuf,
}

impl ApiSettings {
    /// Extract the HTTP settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &ShopConfig) -> Self {
        Self {
            admin: config.admin.clone(),
            contact: config.contact.clone(),
            limits: config.upload,
            public_dir: config.paths.public_dir.clone(),
            products_dir: config.paths.products_dir.clone(),
        }
    }
}

/// Axum router wrapper that hosts the storefront API and static site.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the API server with shared dependencies wired through application state.
    #[must_use]
    pub fn new(settings: ApiSettings, catalog: SharedCatalog, telemetry: Metrics) -> Self {
        let ApiSettings {
            admin,
            contact,
            limits,
            public_dir,
            products_dir,
        } = settings;
        let state = Arc::new(ApiState::new(
            catalog,
            admin,
            contact,
            limits,
            telemetry.clone(),
        ));

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(giftshop_telemetry::set_request_id_layer())
            .layer(giftshop_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::public_routes()
            .merge(Self::api_routes())
            .merge(Self::admin_routes(&public_dir, limits))
            .nest_service("/products", ServeDir::new(products_dir))
            .fallback_service(ServeDir::new(public_dir))
            .layer(layered)
            .with_state(state);

        Self { router }
    }

    fn public_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    fn api_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/api/products", get(list_products))
            .route("/api/storefront", get(storefront))
    }

    fn admin_routes(public_dir: &std::path::Path, limits: UploadLimits) -> Router<Arc<ApiState>> {
        let upload_limit = DefaultBodyLimit::max(limits.max_request_bytes());

        Router::new()
            .route(
                "/admin",
                get_service(ServeFile::new(public_dir.join(ADMIN_PAGE))),
            )
            .route("/admin/upload", post(upload).layer(upload_limit))
            .route("/admin/edit", post(edit).layer(upload_limit))
            .route("/admin/delete", post(delete))
    }

    /// Serve the API on `addr` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(addr = %addr, "starting api");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    /// Consume the server and return the underlying router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}
