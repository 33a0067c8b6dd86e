//! Prometheus-backed metrics registry.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the handful of counters/gauges the storefront cares about.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    catalog_mutations_total: IntCounterVec,
    upload_rejections_total: IntCounterVec,
    catalog_products: IntGauge,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(|source| collector("http_requests_total", source))?;
        let catalog_mutations_total = IntCounterVec::new(
            Opts::new(
                "catalog_mutations_total",
                "Catalog mutations by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .map_err(|source| collector("catalog_mutations_total", source))?;
        let upload_rejections_total = IntCounterVec::new(
            Opts::new(
                "upload_rejections_total",
                "Admin requests rejected before touching the catalog",
            ),
            &["reason"],
        )
        .map_err(|source| collector("upload_rejections_total", source))?;
        let catalog_products = IntGauge::with_opts(Opts::new(
            "catalog_products",
            "Products visible in the latest listing",
        ))
        .map_err(|source| collector("catalog_products", source))?;

        registry
            .register(Box::new(http_requests_total.clone()))
            .map_err(|source| register("http_requests_total", source))?;
        registry
            .register(Box::new(catalog_mutations_total.clone()))
            .map_err(|source| register("catalog_mutations_total", source))?;
        registry
            .register(Box::new(upload_rejections_total.clone()))
            .map_err(|source| register("upload_rejections_total", source))?;
        registry
            .register(Box::new(catalog_products.clone()))
            .map_err(|source| register("catalog_products", source))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                catalog_mutations_total,
                upload_rejections_total,
                catalog_products,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        let code = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[route, code.as_str()])
            .inc();
    }

    /// Count a catalog mutation (`upload`, `edit`, `delete`) and its outcome.
    pub fn inc_catalog_mutation(&self, operation: &str, outcome: &str) {
        self.inner
            .catalog_mutations_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Count an admin request rejected before reaching the catalog.
    pub fn inc_upload_rejection(&self, reason: &str) {
        self.inner
            .upload_rejections_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Record how many products the latest listing returned.
    pub fn set_catalog_products(&self, count: usize) {
        self.inner
            .catalog_products
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}

const fn collector(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsCollector { name, source }
}

const fn register(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsRegister { name, source }
}
