//! Shared state handed to every handler.

use giftshop_config::{AdminSecret, ContactConfig, UploadLimits};
use giftshop_telemetry::Metrics;

use crate::catalog::SharedCatalog;
use crate::http::errors::ApiError;

pub(crate) struct ApiState {
    pub(crate) catalog: SharedCatalog,
    pub(crate) admin: Option<AdminSecret>,
    pub(crate) contact: ContactConfig,
    pub(crate) limits: UploadLimits,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) fn new(
        catalog: SharedCatalog,
        admin: Option<AdminSecret>,
        contact: ContactConfig,
        limits: UploadLimits,
        telemetry: Metrics,
    ) -> Self {
        Self {
            catalog,
            admin,
            contact,
            limits,
            telemetry,
        }
    }

    /// Count the outcome of an admin mutation; rejected requests are also
    /// counted by reason.
    pub(crate) fn record_mutation<T>(&self, operation: &str, result: &Result<T, ApiError>) {
        match result {
            Ok(_) => self.telemetry.inc_catalog_mutation(operation, "success"),
            Err(err) if err.is_server_error() => {
                self.telemetry.inc_catalog_mutation(operation, "failed");
            }
            Err(err) => {
                self.telemetry.inc_catalog_mutation(operation, "rejected");
                self.telemetry.inc_upload_rejection(err.reason());
            }
        }
    }
}
