//! Shared admin password check.
//!
//! The password travels in the request body (`password` field) like the admin
//! page sends it; scripted clients may use the `x-giftshop-admin-password`
//! header instead. A request carrying the header is judged on the header
//! alone, before its body is read.

use axum::http::HeaderMap;
use giftshop_telemetry::RequestContext;
use tokio::task;
use tracing::{error, warn};

use crate::http::constants::HEADER_ADMIN_PASSWORD;
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Non-empty password sent in the admin header.
pub(crate) fn header_password(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(HEADER_ADMIN_PASSWORD)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Check `candidate` against the configured secret.
///
/// Argon2 verification is CPU-bound, so it runs on the blocking pool.
pub(crate) async fn authorize(state: &ApiState, candidate: Option<&str>) -> Result<(), ApiError> {
    let Some(secret) = state.admin.clone() else {
        warn!(
            route = %current_route(),
            "admin request rejected: no admin password configured"
        );
        return Err(ApiError::forbidden());
    };

    let candidate = candidate.unwrap_or_default().to_owned();
    match task::spawn_blocking(move || secret.verify(&candidate)).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(route = %current_route(), "admin request rejected: invalid password");
            Err(ApiError::forbidden())
        }
        Err(err) => {
            error!(error = %err, route = %current_route(), "password verification task failed");
            Err(ApiError::internal())
        }
    }
}

fn current_route() -> String {
    RequestContext::current().map_or_else(String::new, |context| context.route().to_string())
}
