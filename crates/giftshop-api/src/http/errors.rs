//! JSON error bodies: `{ success: false, message, type, status }`.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use giftshop_catalog::CatalogError;
use giftshop_telemetry::RequestContext;
use serde::Serialize;
use tracing::error;

use crate::http::constants::{
    MSG_INTERNAL, MSG_MALFORMED_BODY, MSG_NOT_FOUND, MSG_UNAUTHORIZED, MSG_UNSUPPORTED_IMAGE,
    PROBLEM_BAD_REQUEST, PROBLEM_INTERNAL, PROBLEM_NOT_FOUND, PROBLEM_PAYLOAD_TOO_LARGE,
    PROBLEM_TOO_MANY_FILES, PROBLEM_UNAUTHORIZED, PROBLEM_UNSUPPORTED_IMAGE,
};

/// Error returned by handlers and rendered as a JSON body.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    status: u16,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            MSG_INTERNAL,
        )
    }

    pub(crate) fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, PROBLEM_UNAUTHORIZED, MSG_UNAUTHORIZED)
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, message)
    }

    pub(crate) fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, PROBLEM_NOT_FOUND, MSG_NOT_FOUND)
    }

    pub(crate) fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            PROBLEM_PAYLOAD_TOO_LARGE,
            message,
        )
    }

    pub(crate) fn too_many_files(max_files: usize) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            PROBLEM_TOO_MANY_FILES,
            format!("Too many files. At most {max_files} per request."),
        )
    }

    pub(crate) fn unsupported_image() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            PROBLEM_UNSUPPORTED_IMAGE,
            MSG_UNSUPPORTED_IMAGE,
        )
    }

    /// Map a multipart stream failure; body-limit overruns keep their 413.
    pub(crate) fn from_multipart(err: &MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large("Request body is too large.")
        } else {
            Self::bad_request(MSG_MALFORMED_BODY)
        }
    }

    pub(crate) fn from_multipart_rejection(rejection: &MultipartRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large("Request body is too large.")
        } else {
            Self::bad_request(MSG_MALFORMED_BODY)
        }
    }

    pub(crate) fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Short label for metrics: the last segment of the problem URI.
    pub(crate) fn reason(&self) -> &'static str {
        self.kind.rsplit('/').next().unwrap_or(self.kind)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => Self::not_found(),
            CatalogError::UnsupportedImage { .. } => Self::unsupported_image(),
            CatalogError::InvalidInput { field, reason, .. } => {
                Self::bad_request(format!("Invalid {field}: {reason}."))
            }
            CatalogError::Io { .. } | CatalogError::Json { .. } => {
                let request = RequestContext::current();
                error!(
                    error = %err,
                    detail = ?err,
                    request_id = request.as_ref().map_or("", RequestContext::request_id),
                    "catalog operation failed"
                );
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: &self.message,
            kind: self.kind,
            status: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}
