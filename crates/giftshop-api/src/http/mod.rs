//! HTTP surface modules (router, handlers, middleware).

/// Admin mutation handlers (upload, edit, delete).
pub mod admin;
/// Shared password check for admin routes.
pub mod auth;
/// Shared constants and header names for HTTP surfaces.
pub mod constants;
/// Error bodies and status mapping.
pub mod errors;
/// Health and metrics endpoints.
pub mod health;
/// Public product listing and storefront details.
pub mod products;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
