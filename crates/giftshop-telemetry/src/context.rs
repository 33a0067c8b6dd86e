//! Process and request context for log lines.
//!
//! # Design
//! - The process-wide `app` span carries the service name and build SHA.
//! - The request id and matched route of the request being served live in a
//!   task-local, so handlers deep in the stack can tag their logs without
//!   threading them through every call.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `app` span for `service`.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let service = service.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", service = %service, build_sha = %build_sha()),
        ));
        Self {
            _guard: span.enter(),
        }
    }
}

/// Identifiers of the request being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Arc<str>,
    route: Arc<str>,
}

impl RequestContext {
    /// Value of the `x-request-id` header; empty when the client sent none.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Route label the request was counted under.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Context of the current task, if it is serving a request.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE_REQUEST.try_with(Clone::clone).ok()
    }
}

tokio::task_local! {
    static ACTIVE_REQUEST: RequestContext;
}

/// Run `fut` with `request_id` and `route` visible through [`RequestContext::current`].
pub async fn with_request_context<Fut, T>(
    request_id: impl Into<String>,
    route: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let context = RequestContext {
        request_id: Arc::from(request_id.into()),
        route: Arc::from(route.into()),
    };
    ACTIVE_REQUEST.scope(context, fut).await
}
