//! Passive observers of dispatch.
//!
//! # Design
//! An interceptor sees each resolved request before it is sent and exactly
//! one outcome afterwards. Notifications return nothing and cannot influence
//! the call. They run synchronously on the calling task, so implementations
//! should hand anything slow off elsewhere.
//!
//! The pipeline calls interceptors through [`notify`], which catches panics:
//! a broken observer is logged and otherwise ignored.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::PerformingError;
use crate::resolve::WireRequest;
use crate::response::Response;

pub trait Interceptor: Send + Sync {
    fn will_perform(&self, _request: &WireRequest) {}

    fn did_succeed(&self, _request: &WireRequest, _response: &Response) {}

    fn did_fail(&self, _request: &WireRequest, _error: &PerformingError) {}
}

/// Run one notification, swallowing any panic it raises.
pub(crate) fn notify(interceptor: Option<&dyn Interceptor>, event: &'static str, f: impl FnOnce(&dyn Interceptor)) {
    let Some(interceptor) = interceptor else {
        return;
    };
    if catch_unwind(AssertUnwindSafe(|| f(interceptor))).is_err() {
        tracing::warn!(event, "interceptor panicked; notification dropped");
    }
}

/// Logs every notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn will_perform(&self, request: &WireRequest) {
        tracing::debug!(
            method = %request.method(),
            url = %request.redacted_url(),
            body_len = request.body().len(),
            "sending request"
        );
    }

    fn did_succeed(&self, request: &WireRequest, response: &Response) {
        tracing::debug!(
            method = %request.method(),
            url = %request.redacted_url(),
            status = response.status().code(),
            body_len = response.body().len(),
            "request completed"
        );
    }

    fn did_fail(&self, request: &WireRequest, error: &PerformingError) {
        tracing::warn!(
            method = %request.method(),
            url = %request.redacted_url(),
            error = error as &dyn std::error::Error,
            "request failed"
        );
    }
}

/// Fans each notification out to several interceptors, in order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Interceptor for InterceptorChain {
    fn will_perform(&self, request: &WireRequest) {
        for i in &self.interceptors {
            notify(Some(i.as_ref()), "will_perform", |i| i.will_perform(request));
        }
    }

    fn did_succeed(&self, request: &WireRequest, response: &Response) {
        for i in &self.interceptors {
            notify(Some(i.as_ref()), "did_succeed", |i| i.did_succeed(request, response));
        }
    }

    fn did_fail(&self, request: &WireRequest, error: &PerformingError) {
        for i in &self.interceptors {
            notify(Some(i.as_ref()), "did_fail", |i| i.did_fail(request, error));
        }
    }
}
