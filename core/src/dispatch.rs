//! The dispatch pipeline: resolve, notify, send, classify, notify.
//!
//! # Design
//! One `perform` is exactly one transport call, with no retries. Per call the
//! states are `building -> dispatching -> succeeded | failed`:
//! - resolution failure ends the call as `RejectedRequest` before any
//!   interceptor runs, since there is no wire request to report;
//! - otherwise `will_perform` fires, the transport runs, and exactly one of
//!   `did_succeed` / `did_fail` fires with the same wire request.
//!
//! A non-2xx status is a successful dispatch. Whether it is an error is the
//! endpoint pipeline's decision.
//!
//! Dropping the returned future cancels the call; `did_succeed` is only
//! reached after the transport future completes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RemoteConfig;
use crate::endpoint::Endpoint;
use crate::error::{CallError, PerformingError};
use crate::interceptor::{notify, Interceptor};
use crate::request::Request;
use crate::resolve::resolve;
use crate::response::Response;
use crate::transport::Transport;

/// Anything that can take an abstract request to a response.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn perform(&self, request: &Request) -> Result<Response, PerformingError>;
}

pub async fn perform(
    config: &RemoteConfig,
    transport: &dyn Transport,
    interceptor: Option<&dyn Interceptor>,
    request: &Request,
) -> Result<Response, PerformingError> {
    let wire = resolve(config, request).map_err(|e| {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            error = &e as &dyn std::error::Error,
            "request rejected"
        );
        PerformingError::RejectedRequest(e)
    })?;

    notify(interceptor, "will_perform", |i| i.will_perform(&wire));
    tracing::debug!(method = %wire.method(), url = %wire.redacted_url(), "dispatching request");

    match transport.perform(&wire).await.and_then(Response::from_raw) {
        Ok(response) => {
            tracing::debug!(
                method = %wire.method(),
                url = %wire.redacted_url(),
                status = response.status().code(),
                "response received"
            );
            notify(interceptor, "did_succeed", |i| i.did_succeed(&wire, &response));
            Ok(response)
        }
        Err(cause) => {
            tracing::warn!(
                method = %wire.method(),
                url = %wire.redacted_url(),
                error = &cause as &dyn std::error::Error,
                "dispatch failed"
            );
            let err = PerformingError::NetworkFailure(cause);
            notify(interceptor, "did_fail", |i| i.did_fail(&wire, &err));
            Err(err)
        }
    }
}

/// A configured connection to one backend.
///
/// Cheap to clone; clones share the configuration, transport and
/// interceptor.
#[derive(Clone)]
pub struct Remote {
    config: Arc<RemoteConfig>,
    transport: Arc<dyn Transport>,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl Remote {
    pub fn new(config: RemoteConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            interceptor: None,
        }
    }

    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Run `endpoint` with `input` through this remote.
    pub async fn call<E: Endpoint>(&self, endpoint: &E, input: &E::Input) -> Result<E::Output, CallError> {
        crate::endpoint::call(endpoint, input, self).await
    }
}

#[async_trait]
impl Dispatch for Remote {
    async fn perform(&self, request: &Request) -> Result<Response, PerformingError> {
        perform(&self.config, self.transport.as_ref(), self.interceptor.as_deref(), request).await
    }
}
