//! A [`Transport`] backed by `ureq`'s blocking agent.
//!
//! Each request runs on tokio's blocking pool, so the async caller is never
//! stalled. The agent is configured to return 4xx/5xx answers as data.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ureq::Agent;

use crate::error::TransportError;
use crate::http::Headers;
use crate::resolve::WireRequest;
use crate::response::RawResponse;
use crate::transport::Transport;

/// Upper bound on a request made through [`UreqTransport::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking `ureq` agent driven from async code.
///
/// `perform` must be polled inside a tokio runtime; outside one it panics.
///
/// Dropping the `perform` future stops waiting but cannot interrupt the
/// blocking request, which runs until it completes or its timeout expires.
/// Its outcome is discarded and no interceptor sees it. Every agent built
/// here carries a global timeout so abandoned requests stay bounded.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// An agent with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Fail any request that takes longer than `timeout` end to end.
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn perform(&self, request: &WireRequest) -> Result<RawResponse, TransportError> {
        let agent = self.agent.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || execute(&agent, &request))
            .await
            .map_err(|e| TransportError::Unknown(Box::new(e)))?
    }
}

fn execute(agent: &Agent, request: &WireRequest) -> Result<RawResponse, TransportError> {
    let mut builder = ureq::http::Request::builder()
        .method(request.method().as_str())
        .uri(request.url().as_str());
    for (name, value) in request.headers().iter() {
        builder = builder.header(name, value);
    }

    let result = if request.body().is_empty() {
        let http_request = builder.body(()).map_err(|e| TransportError::Unknown(Box::new(e)))?;
        agent.run(http_request)
    } else {
        let http_request = builder
            .body(request.body().to_vec())
            .map_err(|e| TransportError::Unknown(Box::new(e)))?;
        agent.run(http_request)
    };
    let mut response = result.map_err(classify)?;

    let status = response.status().as_u16();
    let headers: Headers = response
        .headers()
        .iter()
        .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
        .collect();
    let body = response.body_mut().read_to_vec().map_err(classify)?;

    Ok(RawResponse {
        status,
        headers,
        body: Bytes::from(body),
    })
}

fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::TimedOut,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportError::Connect(err.to_string()),
        ureq::Error::Io(ref e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            TransportError::Connect(err.to_string())
        }
        other => TransportError::Unknown(Box::new(other)),
    }
}
