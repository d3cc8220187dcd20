//! Error types for every stage of a remote call.
//!
//! # Design
//! Errors form two levels. `PerformingError` covers dispatch: either the
//! request never became a valid wire request, or the transport failed.
//! `CallError` covers the endpoint pipeline and adds the stages dispatch does
//! not know about: building the request from input, rejecting a non-2xx
//! status, and parsing the response. A non-2xx status is therefore not a
//! `PerformingError`; the exchange itself succeeded.
//!
//! Every wrapping variant keeps its cause as the error source and leaves it
//! out of its own message, so reporters that walk the chain print it once.

use thiserror::Error;

use crate::http::Method;
use crate::response::Response;

/// Boxed error for failures produced by caller-supplied code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Returned when a `Request` violates a construction invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("path `{path}` must be empty or start with `/`")]
    InvalidPath { path: String },

    #[error("header `{name}` is derived from the body and cannot be set directly")]
    ForbiddenHeader { name: String },

    #[error("{method} requests must carry a body")]
    MissingBody { method: Method },

    #[error("{method} requests may not carry a body")]
    BodyNotAllowed { method: Method },
}

/// Returned when building or loading a `RemoteConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("remote host must not be empty")]
    EmptyHost,

    #[error("remote host `{host}` must be a bare host name, optionally with a port")]
    InvalidHost { host: String },

    #[error("base path `{path}` must be empty or start with `/`")]
    InvalidPath { path: String },

    #[error("default header `{name}` is derived from the body and cannot be configured")]
    ForbiddenHeader { name: String },

    #[error("could not read settings: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which kind of mapping a merge was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Header,
    Query,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Header => f.write_str("header"),
            FieldKind::Query => f.write_str("query parameter"),
        }
    }
}

/// A call-level entry collides with a service-level one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} `{name}` is already set by the remote configuration")]
pub struct ConflictError {
    pub kind: FieldKind,
    pub name: String,
}

/// A request could not be resolved into a wire request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("header `{name}` has an invalid name or value")]
    InvalidHeader { name: String },
}

/// Failures raised by a transport or by an unusable transport response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("bad server response: {reason}")]
    BadServerResponse { reason: String },

    #[error("request timed out")]
    TimedOut,

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("unknown network failure")]
    Unknown(#[source] BoxError),
}

/// Failures of the dispatch pipeline.
#[derive(Debug, Error)]
pub enum PerformingError {
    #[error("request rejected")]
    RejectedRequest(#[source] RejectionError),

    #[error("network failure")]
    NetworkFailure(#[source] TransportError),
}

/// Failures of the endpoint call pipeline. Callers are expected to match on
/// every variant.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("could not build request")]
    BadInput(#[source] BoxError),

    #[error("request rejected")]
    RejectedRequest(#[source] RejectionError),

    #[error("network failure")]
    NetworkFailure(#[source] TransportError),

    #[error("server answered with status {}", .0.status())]
    HttpError(Response),

    #[error("could not parse response")]
    BadResponse(#[source] BoxError),
}

impl From<PerformingError> for CallError {
    fn from(err: PerformingError) -> Self {
        match err {
            PerformingError::RejectedRequest(e) => CallError::RejectedRequest(e),
            PerformingError::NetworkFailure(e) => CallError::NetworkFailure(e),
        }
    }
}
