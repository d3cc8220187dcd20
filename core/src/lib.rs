//! Typed request composition and dispatch over a pluggable HTTP transport.
//!
//! # Overview
//! A [`RemoteConfig`] describes one backend: host, base path, default headers
//! and query parameters, credentials, and how call-level values merge with
//! the defaults. An [`Endpoint`] describes one operation: how to turn a typed
//! input into a [`Request`] and a [`Response`] into a typed output.
//!
//! A call flows through these stages:
//! 1. the endpoint builds an abstract `Request`;
//! 2. [`resolve`] merges it with the config into a [`WireRequest`];
//! 3. [`dispatch::perform`] sends it through a [`Transport`], notifying an
//!    optional [`Interceptor`] before and after;
//! 4. [`endpoint::call`] checks the status class and lets the endpoint parse.
//!
//! # Design
//! - Everything up to the transport is synchronous and pure; invalid requests
//!   are rejected before any I/O.
//! - Invariants are enforced by constructors that return `Result`; an invalid
//!   `Request` or `RemoteConfig` cannot be built.
//! - Failures surface as closed enums ([`PerformingError`], [`CallError`])
//!   carrying their root cause.

pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod merge;
pub mod request;
pub mod resolve;
pub mod response;
pub mod transport;

pub use config::{Credentials, RemoteConfig, RemoteSettings};
pub use dispatch::{Dispatch, Remote};
pub use endpoint::{call, Endpoint, JsonEndpoint};
pub use error::{
    BoxError, CallError, ConfigError, ConflictError, FieldKind, PerformingError, RejectionError, RequestError,
    TransportError,
};
pub use http::{Body, Headers, Method, QueryParameters, Status, StatusClass};
pub use interceptor::{Interceptor, InterceptorChain, TracingInterceptor};
pub use merge::{merge, Fields, MergePolicy};
pub use request::{Request, RequestBuilder};
pub use resolve::{resolve, WireRequest};
pub use response::{RawResponse, Response};
pub use transport::Transport;

#[cfg(feature = "ureq-transport")]
pub use transport::blocking::UreqTransport;
