//! Turning a `RemoteConfig` and a `Request` into the request that goes on
//! the wire.
//!
//! # Design
//! Resolution is synchronous and pure: the same config and request always
//! produce equal `WireRequest`s, and nothing is sent until resolution has
//! succeeded. Steps, in order:
//! 1. scheme (request, then config, then `https`), host, port, credentials;
//! 2. path = base path + request path, plain concatenation;
//! 3. query = merge(query policy, config query, request query); no `?` when
//!    the merged set is empty;
//! 4. headers = merge(header policy, config headers, request headers),
//!    minus any body-derived names a custom policy produced, followed by
//!    `Content-Type` and `Content-Length` taken from the body. Every name
//!    must be an HTTP token and no value may contain CR, LF or NUL.

use bytes::Bytes;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::RejectionError;
use crate::http::{self, Headers, Method};
use crate::merge::merge;
use crate::request::Request;

pub const DEFAULT_SCHEME: &str = "https";

/// A fully resolved request. Only [`resolve`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    method: Method,
    url: Url,
    headers: Headers,
    body: Bytes,
}

impl WireRequest {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The URL with any password replaced, for logs.
    pub fn redacted_url(&self) -> String {
        if self.url.password().is_none() {
            return self.url.to_string();
        }
        let mut url = self.url.clone();
        // Cannot fail: the URL already carries credentials.
        let _ = url.set_password(Some("redacted"));
        url.to_string()
    }
}

pub fn resolve(config: &RemoteConfig, request: &Request) -> Result<WireRequest, RejectionError> {
    let scheme = request.scheme().or(config.scheme()).unwrap_or(DEFAULT_SCHEME);
    let mut url = Url::parse(&format!("{scheme}://{}", config.host()))?;
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(RejectionError::InvalidUrl(format!(
            "`{scheme}://{}` has no host",
            config.host()
        )));
    }

    if let Some(port) = config.port() {
        url.set_port(Some(port))
            .map_err(|()| RejectionError::InvalidUrl(format!("cannot set port {port}")))?;
    }
    if let Some(credentials) = config.credentials() {
        url.set_username(&credentials.user)
            .map_err(|()| RejectionError::InvalidUrl("cannot set user name".to_string()))?;
        url.set_password(credentials.password.as_deref())
            .map_err(|()| RejectionError::InvalidUrl("cannot set password".to_string()))?;
    }

    url.set_path(&format!("{}{}", config.path(), request.path()));

    let query = merge(config.query_policy(), config.query(), request.query())?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query.iter() {
            pairs.append_pair(name, value);
        }
    }
    url.set_fragment(request.fragment());

    let merged = merge(config.header_policy(), config.headers(), request.headers())?;
    let mut headers: Headers = merged
        .iter()
        .filter(|(name, _)| !http::BODY_DERIVED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)))
        .collect();
    let body = request.body();
    if let Some(content_type) = body.content_type() {
        headers.append("Content-Type", content_type);
        headers.append("Content-Length", body.len().to_string());
    }
    for (name, value) in headers.iter() {
        if ::http::HeaderName::from_bytes(name.as_bytes()).is_err() || ::http::HeaderValue::from_str(value).is_err() {
            return Err(RejectionError::InvalidHeader { name: name.to_string() });
        }
    }

    Ok(WireRequest {
        method: request.method(),
        url,
        headers,
        body: body.to_bytes(),
    })
}
