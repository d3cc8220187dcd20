//! Responses as they leave the transport and as endpoints see them.
//!
//! # Design
//! A transport hands back a `RawResponse`: whatever status number and headers
//! it received, unchecked. `Response::from_raw` is the single place where a
//! raw answer becomes a typed one; a status outside `100..=599` is not an
//! HTTP answer at all and is reported as a bad server response.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::http::{Headers, Status};

/// Transport-level response, copied verbatim from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Bytes,
    content_type: Option<String>,
}

impl Response {
    pub fn from_raw(raw: RawResponse) -> Result<Self, TransportError> {
        let status = Status::from_code(raw.status).ok_or_else(|| TransportError::BadServerResponse {
            reason: format!("status code {} is not an HTTP status", raw.status),
        })?;
        let content_type = raw.headers.get("content-type").map(str::to_string);
        Ok(Self {
            status,
            headers: raw.headers,
            body: raw.body,
            content_type,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Declared `Content-Type`, verbatim.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Declared media type without parameters, lower-cased.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|mime| mime.trim().to_ascii_lowercase())
    }

    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
