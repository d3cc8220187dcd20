//! The abstract request an endpoint produces.
//!
//! A `Request` knows nothing about hosts or base paths; those come from the
//! `RemoteConfig` at resolution time. All invariants are checked once, by
//! `RequestBuilder::build`, and the value is immutable afterwards.

use crate::error::RequestError;
use crate::http::{self, Body, Headers, Method, QueryParameters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    body: Body,
    fragment: Option<String>,
    query: QueryParameters,
    headers: Headers,
    scheme: Option<String>,
}

impl Request {
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method,
            path: path.into(),
            body: Body::None,
            fragment: None,
            query: QueryParameters::new(),
            headers: Headers::new(),
            scheme: None,
            permit_body: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Result<Self, RequestError> {
        Self::builder(Method::Get, path).build()
    }

    pub fn head(path: impl Into<String>) -> Result<Self, RequestError> {
        Self::builder(Method::Head, path).build()
    }

    pub fn delete(path: impl Into<String>) -> Result<Self, RequestError> {
        Self::builder(Method::Delete, path).build()
    }

    pub fn options(path: impl Into<String>) -> Result<Self, RequestError> {
        Self::builder(Method::Options, path).build()
    }

    pub fn post(path: impl Into<String>, body: Body) -> Result<Self, RequestError> {
        Self::builder(Method::Post, path).body(body).build()
    }

    pub fn put(path: impl Into<String>, body: Body) -> Result<Self, RequestError> {
        Self::builder(Method::Put, path).body(body).build()
    }

    pub fn patch(path: impl Into<String>, body: Body) -> Result<Self, RequestError> {
        Self::builder(Method::Patch, path).body(body).build()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn query(&self) -> &QueryParameters {
        &self.query
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Scheme override; when unset the remote's scheme applies.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }
}

/// Collects the parts of a `Request` and validates them in `build`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    body: Body,
    fragment: Option<String>,
    query: QueryParameters,
    headers: Headers,
    scheme: Option<String>,
    permit_body: bool,
}

impl RequestBuilder {
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Allow a body on methods that normally carry none (GET, DELETE, ...).
    pub fn permit_body(mut self) -> Self {
        self.permit_body = true;
        self
    }

    pub fn build(self) -> Result<Request, RequestError> {
        if !http::is_valid_path(&self.path) {
            return Err(RequestError::InvalidPath { path: self.path });
        }
        if let Some(name) = http::body_derived_header(&self.headers) {
            return Err(RequestError::ForbiddenHeader { name: name.to_string() });
        }
        if self.method.requires_body() {
            if self.body.is_none() {
                return Err(RequestError::MissingBody { method: self.method });
            }
        } else if !self.body.is_none() && !self.permit_body {
            return Err(RequestError::BodyNotAllowed { method: self.method });
        }

        Ok(Request {
            method: self.method,
            path: self.path,
            body: self.body,
            fragment: self.fragment,
            query: self.query,
            headers: self.headers,
            scheme: self.scheme,
        })
    }
}
