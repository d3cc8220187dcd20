//! HTTP value types shared by every stage of the pipeline.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data, with no
//! reference to a transport. Header and query collections are ordered lists
//! of `(name, value)` pairs rather than maps: repeated names are legal, and
//! the order in which entries were added is the order they go on the wire.
//!
//! Header names are case-insensitive on lookup and case-preserving on
//! storage. Query names are exact on lookup.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::Serialize;

/// Header names that are derived from a [`Body`] and may never be set by hand.
pub(crate) const BODY_DERIVED_HEADERS: [&str; 2] = ["Content-Type", "Content-Length"];

/// Returns `true` if `path` is empty or starts with `/`.
pub fn is_valid_path(path: &str) -> bool {
    path.is_empty() || path.starts_with('/')
}

/// Returns the first header in `headers` that only a [`Body`] may produce.
pub(crate) fn body_derived_header(headers: &Headers) -> Option<&str> {
    headers
        .names()
        .find(|name| BODY_DERIVED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)))
}

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    /// Methods whose requests must carry a body.
    pub fn requires_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a method name that is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method `{0}`")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            "TRACE" => Method::Trace,
            "CONNECT" => Method::Connect,
            _ => return Err(UnknownMethod(s.to_string())),
        };
        Ok(method)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The class of an HTTP status code, taken from its first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Successful,
    Redirection,
    ClientError,
    ServerError,
}

/// A status code known to lie in `100..=599`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(u16);

impl Status {
    /// Returns `None` for codes outside the five standard classes.
    pub fn from_code(code: u16) -> Option<Self> {
        (100..=599).contains(&code).then_some(Self(code))
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn class(&self) -> StatusClass {
        match self.0 {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Successful,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    pub fn is_success(&self) -> bool {
        self.class() == StatusClass::Successful
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Headers and query parameters
// ---------------------------------------------------------------------------

/// Ordered header list. Lookups ignore ASCII case; stored names keep theirs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value stored under `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

/// Ordered query parameter list. Lookups are exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    entries: Vec<(String, String)>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for QueryParameters {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";
const JSON: &str = "application/json";

/// Request payload. The body is the only source of `Content-Type` and
/// `Content-Length` on a resolved request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    None,
    Plain {
        text: String,
        content_type: Option<String>,
    },
    Encoded {
        bytes: Bytes,
        content_type: String,
    },
}

impl Body {
    pub fn plain(text: impl Into<String>) -> Self {
        Body::Plain {
            text: text.into(),
            content_type: None,
        }
    }

    pub fn plain_with_type(text: impl Into<String>, content_type: impl Into<String>) -> Self {
        Body::Plain {
            text: text.into(),
            content_type: Some(content_type.into()),
        }
    }

    pub fn encoded(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Body::Encoded {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Serialize `value` as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Body::encoded(bytes, JSON))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// The `Content-Type` this body puts on the wire.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Body::None => None,
            Body::Plain { content_type, .. } => Some(content_type.as_deref().unwrap_or(PLAIN_TEXT)),
            Body::Encoded { content_type, .. } => Some(content_type),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::None => Bytes::new(),
            Body::Plain { text, .. } => Bytes::copy_from_slice(text.as_bytes()),
            Body::Encoded { bytes, .. } => bytes.clone(),
        }
    }

    /// Byte length reported in `Content-Length`.
    pub fn len(&self) -> usize {
        match self {
            Body::None => 0,
            Body::Plain { text, .. } => text.len(),
            Body::Encoded { bytes, .. } => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_rule() {
        assert!(is_valid_path(""));
        assert!(is_valid_path("/"));
        assert!(is_valid_path("/x"));
        assert!(!is_valid_path("x"));
        assert!(!is_valid_path(" /x"));
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert!("FETCH".parse::<Method>().is_err());
    }

    #[test]
    fn status_classes() {
        assert_eq!(Status::from_code(101).unwrap().class(), StatusClass::Informational);
        assert_eq!(Status::from_code(204).unwrap().class(), StatusClass::Successful);
        assert_eq!(Status::from_code(302).unwrap().class(), StatusClass::Redirection);
        assert_eq!(Status::from_code(401).unwrap().class(), StatusClass::ClientError);
        assert_eq!(Status::from_code(503).unwrap().class(), StatusClass::ServerError);
        assert!(Status::from_code(99).is_none());
        assert!(Status::from_code(600).is_none());
    }

    #[test]
    fn header_lookup_ignores_case_and_keeps_stored_case() {
        let mut headers = Headers::new();
        headers.append("X-Trace", "a");
        headers.append("x-trace", "b");
        assert_eq!(headers.get("X-TRACE"), Some("a"));
        assert_eq!(headers.get_all("x-Trace").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["X-Trace", "x-trace"]);
    }

    #[test]
    fn header_value_outlives_the_lookup_name() {
        let headers: Headers = [("Accept", "application/json")].into_iter().collect();
        let value = {
            let name = String::from("accept");
            headers.get(&name)
        };
        assert_eq!(value, Some("application/json"));
    }

    #[test]
    fn query_lookup_is_exact() {
        let query: QueryParameters = [("Page", "2")].into_iter().collect();
        assert_eq!(query.get("Page"), Some("2"));
        assert_eq!(query.get("page"), None);
    }

    #[test]
    fn body_derived_header_detection() {
        let headers: Headers = [("Accept", "*/*"), ("content-length", "3")].into_iter().collect();
        assert_eq!(body_derived_header(&headers), Some("content-length"));
        let headers: Headers = [("Accept", "*/*")].into_iter().collect();
        assert_eq!(body_derived_header(&headers), None);
    }

    #[test]
    fn plain_body_defaults_to_text_plain() {
        let body = Body::plain("hello");
        assert_eq!(body.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(body.len(), 5);
        assert_eq!(&body.to_bytes()[..], b"hello");
    }

    #[test]
    fn json_body_is_encoded() {
        let body = Body::json(&serde_json::json!({"title": "Buy milk"})).unwrap();
        assert_eq!(body.content_type(), Some("application/json"));
        let decoded: serde_json::Value = serde_json::from_slice(&body.to_bytes()).unwrap();
        assert_eq!(decoded["title"], "Buy milk");
    }

    #[test]
    fn none_body_has_no_type() {
        assert!(Body::None.content_type().is_none());
        assert!(Body::None.is_empty());
    }
}
