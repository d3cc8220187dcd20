//! Service-level configuration shared by every call to one backend.
//!
//! # Design
//! `RemoteConfig` is assembled once by its owner with consuming `with_*`
//! setters and then only read. Setters that could break an invariant (base
//! path, default headers) return `Result`, so an invalid configuration never
//! exists.
//!
//! `RemoteSettings` is the serde form of the same data for loading from a
//! JSON file. Merge policies are behaviour, not data, so settings always
//! produce the default policies.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::http::{self, Headers, QueryParameters};
use crate::merge::MergePolicy;

/// User info placed in the URL authority.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    host: String,
    path: String,
    port: Option<u16>,
    scheme: Option<String>,
    credentials: Option<Credentials>,
    query: QueryParameters,
    headers: Headers,
    query_policy: MergePolicy<QueryParameters>,
    header_policy: MergePolicy<Headers>,
}

impl RemoteConfig {
    pub fn new(host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if !is_bare_authority(&host) {
            return Err(ConfigError::InvalidHost { host });
        }
        Ok(Self {
            host,
            path: String::new(),
            port: None,
            scheme: None,
            credentials: None,
            query: QueryParameters::new(),
            headers: Headers::new(),
            query_policy: MergePolicy::default(),
            header_policy: MergePolicy::default(),
        })
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !http::is_valid_path(&path) {
            return Err(ConfigError::InvalidPath { path });
        }
        self.path = path;
        Ok(self)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password,
        });
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if http::BODY_DERIVED_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(&name)) {
            return Err(ConfigError::ForbiddenHeader { name });
        }
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn with_query_policy(mut self, policy: MergePolicy<QueryParameters>) -> Self {
        self.query_policy = policy;
        self
    }

    pub fn with_header_policy(mut self, policy: MergePolicy<Headers>) -> Self {
        self.header_policy = policy;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn query(&self) -> &QueryParameters {
        &self.query
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn query_policy(&self) -> &MergePolicy<QueryParameters> {
        &self.query_policy
    }

    pub fn header_policy(&self) -> &MergePolicy<Headers> {
        &self.header_policy
    }
}

/// `host` names a host (and optionally a port) and nothing else: no path,
/// query, fragment or user info.
fn is_bare_authority(host: &str) -> bool {
    match Url::parse(&format!("https://{host}")) {
        Ok(url) => {
            url.host().is_some()
                && url.path() == "/"
                && url.query().is_none()
                && url.fragment().is_none()
                && url.username().is_empty()
                && url.password().is_none()
        }
        Err(_) => false,
    }
}

/// On-disk form of a [`RemoteConfig`].
///
/// ```json
/// {
///   "host": "api.example.com",
///   "path": "/v1",
///   "headers": { "Accept": "application/json" },
///   "query": { "api-version": "2" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSettings {
    pub host: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl RemoteSettings {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn into_config(self) -> Result<RemoteConfig, ConfigError> {
        let mut config = RemoteConfig::new(self.host)?.with_path(self.path)?;
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(scheme) = self.scheme {
            config = config.with_scheme(scheme);
        }
        if let Some(user) = self.user {
            config = config.with_credentials(user, self.password);
        }
        for (name, value) in self.query {
            config = config.with_query(name, value);
        }
        for (name, value) in self.headers {
            config = config.with_header(name, value)?;
        }
        Ok(config)
    }
}
