//! Combining service-level and call-level headers or query parameters.
//!
//! # Design
//! `merge` is pure and all-or-nothing. Under the default policy a call-level
//! name that matches a service-level name, ignoring ASCII case, is a
//! conflict; the check is case-insensitive for query parameters too, though
//! stored names keep their case. Without a conflict the result holds every
//! service-level entry followed by every call-level entry.
//!
//! A custom policy replaces the whole computation and its output is taken
//! as-is.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConflictError, FieldKind};
use crate::http::{Headers, QueryParameters};

/// A name/value collection that the merge engine can combine.
pub trait Fields: Clone {
    const KIND: FieldKind;

    fn names(&self) -> impl Iterator<Item = &str> + '_;

    /// `self` followed by `other`.
    fn chain(&self, other: &Self) -> Self;

    /// Entries of `self` whose name does not appear in `other`, ignoring case.
    fn excluding(&self, other: &Self) -> Self;
}

fn collides(name: &str, mut names: impl Iterator<Item = impl AsRef<str>>) -> bool {
    names.any(|other| other.as_ref().eq_ignore_ascii_case(name))
}

impl Fields for Headers {
    const KIND: FieldKind = FieldKind::Header;

    fn names(&self) -> impl Iterator<Item = &str> + '_ {
        Headers::names(self)
    }

    fn chain(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).collect()
    }

    fn excluding(&self, other: &Self) -> Self {
        self.iter()
            .filter(|(name, _)| !collides(name, other.names()))
            .collect()
    }
}

impl Fields for QueryParameters {
    const KIND: FieldKind = FieldKind::Query;

    fn names(&self) -> impl Iterator<Item = &str> + '_ {
        QueryParameters::names(self)
    }

    fn chain(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).collect()
    }

    fn excluding(&self, other: &Self) -> Self {
        self.iter()
            .filter(|(name, _)| !collides(name, other.names()))
            .collect()
    }
}

type MergeFn<M> = dyn Fn(&M, &M) -> M + Send + Sync;

/// Rule for combining service-level (`first`) and call-level (`second`)
/// values of one kind.
pub enum MergePolicy<M> {
    RejectOverride,
    /// Trusted as-is. For headers, resolution discards any `Content-Type`
    /// or `Content-Length` the function returns.
    Custom(Arc<MergeFn<M>>),
}

impl<M: Fields + 'static> MergePolicy<M> {
    pub fn custom(f: impl Fn(&M, &M) -> M + Send + Sync + 'static) -> Self {
        MergePolicy::Custom(Arc::new(f))
    }

    /// Service-level entries win; colliding call-level entries are dropped.
    pub fn prefer_service() -> Self {
        Self::custom(|service: &M, call: &M| service.chain(&call.excluding(service)))
    }

    /// Call-level entries win; colliding service-level entries are dropped.
    pub fn prefer_call() -> Self {
        Self::custom(|service: &M, call: &M| service.excluding(call).chain(call))
    }
}

impl<M> Default for MergePolicy<M> {
    fn default() -> Self {
        MergePolicy::RejectOverride
    }
}

impl<M> Clone for MergePolicy<M> {
    fn clone(&self) -> Self {
        match self {
            MergePolicy::RejectOverride => MergePolicy::RejectOverride,
            MergePolicy::Custom(f) => MergePolicy::Custom(Arc::clone(f)),
        }
    }
}

impl<M> fmt::Debug for MergePolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::RejectOverride => f.write_str("RejectOverride"),
            MergePolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub fn merge<M: Fields>(policy: &MergePolicy<M>, service: &M, call: &M) -> Result<M, ConflictError> {
    match policy {
        MergePolicy::RejectOverride => {
            if let Some(name) = call.names().find(|name| collides(name, service.names())) {
                return Err(ConflictError {
                    kind: M::KIND,
                    name: name.to_string(),
                });
            }
            Ok(service.chain(call))
        }
        MergePolicy::Custom(f) => Ok(f(service, call)),
    }
}
