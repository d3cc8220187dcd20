//! The boundary where bytes actually leave the process.
//!
//! # Design
//! The pipeline never touches sockets. It hands a resolved [`WireRequest`]
//! to a `Transport` and gets back a [`RawResponse`] or a [`TransportError`].
//! HTTP error statuses are data, not errors: a transport must return 4xx and
//! 5xx answers as `Ok`. Implementations must be safe to call concurrently;
//! the pipeline adds no locking around them.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::resolve::WireRequest;
use crate::response::RawResponse;

#[cfg(feature = "ureq-transport")]
pub mod blocking;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the complete response.
    async fn perform(&self, request: &WireRequest) -> Result<RawResponse, TransportError>;
}
