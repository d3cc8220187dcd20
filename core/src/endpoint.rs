//! Endpoints and the call pipeline that drives them.
//!
//! # Design
//! An endpoint is a stateless description split in two halves, the same way
//! a hand-written client splits each operation into a request builder and a
//! response parser. [`call`] runs the stages strictly in sequence:
//!
//! | stage                      | failure           |
//! |----------------------------|-------------------|
//! | `build_request(input)`     | `BadInput`        |
//! | dispatch                   | `RejectedRequest` / `NetworkFailure` |
//! | status class is 2xx        | `HttpError`       |
//! | `parse(response)`          | `BadResponse`     |

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dispatch::Dispatch;
use crate::error::{BoxError, CallError};
use crate::http::{Body, Method};
use crate::request::Request;
use crate::response::Response;

pub trait Endpoint: Send + Sync {
    type Input: Send + Sync;
    type Output;

    fn build_request(&self, input: &Self::Input) -> Result<Request, BoxError>;

    /// Only called with 2xx responses.
    fn parse(&self, response: Response) -> Result<Self::Output, BoxError>;
}

pub async fn call<E, D>(endpoint: &E, input: &E::Input, dispatch: &D) -> Result<E::Output, CallError>
where
    E: Endpoint + ?Sized,
    D: Dispatch + ?Sized,
{
    let request = endpoint.build_request(input).map_err(CallError::BadInput)?;
    let response = dispatch.perform(&request).await?;
    if !response.status().is_success() {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            status = response.status().code(),
            "endpoint answered with an error status"
        );
        return Err(CallError::HttpError(response));
    }
    endpoint.parse(response).map_err(CallError::BadResponse)
}

type PathFn<I> = dyn Fn(&I) -> String + Send + Sync;

/// An endpoint that speaks JSON in both directions.
///
/// For POST, PUT and PATCH the input is the JSON body; for other methods the
/// input only feeds the path. An empty response body decodes as JSON `null`,
/// so `O = ()` or `O = Option<T>` suit bodiless answers.
pub struct JsonEndpoint<I, O> {
    method: Method,
    path: Arc<PathFn<I>>,
    _output: PhantomData<fn() -> O>,
}

impl<I, O> JsonEndpoint<I, O> {
    pub fn new(method: Method, path: impl Fn(&I) -> String + Send + Sync + 'static) -> Self {
        Self {
            method,
            path: Arc::new(path),
            _output: PhantomData,
        }
    }
}

impl<I, O> Clone for JsonEndpoint<I, O> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            path: Arc::clone(&self.path),
            _output: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for JsonEndpoint<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonEndpoint").field("method", &self.method).finish_non_exhaustive()
    }
}

impl<I, O> Endpoint for JsonEndpoint<I, O>
where
    I: Serialize + Send + Sync,
    O: DeserializeOwned,
{
    type Input = I;
    type Output = O;

    fn build_request(&self, input: &I) -> Result<Request, BoxError> {
        let mut builder = Request::builder(self.method, (self.path)(input)).header("Accept", "application/json");
        if self.method.requires_body() {
            builder = builder.body(Body::json(input)?);
        }
        Ok(builder.build()?)
    }

    fn parse(&self, response: Response) -> Result<O, BoxError> {
        let body: &[u8] = if response.body().is_empty() { b"null" } else { response.body() };
        Ok(serde_json::from_slice(body)?)
    }
}
