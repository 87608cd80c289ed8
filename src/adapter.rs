//! Handler adapter
//!
//! Turns a typed async function into a [`HandlerUnit`]: decode the input, call the
//! function, write the envelope. The unit is stateless, so one instance can serve
//! any number of concurrent requests.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Body, Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::decode::{decode_body, query_parameters, QueryParams};
use crate::envelope::{write_error, write_response};
use crate::error::BoxError;
use crate::logger;

/// Future returned by a [`HandlerUnit`]
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response<Full<Bytes>>> + Send>>;

type BoxedHandler<B> = dyn Fn(Request<B>) -> HandlerFuture + Send + Sync;

/// Transport-level request handler produced by [`handle_get`], [`handle_post`]
/// and [`handle_put`]
///
/// Cloning is cheap. The unit can be called directly, stored in a route table, or
/// passed to hyper as a service.
pub struct HandlerUnit<B = Incoming> {
    inner: Arc<BoxedHandler<B>>,
}

impl<B> HandlerUnit<B> {
    fn new<F>(f: F) -> Self
    where
        F: Fn(Request<B>) -> HandlerFuture + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Handle one request
    pub fn call(&self, req: Request<B>) -> HandlerFuture {
        (self.inner)(req)
    }
}

impl<B> Clone for HandlerUnit<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> std::fmt::Debug for HandlerUnit<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerUnit").finish_non_exhaustive()
    }
}

impl<B> Service<Request<B>> for HandlerUnit<B> {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Infallible>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let response = (self.inner)(req);
        Box::pin(async move { Ok(response.await) })
    }
}

/// Adapt a read-style handler: the input is the request's query parameters
pub fn handle_get<B, F, Fut, T, E>(f: F) -> HandlerUnit<B>
where
    B: Send + 'static,
    F: Fn(QueryParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Display + Send + 'static,
{
    HandlerUnit::new(move |req: Request<B>| -> HandlerFuture {
        let call = f(query_parameters(req.uri()));
        Box::pin(async move { write_response(call.await) })
    })
}

/// Adapt a write-style handler: the input is the JSON request body
pub fn handle_post<B, F, Fut, I, T, E>(f: F) -> HandlerUnit<B>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    T: Serialize + Send + 'static,
    E: Display + Send + 'static,
{
    handle_json_body(f)
}

/// Adapt a write-style handler: the input is the JSON request body
pub fn handle_put<B, F, Fut, I, T, E>(f: F) -> HandlerUnit<B>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    T: Serialize + Send + 'static,
    E: Display + Send + 'static,
{
    handle_json_body(f)
}

/// Decode the body, short-circuit with an error envelope on failure, otherwise
/// run the handler and write its result
fn handle_json_body<B, F, Fut, I, T, E>(f: F) -> HandlerUnit<B>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    T: Serialize + Send + 'static,
    E: Display + Send + 'static,
{
    let f = Arc::new(f);
    HandlerUnit::new(move |req: Request<B>| -> HandlerFuture {
        let f = Arc::clone(&f);
        Box::pin(async move {
            let request: I = match decode_body(req.into_body()).await {
                Ok(request) => request,
                Err(err) => {
                    logger::log_decode_failure(&err);
                    return write_error(&err);
                }
            };

            write_response(f(request).await)
        })
    })
}
