//! Handler trait and registration adapters
//!
//! A handler is the capability stored in the registry under one function
//! name. [`Handler::call`] is the single async seam of the router: plain
//! (blocking) handlers are wrapped at registration, so by the time the
//! router awaits the outcome an immediate failure is indistinguishable from
//! a deferred rejection.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::fault::Rejection;

/// What one invocation produces
///
/// `Ok(None)` means the handler ran without producing a value; the router
/// reports it as a `null` payload, same as `Ok(Some(Value::Null))`.
pub type CallOutcome = std::result::Result<Option<Value>, Rejection>;

/// A callable registered under a function name
#[async_trait]
pub trait Handler: Send + Sync {
    /// Invoke with the caller-supplied payload
    async fn call(&self, payload: Value) -> CallOutcome;
}

struct AsyncFnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for AsyncFnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    async fn call(&self, payload: Value) -> CallOutcome {
        (self.f)(payload).await
    }
}

struct SyncFnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for SyncFnHandler<F>
where
    F: Fn(Value) -> CallOutcome + Send + Sync,
{
    async fn call(&self, payload: Value) -> CallOutcome {
        // runs inside the boxed future, so an Err here is already a
        // deferred rejection from the router's point of view
        (self.f)(payload)
    }
}

/// Wrap an async function as a shared handler
pub(crate) fn from_async_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallOutcome> + Send + 'static,
{
    Arc::new(AsyncFnHandler { f })
}

/// Wrap a blocking function as a shared handler
pub(crate) fn from_sync_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Value) -> CallOutcome + Send + Sync + 'static,
{
    Arc::new(SyncFnHandler { f })
}
