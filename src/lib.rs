//! # callport
//!
//! Versioned function registry and call dispatch for host-interop bridges.
//!
//! ## Overview
//!
//! `callport` routes function calls that arrive disguised as network
//! requests. A host adapter extracts a call target from an intercepted
//! request; the router resolves it against a versioned namespace registry and
//! invokes the registered handler without revealing whether it completes
//! synchronously or asynchronously. Outcomes are rendered as response
//! descriptors: a JSON value on success, a recursively normalized error
//! descriptor on handler failure, and a text response naming the function
//! when resolution fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use callport::{serve, CallRouter, Fault, WireAdapter, WireRequest};
//!
//! # async fn example() -> callport::Result<()> {
//! // Create a router and register a function in the default namespace
//! let router = CallRouter::new();
//! router.register_sync("double", |payload| {
//!     let n = payload
//!         .as_i64()
//!         .ok_or_else(|| Fault::new("TypeError", "payload must be a number"))?;
//!     Ok(Some(serde_json::json!(n * 2)))
//! })?;
//!
//! // Route a request intercepted at the host boundary
//! let request = WireRequest::call("double", &serde_json::json!(21));
//! let response = serve(&WireAdapter, &router, &request).await?.unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, "42");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **CallRouter** — resolves targets against the registry, invokes handlers,
//!   never raises
//! - **Registry** / **Namespace** — versioned collections of registered
//!   functions
//! - **Handler** trait — the capability stored under each function name
//! - **HostAdapter** trait — decode/encode pair at the host boundary
//! - **Fault** / **describe** — structured failures and their wire
//!   normalization

pub mod adapter;
pub mod dispatch;
pub mod error;
pub mod fault;
pub mod handler;
pub mod registry;
pub mod types;

// Re-export core types
pub use adapter::{serve, HostAdapter, WireAdapter, WireRequest, WireResponse};
pub use dispatch::{CallRouter, Settings};
pub use error::{InteropError, Result};
pub use fault::{describe, Fault, FaultReport, Rejection, MAX_CAUSE_DEPTH};
pub use handler::{CallOutcome, Handler};
pub use registry::{Namespace, Registry, DEFAULT_NAMESPACE_VERSION};
pub use types::{
    CallResponse, CallTarget, ContentKind, NamespaceRef, ResponseBody, PROTOCOL_VERSION,
    TARGET_PREFIX,
};
