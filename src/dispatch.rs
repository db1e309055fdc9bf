//! Call router built on the namespace registry
//!
//! `CallRouter` ties target parsing, namespace resolution, handler
//! invocation, and failure normalization together. `dispatch` never returns
//! an error: every call, however malformed, produces a `CallResponse`.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InteropError, Result};
use crate::fault::describe;
use crate::handler::{CallOutcome, Handler};
use crate::registry::{Namespace, Registry};
use crate::types::{CallResponse, CallTarget, PROTOCOL_VERSION};

/// Process-wide routing toggles
///
/// Set once before traffic starts and read on every call. Logging never
/// alters the response a caller receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Log handler failures before responding with 500. Defaults to false.
    pub log_call_errors: bool,

    /// Log resolution failures before responding with 400/404. Defaults to
    /// true.
    pub log_interop_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_call_errors: false,
            log_interop_errors: true,
        }
    }
}

/// Routes call targets to registered handlers
///
/// Owns the namespace registry and settings. Construct one at startup, share
/// it behind an `Arc`, and feed it targets decoded by a host adapter.
pub struct CallRouter {
    registry: Registry,
    settings: Settings,
}

impl CallRouter {
    /// Create a router with default settings
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a router with explicit settings
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            registry: Registry::new(),
            settings,
        }
    }

    /// Active settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The namespace registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register an async function in the default namespace
    pub fn register<F, Fut>(&self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallOutcome> + Send + 'static,
    {
        self.registry.default_namespace().register(name, f)
    }

    /// Register a blocking function in the default namespace
    pub fn register_sync<F>(&self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(Value) -> CallOutcome + Send + Sync + 'static,
    {
        self.registry.default_namespace().register_sync(name, f)
    }

    /// Create a named namespace with a fixed version
    pub fn create_namespace(
        &self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Arc<Namespace>> {
        self.registry.create_namespace(name, version)
    }

    /// Dispatch a raw target string with the given payload
    ///
    /// Successful calls produce 200 json responses; handler failures produce
    /// 500 json responses carrying the normalized fault; anything that fails
    /// before a handler runs produces a 400/404 text response carrying the
    /// qualified function name.
    pub async fn dispatch(&self, raw_target: &str, payload: Value) -> CallResponse {
        match CallTarget::parse(raw_target) {
            Some(target) => self.dispatch_target(&target, payload).await,
            None => {
                let error = InteropError::MalformedTarget {
                    raw: raw_target.to_string(),
                };
                // no function name exists before parsing succeeds
                self.resolution_failure(error, String::new())
            }
        }
    }

    /// Dispatch an already-parsed target with the given payload
    pub async fn dispatch_target(&self, target: &CallTarget, payload: Value) -> CallResponse {
        let handler = match self.resolve(target) {
            Ok(handler) => handler,
            Err(error) => return self.resolution_failure(error, target.qualified_name()),
        };

        match handler.call(payload).await {
            Ok(value) => CallResponse::success(value.unwrap_or(Value::Null)),
            Err(rejection) => {
                if self.settings.log_call_errors {
                    tracing::error!(
                        function = %target.qualified_name(),
                        rejection = ?rejection,
                        "Interop call failed"
                    );
                }
                CallResponse::handler_failure(describe(&rejection))
            }
        }
    }

    /// Resolve a target down to its handler, completing all registry access
    /// before invocation so no lock is held across an await
    fn resolve(&self, target: &CallTarget) -> Result<Arc<dyn Handler>> {
        if target.protocol_version != PROTOCOL_VERSION {
            return Err(InteropError::ProtocolMismatch {
                caller: target.protocol_version.clone(),
                host: PROTOCOL_VERSION.to_string(),
            });
        }

        let namespace = match &target.namespace {
            None => Arc::clone(self.registry.default_namespace()),
            Some(ns_ref) => {
                let namespace = self.registry.find_namespace(&ns_ref.name)?.ok_or_else(|| {
                    InteropError::UnknownNamespace {
                        name: ns_ref.name.clone(),
                        known: self.registry.namespace_names().unwrap_or_default(),
                    }
                })?;
                if namespace.version() != ns_ref.version {
                    return Err(InteropError::NamespaceVersionMismatch {
                        name: ns_ref.name.clone(),
                        requested: ns_ref.version.clone(),
                        registered: namespace.version().to_string(),
                    });
                }
                namespace
            }
        };

        namespace.find(&target.function)?.ok_or_else(|| {
            let scope = match &target.namespace {
                Some(ns_ref) => format!("namespace '{}'", ns_ref.name),
                None => "the default namespace".to_string(),
            };
            InteropError::UnknownFunction {
                function: target.function.clone(),
                scope,
                known: namespace.names().unwrap_or_default(),
            }
        })
    }

    fn resolution_failure(&self, error: InteropError, qualified_name: String) -> CallResponse {
        if self.settings.log_interop_errors {
            tracing::error!(error = %error, "Unable to route interop call");
        }
        CallResponse::resolution_failure(error.status(), qualified_name)
    }
}

impl Default for CallRouter {
    fn default() -> Self {
        Self::new()
    }
}
