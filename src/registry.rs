//! Versioned namespace registry
//!
//! A namespace is a named collection of handlers with a version fixed at
//! creation. The registry owns the always-present default namespace (the
//! reserved empty name) plus any installed named namespaces. Registration is
//! last-write-wins for both functions and namespaces; nothing is ever
//! removed while the process runs.

use std::future::Future;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{InteropError, Result};
use crate::handler::{self, CallOutcome, Handler};

/// Version string carried by the default namespace
///
/// The router never version-checks the default namespace; this value exists
/// for diagnostics only.
pub const DEFAULT_NAMESPACE_VERSION: &str = "unversioned";

/// A named collection of handlers sharing one version
///
/// Handles are `Arc`-shared between the registry and host setup code, so
/// functions can be registered after the namespace is installed.
pub struct Namespace {
    version: String,
    functions: RwLock<IndexMap<String, Arc<dyn Handler>>>,
}

impl Namespace {
    fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            functions: RwLock::new(IndexMap::new()),
        }
    }

    /// Version fixed when the namespace was created
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Register an async function; replaces any handler already under `name`
    pub fn register<F, Fut>(&self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallOutcome> + Send + 'static,
    {
        self.install(name.into(), handler::from_async_fn(f))
    }

    /// Register a blocking function; an `Err` return becomes the same
    /// deferred rejection an async handler would produce
    pub fn register_sync<F>(&self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(Value) -> CallOutcome + Send + Sync + 'static,
    {
        self.install(name.into(), handler::from_sync_fn(f))
    }

    /// Register a prebuilt handler; replaces any handler already under `name`
    pub fn register_handler(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<()> {
        self.install(name.into(), handler)
    }

    fn install(&self, name: String, handler: Arc<dyn Handler>) -> Result<()> {
        let mut functions = self
            .functions
            .write()
            .map_err(|e| InteropError::Internal(format!("function table lock poisoned: {}", e)))?;
        if functions.insert(name.clone(), handler).is_some() {
            tracing::debug!(function = %name, "Replaced interop handler");
        } else {
            tracing::debug!(function = %name, "Registered interop handler");
        }
        Ok(())
    }

    /// Look up a handler by function name
    pub fn find(&self, name: &str) -> Result<Option<Arc<dyn Handler>>> {
        let functions = self
            .functions
            .read()
            .map_err(|e| InteropError::Internal(format!("function table lock poisoned: {}", e)))?;
        Ok(functions.get(name).cloned())
    }

    /// Registered function names in insertion order, for diagnostics
    pub fn names(&self) -> Result<Vec<String>> {
        let functions = self
            .functions
            .read()
            .map_err(|e| InteropError::Internal(format!("function table lock poisoned: {}", e)))?;
        Ok(functions.keys().cloned().collect())
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Process-wide namespace collection
pub struct Registry {
    default: Arc<Namespace>,
    namespaces: RwLock<IndexMap<String, Arc<Namespace>>>,
}

impl Registry {
    /// Create a registry holding only the default namespace
    pub fn new() -> Self {
        Self {
            default: Arc::new(Namespace::new(DEFAULT_NAMESPACE_VERSION)),
            namespaces: RwLock::new(IndexMap::new()),
        }
    }

    /// The always-present default namespace
    pub fn default_namespace(&self) -> &Arc<Namespace> {
        &self.default
    }

    /// Create a named namespace with a fixed version
    ///
    /// Returns the handle the host keeps for registering functions. Creating
    /// a name that already exists replaces the previous namespace wholesale;
    /// holders of the old handle keep a namespace the router no longer
    /// resolves. The empty name is reserved for the default namespace.
    pub fn create_namespace(
        &self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Arc<Namespace>> {
        let name = name.into();
        if name.is_empty() {
            return Err(InteropError::ReservedNamespace);
        }
        let namespace = Arc::new(Namespace::new(version));
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|e| InteropError::Internal(format!("namespace table lock poisoned: {}", e)))?;
        if namespaces
            .insert(name.clone(), Arc::clone(&namespace))
            .is_some()
        {
            tracing::debug!(namespace = %name, version = %namespace.version, "Replaced interop namespace");
        } else {
            tracing::debug!(namespace = %name, version = %namespace.version, "Created interop namespace");
        }
        Ok(namespace)
    }

    /// Look up an installed namespace by name
    pub fn find_namespace(&self, name: &str) -> Result<Option<Arc<Namespace>>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| InteropError::Internal(format!("namespace table lock poisoned: {}", e)))?;
        Ok(namespaces.get(name).cloned())
    }

    /// Installed namespace names in insertion order, for diagnostics
    pub fn namespace_names(&self) -> Result<Vec<String>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| InteropError::Internal(format!("namespace table lock poisoned: {}", e)))?;
        Ok(namespaces.keys().cloned().collect())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
