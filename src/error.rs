//! Error types for callport

use thiserror::Error;

/// Errors raised while resolving or routing interop calls
#[derive(Debug, Error)]
pub enum InteropError {
    /// Call target string did not match the expected grammar
    #[error("Cannot parse call target '{raw}': the calling side and the host bridge may be out of sync")]
    MalformedTarget {
        raw: String,
    },

    /// Caller and host were built against different protocol versions
    #[error("Protocol version conflict: caller side is {caller}, host side is {host}; both sides must be updated together")]
    ProtocolMismatch {
        caller: String,
        host: String,
    },

    /// Named namespace was never created
    #[error("Namespace '{name}' is not registered; known namespaces: {known:?}")]
    UnknownNamespace {
        name: String,
        known: Vec<String>,
    },

    /// Caller expects a different version of the namespace
    #[error("Version conflict for namespace '{name}': caller expects {requested}, but it is registered with version {registered}")]
    NamespaceVersionMismatch {
        name: String,
        requested: String,
        registered: String,
    },

    /// Function name is not present in the resolved namespace
    #[error("Function '{function}' is not registered in {scope}; registered functions: {known:?}")]
    UnknownFunction {
        function: String,
        scope: String,
        known: Vec<String>,
    },

    /// Attempt to create a namespace under the reserved empty name
    #[error("Namespace name cannot be empty; the empty name is reserved for the default namespace")]
    ReservedNamespace,

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invariant breakage inside the router itself
    #[error("Interop call failed internally: {0}")]
    Internal(String),
}

impl InteropError {
    /// Response status the router reports for this error.
    ///
    /// Unresolvable names map to 404; everything else a caller can hit
    /// before a handler runs maps to 400.
    pub fn status(&self) -> u16 {
        match self {
            InteropError::UnknownNamespace { .. } | InteropError::UnknownFunction { .. } => 404,
            InteropError::MalformedTarget { .. }
            | InteropError::ProtocolMismatch { .. }
            | InteropError::NamespaceVersionMismatch { .. }
            | InteropError::ReservedNamespace
            | InteropError::Serialization(_)
            | InteropError::Internal(_) => 400,
        }
    }
}

/// Result type alias for interop operations
pub type Result<T> = std::result::Result<T, InteropError>;
