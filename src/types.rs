//! Core call target and response types for callport
//!
//! All wire-facing types use camelCase JSON serialization so responses can be
//! consumed by non-Rust callers without renaming.

use serde::{Deserialize, Serialize};

/// Protocol version compiled into this build of the bridge
///
/// The calling side embeds the same literal in every target it produces.
/// The router compares by exact string equality; there is no semver logic.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scheme prefix that marks a request as an interop call
///
/// Requests without this prefix are not intercepted and fall through to the
/// host environment untouched.
pub const TARGET_PREFIX: &str = "callport://";

/// Namespace qualifier inside a call target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRef {
    /// Registered namespace name; may itself contain `/` separators
    pub name: String,

    /// Namespace version the caller was built against
    pub version: String,
}

/// A parsed call target identifying one registered function
///
/// Targets follow the convention:
/// `callport://<function>?v=<version>` for the default namespace, or
/// `callport://<namespace>/<function>?v=<version>&nsv=<namespace-version>`
/// for an installed namespace. The function name is always the last path
/// segment; everything before it is the namespace name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTarget {
    /// Protocol version the caller was built against
    pub protocol_version: String,

    /// Namespace qualifier; `None` targets the default namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceRef>,

    /// Function name within the namespace
    pub function: String,
}

impl CallTarget {
    /// Parse a raw target string
    ///
    /// Returns `None` for anything that does not match the grammar: a missing
    /// prefix, a missing or empty path, a missing `v` parameter, an `nsv`
    /// parameter without a namespace (or the reverse), or an unknown query
    /// key. Never panics; the router turns `None` into a 400 response.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(TARGET_PREFIX)?;
        let (path, query) = rest.split_once('?')?;

        let (namespace_name, function) = match path.rsplit_once('/') {
            Some((namespace, function)) => (Some(namespace), function),
            None => (None, path),
        };
        if function.is_empty() || namespace_name.is_some_and(str::is_empty) {
            return None;
        }

        let mut protocol_version = None;
        let mut namespace_version = None;
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=')?;
            match key {
                "v" => protocol_version = Some(value.to_string()),
                "nsv" => namespace_version = Some(value.to_string()),
                _ => return None,
            }
        }

        let namespace = match (namespace_name, namespace_version) {
            (Some(name), Some(version)) => Some(NamespaceRef {
                name: name.to_string(),
                version,
            }),
            (None, None) => None,
            _ => return None,
        };

        Some(Self {
            protocol_version: protocol_version?,
            namespace,
            function: function.to_string(),
        })
    }

    /// Qualified function name used in logs and resolution-failure payloads
    ///
    /// `"namespace/function"` for namespaced targets, bare `"function"` for
    /// the default namespace.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns.name, self.function),
            None => self.function.clone(),
        }
    }
}

/// Payload kind carried alongside every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Json,
    Text,
}

/// Response body: JSON for completed calls and handler failures, plain text
/// (the qualified function name) for resolution failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentKind", content = "payload", rename_all = "camelCase")]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Kind tag for this body
    pub fn content_kind(&self) -> ContentKind {
        match self {
            ResponseBody::Json(_) => ContentKind::Json,
            ResponseBody::Text(_) => ContentKind::Text,
        }
    }

    /// JSON payload, if this is a json body
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Text payload, if this is a text body
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }
}

/// Response descriptor produced for every dispatched call
///
/// Serializes as `{"status": …, "contentKind": "json"|"text", "payload": …}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    /// HTTP-shaped status code: 200, 400, 404, or 500
    pub status: u16,

    /// Response payload with its kind tag
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl CallResponse {
    /// 200 response carrying the handler's result value
    pub fn success(payload: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Json(payload),
        }
    }

    /// 500 response carrying a normalized failure descriptor
    pub fn handler_failure(described: serde_json::Value) -> Self {
        Self {
            status: 500,
            body: ResponseBody::Json(described),
        }
    }

    /// 400/404 response carrying the qualified function name as text
    pub fn resolution_failure(status: u16, qualified_name: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(qualified_name.into()),
        }
    }

    /// Kind tag for the body
    pub fn content_kind(&self) -> ContentKind {
        self.body.content_kind()
    }
}
