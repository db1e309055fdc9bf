//! Host boundary adapters
//!
//! An adapter owns the two conversions at the edge of the bridge: `decode`
//! recognizes an intercepted host request and extracts the raw target plus
//! payload, and `encode` renders the router's response in the host's shape.
//! [`serve`] ties decode, dispatch, and encode together. [`WireAdapter`] is
//! the in-repo HTTP-shaped reference adapter, also used as the test double.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::CallRouter;
use crate::error::Result;
use crate::types::{CallResponse, ContentKind, ResponseBody, PROTOCOL_VERSION, TARGET_PREFIX};

/// Converts host requests into router inputs and back
pub trait HostAdapter {
    /// Host request shape
    type Request;

    /// Host response shape
    type Response;

    /// Extract the raw target string and JSON payload from a request
    ///
    /// Returns `None` for requests the bridge does not intercept; those fall
    /// through to the host environment untouched.
    fn decode(&self, request: &Self::Request) -> Option<(String, Value)>;

    /// Render a routed response in the host's shape
    fn encode(&self, response: CallResponse) -> Result<Self::Response>;
}

/// Decode, dispatch, and encode one request
///
/// Returns `Ok(None)` when the request is not an interop call.
pub async fn serve<A: HostAdapter>(
    adapter: &A,
    router: &CallRouter,
    request: &A::Request,
) -> Result<Option<A::Response>> {
    match adapter.decode(request) {
        Some((target, payload)) => {
            let response = router.dispatch(&target, payload).await;
            adapter.encode(response).map(Some)
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// HTTP-shaped wire types
// ---------------------------------------------------------------------------

/// HTTP-shaped request for hosts without a native request object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRequest {
    /// Full request URL; interop calls start with [`TARGET_PREFIX`]
    pub url: String,

    /// Raw request body, parsed as the JSON payload
    pub body: String,
}

impl WireRequest {
    /// Create a request from a raw URL and body
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Build a well-formed request for a function in the default namespace
    pub fn call(function: &str, payload: &Value) -> Self {
        Self {
            url: format!("{}{}?v={}", TARGET_PREFIX, function, PROTOCOL_VERSION),
            body: payload.to_string(),
        }
    }

    /// Build a well-formed request for a function in a named namespace
    pub fn namespaced(
        namespace: &str,
        namespace_version: &str,
        function: &str,
        payload: &Value,
    ) -> Self {
        Self {
            url: format!(
                "{}{}/{}?v={}&nsv={}",
                TARGET_PREFIX, namespace, function, PROTOCOL_VERSION, namespace_version
            ),
            body: payload.to_string(),
        }
    }
}

/// HTTP-shaped response carrying the routed result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    /// Status code from the routed [`CallResponse`]
    pub status: u16,

    /// `application/json` for json bodies, `text/plain` for text bodies
    pub content_type: String,

    /// Serialized payload
    pub body: String,
}

/// Reference adapter speaking the HTTP-shaped wire types
#[derive(Debug, Clone, Copy, Default)]
pub struct WireAdapter;

impl HostAdapter for WireAdapter {
    type Request = WireRequest;
    type Response = WireResponse;

    fn decode(&self, request: &WireRequest) -> Option<(String, Value)> {
        if !request.url.starts_with(TARGET_PREFIX) {
            return None;
        }
        // an empty or unparsable body is passed through as null
        let payload = serde_json::from_str(&request.body).unwrap_or(Value::Null);
        Some((request.url.clone(), payload))
    }

    fn encode(&self, response: CallResponse) -> Result<WireResponse> {
        let content_type = match response.content_kind() {
            ContentKind::Json => "application/json",
            ContentKind::Text => "text/plain",
        };
        let body = match response.body {
            ResponseBody::Json(value) => serde_json::to_string(&value)?,
            ResponseBody::Text(text) => text,
        };
        Ok(WireResponse {
            status: response.status,
            content_type: content_type.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallTarget;
    use serde_json::json;

    #[test]
    fn test_decode_ignores_foreign_url() {
        let request = WireRequest::new("https://example.com/api", "{}");
        assert!(WireAdapter.decode(&request).is_none());
    }

    #[test]
    fn test_decode_parses_json_body() {
        let request = WireRequest::call("ping", &json!({"n": 3}));
        let (target, payload) = WireAdapter.decode(&request).unwrap();

        assert!(target.starts_with(TARGET_PREFIX));
        assert_eq!(payload, json!({"n": 3}));
    }

    #[test]
    fn test_decode_malformed_body_becomes_null() {
        let request = WireRequest::new(format!("{}ping?v=1", TARGET_PREFIX), "not json");
        let (_, payload) = WireAdapter.decode(&request).unwrap();
        assert_eq!(payload, Value::Null);

        let empty = WireRequest::new(format!("{}ping?v=1", TARGET_PREFIX), "");
        let (_, payload) = WireAdapter.decode(&empty).unwrap();
        assert_eq!(payload, Value::Null);
    }

    #[test]
    fn test_request_builders_produce_parseable_targets() {
        let plain = WireRequest::call("ping", &json!(null));
        let target = CallTarget::parse(&plain.url).unwrap();
        assert_eq!(target.protocol_version, PROTOCOL_VERSION);
        assert_eq!(target.function, "ping");

        let scoped = WireRequest::namespaced("acme/widgets", "1.4.0", "create", &json!({}));
        let target = CallTarget::parse(&scoped.url).unwrap();
        assert_eq!(target.namespace.unwrap().name, "acme/widgets");
        assert_eq!(target.function, "create");
    }

    #[test]
    fn test_encode_json_response() {
        let encoded = WireAdapter
            .encode(CallResponse::success(json!({"ok": true})))
            .unwrap();

        assert_eq!(encoded.status, 200);
        assert_eq!(encoded.content_type, "application/json");
        assert_eq!(encoded.body, "{\"ok\":true}");
    }

    #[test]
    fn test_encode_text_response() {
        let encoded = WireAdapter
            .encode(CallResponse::resolution_failure(404, "missing/fn"))
            .unwrap();

        assert_eq!(encoded.status, 404);
        assert_eq!(encoded.content_type, "text/plain");
        assert_eq!(encoded.body, "missing/fn");
    }

    #[tokio::test]
    async fn test_serve_round_trip() {
        let router = CallRouter::new();
        router
            .register_sync("ping", |_| Ok(Some(json!("pong"))))
            .unwrap();

        let request = WireRequest::call("ping", &json!(null));
        let response = serve(&WireAdapter, &router, &request).await.unwrap().unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "\"pong\"");
    }

    #[tokio::test]
    async fn test_serve_falls_through_on_foreign_request() {
        let router = CallRouter::new();
        let request = WireRequest::new("https://example.com/health", "");

        let routed = serve(&WireAdapter, &router, &request).await.unwrap();
        assert!(routed.is_none());
    }
}
