//! JSON-RPC 2.0 message shapes
//!
//! These are the data-only contracts exchanged with a remote peer. The
//! correlation engine produces [`JsonRpcRequest`] values (calls and
//! notifications) and consumes [`JsonRpcResponse`] values that the host has
//! already decoded from the wire.
//!
//! # Calls and Notifications
//!
//! JSON-RPC 2.0 uses a single message shape for both kinds of outgoing call.
//! The presence of an `id` is what makes it a request that expects a reply;
//! without one it is a notification and the remote never answers.
//!
//! # Field Presence
//!
//! Optional members are omitted from the encoded message rather than written
//! as `null`. On the inbound side a response carrying `"result": null` has a
//! result (JSON `null`), which is not the same thing as a response with no
//! `result` member at all.

use crate::error::JsonRpcErrorData;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Protocol version tag carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 identifier
///
/// An identifier is a string, an integer or null. Identifiers allocated by the
/// engine are always non-negative integers; strings and null only appear in
/// responses built by a peer.
///
/// This enum uses `#[serde(untagged)]` so it encodes as the bare value.
///
/// # Examples
///
/// ```rust
/// use jremote_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Integer identifier
    Number(i64),
    /// Null identifier, sent by peers that could not read the request id
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// Returns true for JSON-RPC "structured values": objects and arrays
///
/// Only structured values are legal as `params`.
pub fn is_structured(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// Outgoing call message
///
/// A request when `id` is present, a notification when it is absent.
///
/// # Examples
///
/// ```rust
/// use jremote_core::{Id, JsonRpcRequest};
/// use serde_json::json;
///
/// let req = JsonRpcRequest::new("subtract", Some(json!([42, 23])), Id::Number(1));
/// assert!(!req.is_notification());
///
/// let note = JsonRpcRequest::notification("heartbeat", None);
/// assert_eq!(serde_json::to_string(&note).unwrap(), r#"{"jsonrpc":"2.0","method":"heartbeat"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Name of the remote procedure
    pub method: String,
    /// Correlation identifier; `None` for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Structured parameters, omitted entirely when not supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a request that expects a response correlated by `id`
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            id: Some(id),
            params,
        }
    }

    /// Create a notification (no `id`, no response)
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            id: None,
            params,
        }
    }

    /// Whether this message carries no identifier
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Inbound response message
///
/// A well-formed response has exactly one of `result` or `error`. The type
/// does not enforce that, because a peer may send neither; the engine reports
/// such responses as malformed when it resolves the matching call.
///
/// # Examples
///
/// ```rust
/// use jremote_core::{Id, JsonRpcResponse};
///
/// let resp: JsonRpcResponse =
///     serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"result":null}"#).unwrap();
/// assert_eq!(resp.id, Id::Number(7));
/// assert!(resp.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Identifier of the request being answered
    pub id: Id,
    /// Result value on success; `Some(Value::Null)` when the peer sent `null`
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    /// Error object on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorData>,
}

// Only called when the member exists, so an explicit `null` stays `Some`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(result: Value, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(error: JsonRpcErrorData, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// True when a `result` member is present
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// True when an `error` member is present
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
