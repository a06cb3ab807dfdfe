//! Error types for jremote
//!
//! Two layers live here:
//!
//! - **Error**: every failure the engine can report, whether raised locally
//!   (reserved method name, malformed response, transport failure) or
//!   received from the remote peer.
//! - **RemoteError**: an Error Object received from the peer, classified by
//!   its numeric code into a closed set of kinds.
//!
//! # Classification
//!
//! JSON-RPC 2.0 reserves these codes:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32099 to -32000`: Server error (implementation-defined)
//!
//! Any other code is a generic remote error that keeps its code.
//!
//! # Examples
//!
//! ```rust
//! use jremote_core::{RemoteError, RemoteErrorKind};
//!
//! let err = RemoteError::classify(-32601, "no such method", None);
//! assert_eq!(err.kind(), &RemoteErrorKind::MethodNotFound);
//! assert_eq!(err.code(), -32601);
//! ```

use crate::types::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Invalid JSON was received by the peer
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid Request object
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist / is not available
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameter(s)
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error
pub const INTERNAL_ERROR: i32 = -32603;
/// Lowest code of the implementation-defined server error band, inclusive
pub const SERVER_ERROR_MIN: i32 = -32099;
/// Highest code of the implementation-defined server error band, inclusive
pub const SERVER_ERROR_MAX: i32 = -32000;

/// Result type for jremote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure jremote can report
///
/// # Error Categories
///
/// - **Local validation**: ReservedMethodName, InvalidParams,
///   ServerCodeOutOfRange, IdSpaceExhausted. Raised at the call site before
///   anything is transmitted.
/// - **Protocol violations**: UnexpectedResponseId (raised by dispatch),
///   MalformedResponse (delivered through the per-call future).
/// - **Remote errors**: Remote, delivered through the per-call future.
/// - **Transport failures**: Transmit, produced by transport implementations.
///
/// The type is `Clone` so a single failure can be handed to a broadcast
/// channel or to every pending call of a lost connection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Error Object returned by the peer, already classified
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Method name uses the reserved `rpc.` prefix
    #[error("The method name prefix 'rpc.' is reserved and may not be used: {0}")]
    ReservedMethodName(String),

    /// Params are not a structured value (object or array)
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A server error was constructed with a code outside the reserved band
    #[error("Server error code {0} is outside the reserved range [-32099, -32000]")]
    ServerCodeOutOfRange(i32),

    /// A response arrived for an identifier with no pending call
    ///
    /// Signals a duplicate response, a response for an unknown identifier,
    /// or a transport bug.
    #[error("Unexpected response ID '{0}'")]
    UnexpectedResponseId(Id),

    /// A matched response carried neither `result` nor `error`
    #[error("Response object has no result or error object")]
    MalformedResponse,

    /// The transport failed to transmit a message
    #[error("Transmit error: {0}")]
    Transmit(String),

    /// Conversion between Rust types and JSON failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The engine was dropped while the call was still pending
    #[error("Pending call abandoned before a response arrived")]
    Abandoned,

    /// The identifier counter no longer fits a JSON-RPC integer id
    #[error("Request identifier space exhausted")]
    IdSpaceExhausted,

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures raised synchronously at the call site
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            Error::ReservedMethodName(_)
                | Error::InvalidParams(_)
                | Error::ServerCodeOutOfRange(_)
                | Error::IdSpaceExhausted
        )
    }

    /// True for responses that break the correlation protocol
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::UnexpectedResponseId(_) | Error::MalformedResponse)
    }

    /// The classified remote error, if this is one
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }
}

/// JSON-RPC 2.0 Error Object as it appears on the wire
///
/// # Examples
///
/// ```rust
/// use jremote_core::JsonRpcErrorData;
/// use serde_json::json;
///
/// let error = JsonRpcErrorData::method_not_found("calculate");
/// assert_eq!(error.code, -32601);
///
/// let custom = JsonRpcErrorData::with_data(
///     1001,
///     "Insufficient funds",
///     json!({"balance": 50, "required": 100})
/// );
/// assert_eq!(custom.to_string(), "[1001] Insufficient funds");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code
    pub code: i32,

    /// Short human-readable description
    pub message: String,

    /// Optional additional detail, any JSON value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Create an error object with code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error object carrying additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error (-32700)
    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    /// Invalid request error (-32600)
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, msg)
    }

    /// Method not found error (-32601)
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method.into()))
    }

    /// Invalid params error (-32602)
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, msg)
    }

    /// Internal error (-32603)
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, msg)
    }
}

impl std::fmt::Display for JsonRpcErrorData {
    /// Formats as "[code] message", e.g. "[-32601] Method not found: foo"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// A code inside the implementation-defined server error band
///
/// The only way to obtain one is [`ServerErrorCode::new`], so a
/// [`RemoteErrorKind::Server`] can never hold a code outside the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerErrorCode(i32);

impl ServerErrorCode {
    /// Validate a server error code
    ///
    /// # Errors
    ///
    /// `Error::ServerCodeOutOfRange` when `code` is not in `[-32099, -32000]`.
    pub fn new(code: i32) -> Result<Self> {
        if Self::is_valid(code) {
            Ok(Self(code))
        } else {
            Err(Error::ServerCodeOutOfRange(code))
        }
    }

    /// Whether `code` lies in the server error band
    pub fn is_valid(code: i32) -> bool {
        (SERVER_ERROR_MIN..=SERVER_ERROR_MAX).contains(&code)
    }

    /// The numeric code
    pub fn get(self) -> i32 {
        self.0
    }
}

/// Classified kind of a remote error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// -32700
    Parse,
    /// -32600
    InvalidRequest,
    /// -32601
    MethodNotFound,
    /// -32602
    InvalidParams,
    /// -32603
    Internal,
    /// -32099..=-32000
    Server(ServerErrorCode),
    /// Any other code, kept verbatim
    Other(i32),
}

impl RemoteErrorKind {
    /// Map a numeric code to its kind
    ///
    /// Exact standard codes win, then the server band, then `Other`.
    pub fn classify(code: i32) -> Self {
        match code {
            PARSE_ERROR => RemoteErrorKind::Parse,
            INVALID_REQUEST => RemoteErrorKind::InvalidRequest,
            METHOD_NOT_FOUND => RemoteErrorKind::MethodNotFound,
            INVALID_PARAMS => RemoteErrorKind::InvalidParams,
            INTERNAL_ERROR => RemoteErrorKind::Internal,
            _ => match ServerErrorCode::new(code) {
                Ok(server) => RemoteErrorKind::Server(server),
                Err(_) => RemoteErrorKind::Other(code),
            },
        }
    }

    /// The numeric code this kind stands for
    pub fn code(self) -> i32 {
        match self {
            RemoteErrorKind::Parse => PARSE_ERROR,
            RemoteErrorKind::InvalidRequest => INVALID_REQUEST,
            RemoteErrorKind::MethodNotFound => METHOD_NOT_FOUND,
            RemoteErrorKind::InvalidParams => INVALID_PARAMS,
            RemoteErrorKind::Internal => INTERNAL_ERROR,
            RemoteErrorKind::Server(code) => code.get(),
            RemoteErrorKind::Other(code) => code,
        }
    }
}

/// Error Object received from the peer, with its classified kind
///
/// Message and data are carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    kind: RemoteErrorKind,
    message: String,
    data: Option<Value>,
}

impl RemoteError {
    /// Classify an error object by its code
    pub fn classify(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            kind: RemoteErrorKind::classify(code),
            message: message.into(),
            data,
        }
    }

    /// Build a server error directly
    ///
    /// # Errors
    ///
    /// `Error::ServerCodeOutOfRange` when `code` is outside `[-32099, -32000]`.
    ///
    /// ```rust
    /// use jremote_core::{Error, RemoteError};
    ///
    /// assert!(RemoteError::server(-32050, "busy", None).is_ok());
    /// assert_eq!(
    ///     RemoteError::server(-31000, "busy", None).unwrap_err(),
    ///     Error::ServerCodeOutOfRange(-31000)
    /// );
    /// ```
    pub fn server(code: i32, message: impl Into<String>, data: Option<Value>) -> Result<Self> {
        Ok(Self {
            kind: RemoteErrorKind::Server(ServerErrorCode::new(code)?),
            message: message.into(),
            data,
        })
    }

    /// Classified kind
    pub fn kind(&self) -> &RemoteErrorKind {
        &self.kind
    }

    /// Numeric code as received
    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Message as received
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Data payload as received
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Convert back to wire form
    pub fn into_error_data(self) -> JsonRpcErrorData {
        JsonRpcErrorData {
            code: self.kind.code(),
            message: self.message,
            data: self.data,
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for RemoteError {}

impl From<JsonRpcErrorData> for RemoteError {
    fn from(e: JsonRpcErrorData) -> Self {
        RemoteError::classify(e.code, e.message, e.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_standard_codes_classify() {
        let cases = vec![
            (PARSE_ERROR, RemoteErrorKind::Parse),
            (INVALID_REQUEST, RemoteErrorKind::InvalidRequest),
            (METHOD_NOT_FOUND, RemoteErrorKind::MethodNotFound),
            (INVALID_PARAMS, RemoteErrorKind::InvalidParams),
            (INTERNAL_ERROR, RemoteErrorKind::Internal),
        ];

        for (code, kind) in cases {
            let err = RemoteError::classify(code, "msg", None);
            assert_eq!(err.kind(), &kind);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_method_not_found_keeps_message_and_data() {
        let err = RemoteError::classify(-32601, "no such method", Some(json!({"name": "foo"})));

        assert_eq!(err.kind(), &RemoteErrorKind::MethodNotFound);
        assert_eq!(err.message(), "no such method");
        assert_eq!(err.data(), Some(&json!({"name": "foo"})));
    }

    #[test]
    fn test_server_band_edges() {
        for code in [SERVER_ERROR_MIN, -32050, SERVER_ERROR_MAX] {
            match RemoteError::classify(code, "server", None).kind() {
                RemoteErrorKind::Server(c) => assert_eq!(c.get(), code),
                other => panic!("Expected Server kind, got {:?}", other),
            }
        }

        assert_eq!(
            RemoteErrorKind::classify(SERVER_ERROR_MIN - 1),
            RemoteErrorKind::Other(-32100)
        );
        assert_eq!(
            RemoteErrorKind::classify(SERVER_ERROR_MAX + 1),
            RemoteErrorKind::Other(-31999)
        );
    }

    #[test]
    fn test_server_constructor_range() {
        let ok = RemoteError::server(-32050, "busy", None).unwrap();
        assert_eq!(ok.code(), -32050);

        let err = RemoteError::server(-31000, "busy", None).unwrap_err();
        assert_eq!(err, Error::ServerCodeOutOfRange(-31000));
        assert!(err.is_local_validation());
        assert!(err.to_string().contains("-31000"));
    }

    #[test]
    fn test_other_code_kept() {
        let err = RemoteError::classify(1001, "Insufficient funds", None);
        assert_eq!(err.kind(), &RemoteErrorKind::Other(1001));
        assert_eq!(err.code(), 1001);
    }

    #[test]
    fn test_from_error_data() {
        let data = JsonRpcErrorData::with_data(-32602, "Invalid params", json!(["a"]));
        let err: RemoteError = data.clone().into();

        assert_eq!(err.kind(), &RemoteErrorKind::InvalidParams);
        assert_eq!(err.into_error_data(), data);
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::classify(-32603, "boom", None);
        assert_eq!(err.to_string(), "[-32603] boom");

        let wrapped = Error::from(err);
        assert!(wrapped.to_string().contains("boom"));
        assert!(wrapped.as_remote().is_some());
    }

    #[test]
    fn test_error_categories() {
        assert!(Error::ReservedMethodName("rpc.x".into()).is_local_validation());
        assert!(Error::InvalidParams("42".into()).is_local_validation());
        assert!(Error::UnexpectedResponseId(Id::Null).is_protocol_violation());
        assert!(Error::MalformedResponse.is_protocol_violation());
        assert!(!Error::Transmit("down".into()).is_protocol_violation());
        assert!(!Error::Abandoned.is_local_validation());
    }

    #[test]
    fn test_unexpected_id_message_names_id() {
        let err = Error::UnexpectedResponseId(Id::String("x1".into()));
        assert!(err.to_string().contains("x1"));
    }

    #[test]
    fn test_error_data_serialization() {
        let json = r#"{"code":-32601,"message":"Method not found"}"#;
        let error: JsonRpcErrorData = serde_json::from_str(json).unwrap();

        assert_eq!(error.code, -32601);
        assert!(error.data.is_none());
        assert_eq!(serde_json::to_string(&error).unwrap(), json);
    }

    #[test]
    fn test_standard_factories() {
        assert_eq!(JsonRpcErrorData::parse_error().code, PARSE_ERROR);
        assert_eq!(JsonRpcErrorData::invalid_request("x").code, INVALID_REQUEST);
        assert!(JsonRpcErrorData::method_not_found("foo").message.contains("foo"));
        assert_eq!(JsonRpcErrorData::invalid_params("x").code, INVALID_PARAMS);
        assert_eq!(JsonRpcErrorData::internal_error("x").code, INTERNAL_ERROR);
    }

    proptest! {
        #[test]
        fn prop_server_band_accepted(code in SERVER_ERROR_MIN..=SERVER_ERROR_MAX) {
            prop_assert!(ServerErrorCode::new(code).is_ok());
            prop_assert_eq!(RemoteErrorKind::classify(code).code(), code);
        }

        #[test]
        fn prop_outside_band_rejected(code in any::<i32>()) {
            prop_assume!(!ServerErrorCode::is_valid(code));
            prop_assert_eq!(ServerErrorCode::new(code), Err(Error::ServerCodeOutOfRange(code)));
        }

        #[test]
        fn prop_classification_keeps_code(code in any::<i32>(), message in ".*") {
            let err = RemoteError::classify(code, message.clone(), None);
            prop_assert_eq!(err.code(), code);
            prop_assert_eq!(err.message(), message.as_str());
        }
    }
}
