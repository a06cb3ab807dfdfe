//! Core JSON-RPC 2.0 message shapes and error taxonomy for jremote
//!
//! This crate holds everything the correlation engine and its hosts agree on:
//!
//! - **Types**: requests, notifications and responses with bit-exact field names
//! - **Errors**: the crate-wide `Error`, and `RemoteError` which classifies
//!   Error Objects received from the peer
//! - **Observability**: optional `tracing` + OpenTelemetry setup for hosts
//!
//! The crate does not read or write JSON text. Hosts decode inbound messages
//! into [`JsonRpcResponse`] and encode outbound [`JsonRpcRequest`] values
//! with whatever serde format their transport uses.
//!
//! # Example
//!
//! ```rust
//! use jremote_core::{Error, Id, JsonRpcErrorData, JsonRpcResponse, RemoteError};
//!
//! let response = JsonRpcResponse::error(JsonRpcErrorData::internal_error("db down"), Id::Number(3));
//! let error: Error = RemoteError::from(response.error.unwrap()).into();
//! assert!(error.to_string().contains("db down"));
//! ```

pub mod error;
pub mod observability;
pub mod types;

pub use error::{Error, JsonRpcErrorData, RemoteError, RemoteErrorKind, Result, ServerErrorCode};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{is_structured, Id, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
