//! Transport-agnostic JSON-RPC 2.0 correlation engine
//!
//! This crate turns method invocations into JSON-RPC request and
//! notification messages, hands them to a host-provided [`Transport`], and
//! correlates the responses the host feeds back with the calls awaiting
//! them. It never opens sockets, encodes bytes or parses JSON text.
//!
//! # Core Features
//!
//! - **Calls**: fresh identifier per call, one future per call resolving exactly once
//! - **Notifications**: fire-and-forget, with the transport's completion signal
//! - **Dispatch**: order-independent response matching, reentrant-safe
//! - **Error taxonomy**: remote errors classified into standard and server codes
//! - **General error channel**: broadcast of failures that belong to no caller
//! - **Observability**: `tracing` events and optional OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust
//! use futures::FutureExt;
//! use jremote_client::{Dispatcher, Remote, Transmission};
//! use jremote_core::{JsonRpcRequest, JsonRpcResponse};
//! use serde_json::json;
//! use std::sync::{Arc, OnceLock};
//!
//! # #[tokio::main]
//! # async fn main() -> jremote_core::Result<()> {
//! // A loopback peer that answers every call with its own params.
//! let dispatcher = Arc::new(OnceLock::<Dispatcher>::new());
//! let peer = dispatcher.clone();
//! let remote = Remote::new(move |message: JsonRpcRequest| -> Transmission {
//!     if let (Some(id), Some(dispatcher)) = (message.id, peer.get()) {
//!         let echo = message.params.unwrap_or_default();
//!         let _ = dispatcher.dispatch(JsonRpcResponse::success(echo, id));
//!     }
//!     async { Ok(()) }.boxed()
//! });
//! let _ = dispatcher.set(remote.dispatcher());
//!
//! let echoed = remote.call("echo", Some(json!({"hello": "world"})))?.await?;
//! assert_eq!(echoed, json!({"hello": "world"}));
//!
//! remote.notify("log", Some(json!(["done"])))?.await?;
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error_channel;
mod metrics;
mod pending;
mod remote;
mod remote_builder;
mod response;
mod transport;

pub use dispatcher::Dispatcher;
pub use error_channel::{ErrorChannel, DEFAULT_ERROR_CHANNEL_CAPACITY};
pub use metrics::RemoteMetrics;
pub use remote::{Remote, RESERVED_METHOD_PREFIX};
pub use remote_builder::RemoteBuilder;
pub use response::PendingResponse;
pub use transport::{Transmission, Transport};
