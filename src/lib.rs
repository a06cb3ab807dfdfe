//! jremote - transport-agnostic JSON-RPC 2.0 request correlation
//!
//! This is the convenience crate that re-exports the jremote sub-crates.
//! Use it if you want a single dependency.
//!
//! # Architecture
//!
//! - **jremote-core**: message shapes, error taxonomy, observability setup
//! - **jremote-client**: the correlation engine, its builder and metrics
//!
//! # Quick Start
//!
//! ```rust
//! use futures::FutureExt;
//! use jremote::{Remote, client::Transmission, core::JsonRpcRequest};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = Remote::new(|message: JsonRpcRequest| -> Transmission {
//!         // encode `message` and write it to your connection here
//!         async { Ok(()) }.boxed()
//!     });
//!
//!     let pending = remote.call("add", Some(json!({"a": 5, "b": 3})))?;
//!
//!     // Your receive loop decodes the reply and feeds it back:
//!     // remote.dispatch(response)?;
//!     assert_eq!(remote.pending_count(), 1);
//!     drop(pending);
//!
//!     Ok(())
//! }
//! ```

pub use jremote_client as client;
pub use jremote_core as core;

pub use jremote_client::{Remote, RemoteBuilder};
pub use jremote_core::{Error, Result};
