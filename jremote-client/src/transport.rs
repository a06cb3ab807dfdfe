//! The transmit seam between the engine and its host
//!
//! The engine never touches sockets or bytes. It hands each outgoing
//! [`JsonRpcRequest`] to a [`Transport`] and gets back a [`Transmission`]:
//! a future that completes once the host considers the message sent, or
//! fails if it could not be sent.
//!
//! # Reentrancy
//!
//! `transmit` is called without any engine lock held. An in-memory or
//! loopback transport may therefore feed a response into the
//! [`Dispatcher`](crate::Dispatcher) before `transmit` even returns; the
//! engine registers the pending call first so such a response still matches.
//!
//! # Examples
//!
//! Closures returning a `Transmission` are transports:
//!
//! ```rust
//! use futures::FutureExt;
//! use jremote_client::{Remote, Transmission};
//! use jremote_core::JsonRpcRequest;
//!
//! let remote = Remote::new(|message: JsonRpcRequest| -> Transmission {
//!     println!("sending {}", message.method);
//!     async { Ok(()) }.boxed()
//! });
//! ```

use futures::future::BoxFuture;
use jremote_core::{JsonRpcRequest, Result};

/// Completion signal of a single transmission
pub type Transmission = BoxFuture<'static, Result<()>>;

/// Host-provided message transmission
pub trait Transport: Send + Sync + 'static {
    /// Start transmitting `message`
    ///
    /// Called exactly once per `call` or `notify`. Failures should be
    /// reported through the returned future.
    fn transmit(&self, message: JsonRpcRequest) -> Transmission;
}

impl<F> Transport for F
where
    F: Fn(JsonRpcRequest) -> Transmission + Send + Sync + 'static,
{
    fn transmit(&self, message: JsonRpcRequest) -> Transmission {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use jremote_core::{Error, Id};

    #[tokio::test]
    async fn test_closure_transport() {
        let transport = |message: JsonRpcRequest| -> Transmission {
            async move {
                if message.method == "fail" {
                    Err(Error::Transmit("refused".into()))
                } else {
                    Ok(())
                }
            }
            .boxed()
        };

        let ok = transport.transmit(JsonRpcRequest::new("ping", None, Id::Number(0)));
        assert!(ok.await.is_ok());

        let err = transport.transmit(JsonRpcRequest::notification("fail", None));
        assert_eq!(err.await.unwrap_err(), Error::Transmit("refused".into()));
    }
}
