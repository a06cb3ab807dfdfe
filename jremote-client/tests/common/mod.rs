//! Common test utilities for jremote-client integration tests
//!
//! [`FakeTransport`] stands in for a host's connection: it records every
//! message it is asked to transmit and completes the transmission the way
//! the test asks it to.

#![allow(dead_code)]

use futures::FutureExt;
use jremote_client::{Dispatcher, Remote, Transmission, Transport};
use jremote_core::{Error, JsonRpcRequest, JsonRpcResponse, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// How the fake completes each transmission
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Complete successfully
    Succeed,
    /// Fail with `Error::Transmit(reason)`
    Fail(String),
    /// Hold the transmission open until `complete_deferred` is called
    Defer,
    /// Answer requests synchronously, from inside `transmit`, with their
    /// params as the result
    Echo,
}

#[derive(Default)]
struct Inner {
    sent: Mutex<Vec<JsonRpcRequest>>,
    behavior: Mutex<Option<Behavior>>,
    dispatcher: Mutex<Option<Dispatcher>>,
    deferred: Mutex<VecDeque<oneshot::Sender<Result<()>>>>,
}

/// Recording transport with scripted completion
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Inner>,
}

impl FakeTransport {
    pub fn new(behavior: Behavior) -> Self {
        let transport = Self::default();
        transport.set_behavior(behavior);
        transport
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.inner.behavior.lock() = Some(behavior);
    }

    /// Route `Echo` responses into `dispatcher`
    pub fn attach(&self, dispatcher: Dispatcher) {
        *self.inner.dispatcher.lock() = Some(dispatcher);
    }

    /// Every message transmitted so far
    pub fn sent(&self) -> Vec<JsonRpcRequest> {
        self.inner.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.inner.sent.lock().len()
    }

    /// Complete the oldest deferred transmission with `outcome`
    ///
    /// Returns false when nothing was deferred.
    pub fn complete_deferred(&self, outcome: Result<()>) -> bool {
        match self.inner.deferred.lock().pop_front() {
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    fn echo(&self, message: &JsonRpcRequest) {
        let Some(id) = message.id.clone() else {
            return;
        };
        // Clone out so the lock is not held while the engine resolves the call.
        let dispatcher = self.inner.dispatcher.lock().clone();
        if let Some(dispatcher) = dispatcher {
            let result = message.params.clone().unwrap_or_default();
            dispatcher
                .dispatch(JsonRpcResponse::success(result, id))
                .expect("echo response should match its call");
        }
    }
}

impl Transport for FakeTransport {
    fn transmit(&self, message: JsonRpcRequest) -> Transmission {
        let behavior = self
            .inner
            .behavior
            .lock()
            .clone()
            .unwrap_or(Behavior::Succeed);
        self.inner.sent.lock().push(message.clone());

        match behavior {
            Behavior::Succeed => async { Ok(()) }.boxed(),
            Behavior::Fail(reason) => async move { Err(Error::Transmit(reason)) }.boxed(),
            Behavior::Defer => {
                let (tx, rx) = oneshot::channel();
                self.inner.deferred.lock().push_back(tx);
                rx.map(|outcome| {
                    outcome.unwrap_or_else(|_| Err(Error::Transmit("deferred transmission dropped".into())))
                })
                .boxed()
            }
            Behavior::Echo => {
                self.echo(&message);
                async { Ok(()) }.boxed()
            }
        }
    }
}

/// Engine over a fresh fake transport
pub fn remote(behavior: Behavior) -> (Remote, FakeTransport) {
    let transport = FakeTransport::new(behavior);
    let remote = Remote::new(transport.clone());
    (remote, transport)
}

/// Engine whose transport answers every call synchronously
pub fn echo_remote() -> (Remote, FakeTransport) {
    let (remote, transport) = remote(Behavior::Echo);
    transport.attach(remote.dispatcher());
    (remote, transport)
}

/// Bound on how long a test waits for an asynchronous effect
pub const WAIT: Duration = Duration::from_secs(2);
