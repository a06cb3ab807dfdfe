//! Pending call table and identifier allocation
//!
//! # Call Lifecycle
//!
//! 1. **Allocate**: take the next identifier from the counter
//! 2. **Register**: store a oneshot sender under that identifier
//! 3. **Transmit**: hand the message to the transport
//! 4. **Take**: the first matching response or transmit failure removes the entry
//! 5. **Resolve**: the removed entry's sender delivers the outcome
//!
//! Registration happens strictly before transmission, so a response fed
//! back synchronously from inside `transmit` finds its entry.
//!
//! # Locking
//!
//! The table sits behind a synchronous mutex that is never held across
//! `transmit` or an `.await`. Lookup and removal happen under one lock
//! acquisition, so an entry is removed exactly once.
//!
//! # Metrics
//!
//! Registration raises the `pending_calls` gauge. Settling a call through
//! the dispatcher lowers it again; entries still in the table when the last
//! handle to it is dropped are subtracted then.

use crate::metrics::RemoteMetrics;
use jremote_core::{Error, Id, JsonRpcResponse, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;

/// Outcome delivered to a waiting caller
pub(crate) type Outcome = Result<JsonRpcResponse>;

/// A call waiting for its response
pub(crate) struct PendingCall {
    tx: oneshot::Sender<Outcome>,
    method: String,
    started: Instant,
}

impl PendingCall {
    /// Method name the call was issued for
    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// Seconds since the call was registered
    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Deliver the outcome
    ///
    /// A caller that dropped its future is not an error.
    pub(crate) fn resolve(self, outcome: Outcome) {
        let _ = self.tx.send(outcome);
    }
}

struct Table {
    calls: Mutex<HashMap<Id, PendingCall>>,
    metrics: Option<Arc<RemoteMetrics>>,
}

impl Drop for Table {
    fn drop(&mut self) {
        let abandoned = self.calls.get_mut().len();
        if abandoned == 0 {
            return;
        }

        tracing::debug!(abandoned, "Pending table dropped with calls outstanding");
        if let Some(ref m) = self.metrics {
            m.record_calls_abandoned(abandoned);
        }
    }
}

/// Identifier allocator and pending table, shared by engine and dispatcher
#[derive(Clone)]
pub(crate) struct PendingCalls {
    table: Arc<Table>,
    counter: Arc<AtomicU64>,
}

impl PendingCalls {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::with_metrics(None)
    }

    pub(crate) fn with_metrics(metrics: Option<Arc<RemoteMetrics>>) -> Self {
        Self {
            table: Arc::new(Table {
                calls: Mutex::new(HashMap::new()),
                metrics,
            }),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Allocate the next identifier: 0, 1, 2, ... never reused
    pub(crate) fn next_id(&self) -> Result<Id> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        i64::try_from(n)
            .map(Id::Number)
            .map_err(|_| Error::IdSpaceExhausted)
    }

    /// Register a pending call and return the receiving half
    pub(crate) fn register(
        &self,
        id: Id,
        method: impl Into<String>,
    ) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        let call = PendingCall {
            tx,
            method: method.into(),
            started: Instant::now(),
        };

        let previous = self.table.calls.lock().insert(id, call);
        debug_assert!(previous.is_none(), "identifier registered twice");
        if let Some(ref m) = self.table.metrics {
            m.record_call_started();
        }

        rx
    }

    /// Remove and return the entry for `id`, if still pending
    pub(crate) fn take(&self, id: &Id) -> Option<PendingCall> {
        self.table.calls.lock().remove(id)
    }

    /// Remove every pending entry
    pub(crate) fn drain(&self) -> Vec<PendingCall> {
        self.table.calls.lock().drain().map(|(_, call)| call).collect()
    }

    /// Number of calls awaiting a response
    pub(crate) fn pending_count(&self) -> usize {
        self.table.calls.lock().len()
    }

    /// Whether `id` has a pending entry
    pub(crate) fn is_pending(&self, id: &Id) -> bool {
        self.table.calls.lock().contains_key(id)
    }
}
