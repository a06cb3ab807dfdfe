//! Inbound response correlation
//!
//! The host's receive path owns a [`Dispatcher`] and feeds it every response
//! it has decoded. The dispatcher matches the response to its pending call by
//! identifier and resolves that call. A response nobody is waiting for is
//! reported back to the host as `Error::UnexpectedResponseId`.

use crate::metrics::RemoteMetrics;
use crate::pending::PendingCalls;
use jremote_core::{Error, Id, JsonRpcResponse, Result};
use std::sync::Arc;

/// Cloneable handle for feeding responses into an engine
///
/// Obtained from [`Remote::dispatcher`](crate::Remote::dispatcher). Clones
/// share the engine's pending table.
#[derive(Clone)]
pub struct Dispatcher {
    pending: PendingCalls,
    metrics: Option<Arc<RemoteMetrics>>,
}

impl Dispatcher {
    pub(crate) fn new(pending: PendingCalls, metrics: Option<Arc<RemoteMetrics>>) -> Self {
        Self { pending, metrics }
    }

    /// Resolve the pending call that `response` answers
    ///
    /// Safe to call from inside a transport's `transmit`.
    ///
    /// # Errors
    ///
    /// `Error::UnexpectedResponseId` when no call is pending under
    /// `response.id`: a duplicate, a response for an unknown id, or a
    /// transport bug.
    pub fn dispatch(&self, response: JsonRpcResponse) -> Result<()> {
        let Some(call) = self.pending.take(&response.id) else {
            tracing::warn!(id = %response.id, "Response does not match any pending call");
            if let Some(ref m) = self.metrics {
                m.record_unexpected_response();
            }
            return Err(Error::UnexpectedResponseId(response.id));
        };

        let status = if response.is_success() {
            "success"
        } else if response.is_error() {
            "remote_error"
        } else {
            "malformed"
        };

        tracing::debug!(id = %response.id, method = call.method(), status, "Response dispatched");
        if let Some(ref m) = self.metrics {
            m.record_call(call.method(), status, call.elapsed_secs());
        }

        call.resolve(Ok(response));
        Ok(())
    }

    /// Resolve the call under `id` with a transmission failure
    ///
    /// Hands the error back when the call is no longer pending.
    pub(crate) fn fail(&self, id: &Id, error: Error) -> Option<Error> {
        let Some(call) = self.pending.take(id) else {
            return Some(error);
        };

        tracing::debug!(id = %id, method = call.method(), error = %error, "Call failed");
        if let Some(ref m) = self.metrics {
            m.record_call(call.method(), "transmit_error", call.elapsed_secs());
        }

        call.resolve(Err(error));
        None
    }

    /// Resolve every pending call with `error`
    pub(crate) fn fail_all(&self, error: Error) -> usize {
        let calls = self.pending.drain();
        let count = calls.len();

        for call in calls {
            if let Some(ref m) = self.metrics {
                m.record_call(call.method(), "abandoned", call.elapsed_secs());
            }
            call.resolve(Err(error.clone()));
        }

        count
    }

    /// Whether a call is pending under `id`
    pub fn is_pending(&self, id: &Id) -> bool {
        self.pending.is_pending(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dispatcher() -> (Dispatcher, PendingCalls) {
        let pending = PendingCalls::new();
        (Dispatcher::new(pending.clone(), None), pending)
    }

    #[tokio::test]
    async fn test_dispatch_resolves_matching_call() {
        let (dispatcher, pending) = dispatcher();
        let rx = pending.register(Id::Number(0), "sum");

        dispatcher
            .dispatch(JsonRpcResponse::success(json!(3), Id::Number(0)))
            .unwrap();

        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.result, Some(json!(3)));
        assert!(!dispatcher.is_pending(&Id::Number(0)));
    }

    #[test]
    fn test_dispatch_unknown_id_names_it() {
        let (dispatcher, _) = dispatcher();

        let err = dispatcher
            .dispatch(JsonRpcResponse::success(json!(1), Id::from("x1")))
            .unwrap_err();

        assert_eq!(err, Error::UnexpectedResponseId(Id::from("x1")));
        assert!(err.to_string().contains("x1"));
    }

    #[test]
    fn test_duplicate_response_rejected() {
        let (dispatcher, pending) = dispatcher();
        let _rx = pending.register(Id::Number(4), "m");

        assert!(dispatcher
            .dispatch(JsonRpcResponse::success(json!(1), Id::Number(4)))
            .is_ok());
        assert!(dispatcher
            .dispatch(JsonRpcResponse::success(json!(1), Id::Number(4)))
            .unwrap_err()
            .is_protocol_violation());
    }

    #[test]
    fn test_string_and_number_ids_are_distinct() {
        let (dispatcher, pending) = dispatcher();
        let _rx = pending.register(Id::Number(1), "m");

        let err = dispatcher
            .dispatch(JsonRpcResponse::success(json!(1), Id::from("1")))
            .unwrap_err();
        assert_eq!(err, Error::UnexpectedResponseId(Id::from("1")));
        assert!(dispatcher.is_pending(&Id::Number(1)));
    }

    #[tokio::test]
    async fn test_fail_routes_to_caller() {
        let (dispatcher, pending) = dispatcher();
        let rx = pending.register(Id::Number(2), "m");

        assert!(dispatcher.fail(&Id::Number(2), Error::Transmit("down".into())).is_none());
        assert_eq!(rx.await.unwrap().unwrap_err(), Error::Transmit("down".into()));
    }

    #[test]
    fn test_fail_without_entry_hands_error_back() {
        let (dispatcher, _) = dispatcher();
        let returned = dispatcher.fail(&Id::Number(9), Error::Transmit("late".into()));
        assert_eq!(returned, Some(Error::Transmit("late".into())));
    }

    #[tokio::test]
    async fn test_fail_all() {
        let (dispatcher, pending) = dispatcher();
        let rx1 = pending.register(Id::Number(1), "a");
        let rx2 = pending.register(Id::Number(2), "b");

        assert_eq!(dispatcher.fail_all(Error::Transmit("closed".into())), 2);
        assert_eq!(pending.pending_count(), 0);
        assert!(rx1.await.unwrap().is_err());
        assert!(rx2.await.unwrap().is_err());
    }
}
