//! Per-call response future

use crate::pending::Outcome;
use jremote_core::{Error, Id, JsonRpcResponse, RemoteError, Result};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;

/// Future returned by [`Remote::call`](crate::Remote::call)
///
/// Resolves exactly once with:
/// - the `result` of a success response,
/// - `Error::Remote` carrying the classified error object of an error response,
/// - `Error::MalformedResponse` when the response had neither,
/// - the transport's error if transmission failed first,
/// - `Error::Abandoned` if the engine dropped the call without resolving it.
///
/// Dropping the future does not withdraw the call; its response is still
/// consumed when it arrives.
#[derive(Debug)]
#[must_use = "dropping a PendingResponse discards the call's outcome"]
pub struct PendingResponse {
    id: Id,
    rx: oneshot::Receiver<Outcome>,
}

impl PendingResponse {
    pub(crate) fn new(id: Id, rx: oneshot::Receiver<Outcome>) -> Self {
        Self { id, rx }
    }

    /// Identifier allocated to this call
    pub fn id(&self) -> &Id {
        &self.id
    }
}

impl Future for PendingResponse {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let outcome = ready!(Pin::new(&mut this.rx).poll(cx));
        Poll::Ready(match outcome {
            Ok(Ok(response)) => into_result(response),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(Error::Abandoned),
        })
    }
}

/// Turn a matched response into the caller's result
fn into_result(response: JsonRpcResponse) -> Result<Value> {
    if let Some(result) = response.result {
        Ok(result)
    } else if let Some(error) = response.error {
        Err(Error::Remote(RemoteError::from(error)))
    } else {
        Err(Error::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jremote_core::{JsonRpcErrorData, RemoteErrorKind};
    use serde_json::json;

    fn pending(outcome: Option<Outcome>) -> PendingResponse {
        let (tx, rx) = oneshot::channel();
        if let Some(outcome) = outcome {
            let _ = tx.send(outcome);
        }
        PendingResponse::new(Id::Number(0), rx)
    }

    #[tokio::test]
    async fn test_success_yields_result() {
        let response = JsonRpcResponse::success(json!({"ok": true}), Id::Number(0));
        let result = pending(Some(Ok(response))).await.unwrap();
        assert_eq!(result, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_null_result_is_success() {
        let response = JsonRpcResponse::success(Value::Null, Id::Number(0));
        assert_eq!(pending(Some(Ok(response))).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_error_is_classified() {
        let response = JsonRpcResponse::error(
            JsonRpcErrorData::with_data(-32050, "overloaded", json!({"retry": 5})),
            Id::Number(0),
        );

        let err = pending(Some(Ok(response))).await.unwrap_err();
        let remote = err.as_remote().unwrap();
        assert!(matches!(remote.kind(), RemoteErrorKind::Server(_)));
        assert_eq!(remote.message(), "overloaded");
        assert_eq!(remote.data(), Some(&json!({"retry": 5})));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let response = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: Id::Number(0),
            result: None,
            error: None,
        };

        let err = pending(Some(Ok(response))).await.unwrap_err();
        assert_eq!(err, Error::MalformedResponse);
        assert_eq!(err.to_string(), "Response object has no result or error object");
    }

    #[tokio::test]
    async fn test_failure_passes_through() {
        let err = pending(Some(Err(Error::Transmit("reset".into()))))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Transmit("reset".into()));
    }

    #[test]
    fn test_debug_names_the_call() {
        let response = pending(None);
        assert!(format!("{:?}", response).contains("Number(0)"));
    }

    #[tokio::test]
    async fn test_dropped_sender_is_abandoned() {
        let err = pending(None).await.unwrap_err();
        assert_eq!(err, Error::Abandoned);
    }
}
