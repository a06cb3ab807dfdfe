//! The correlation engine
//!
//! [`Remote`] turns method invocations into JSON-RPC messages, hands them to
//! a [`Transport`], and matches the responses the host feeds back to the
//! calls that are waiting for them.
//!
//! # Engine Lifecycle
//!
//! 1. **Build**: `Remote::new(transport)` or `Remote::builder(transport)`
//! 2. **Wire up**: give `remote.dispatcher()` to the host's receive path
//! 3. **Use**: `call`, `notify`, `request`
//! 4. **Drop**: calls still pending resolve with `Error::Abandoned` once the
//!    last engine handle and dispatcher are gone
//!
//! The identifier counter, the pending table and the general error channel
//! belong to the engine instance. They are created with it and never reset.
//!
//! # Cloning
//!
//! `Remote` is cheaply cloneable. All clones share one transport, one
//! identifier counter and one pending table.

use crate::dispatcher::Dispatcher;
use crate::error_channel::ErrorChannel;
use crate::metrics::RemoteMetrics;
use crate::pending::PendingCalls;
use crate::remote_builder::RemoteBuilder;
use crate::response::PendingResponse;
use crate::transport::{Transmission, Transport};
use jremote_core::{is_structured, Error, Id, JsonRpcRequest, JsonRpcResponse, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Method name prefix reserved for protocol-internal methods
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// Transport-agnostic JSON-RPC 2.0 engine
///
/// # Examples
///
/// ```rust
/// use futures::FutureExt;
/// use jremote_client::{Remote, Transmission};
/// use jremote_core::{JsonRpcRequest, JsonRpcResponse};
/// use serde_json::json;
/// use std::sync::{Arc, Mutex};
///
/// # #[tokio::main]
/// # async fn main() -> jremote_core::Result<()> {
/// let sent = Arc::new(Mutex::new(Vec::new()));
/// let outbox = sent.clone();
/// let remote = Remote::new(move |message: JsonRpcRequest| -> Transmission {
///     outbox.lock().unwrap().push(message);
///     async { Ok(()) }.boxed()
/// });
///
/// let answer = remote.call("add", Some(json!([2, 3])))?;
///
/// // The host's receive path decodes the reply and dispatches it.
/// remote.dispatch(JsonRpcResponse::success(json!(5), answer.id().clone()))?;
///
/// assert_eq!(answer.await?, json!(5));
/// assert_eq!(sent.lock().unwrap()[0].method, "add");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Remote {
    transport: Arc<dyn Transport>,
    pending: PendingCalls,
    dispatcher: Dispatcher,
    errors: ErrorChannel,
    metrics: Option<Arc<RemoteMetrics>>,
}

impl Remote {
    /// Create an engine with default settings
    pub fn new(transport: impl Transport) -> Self {
        RemoteBuilder::new(transport).assemble(None)
    }

    /// Start configuring an engine
    pub fn builder(transport: impl Transport) -> RemoteBuilder {
        RemoteBuilder::new(transport)
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
        errors: ErrorChannel,
        metrics: Option<Arc<RemoteMetrics>>,
    ) -> Self {
        let pending = PendingCalls::with_metrics(metrics.clone());
        let dispatcher = Dispatcher::new(pending.clone(), metrics.clone());
        Self {
            transport,
            pending,
            dispatcher,
            errors,
            metrics,
        }
    }

    /// Call a remote method and expect a result
    ///
    /// Allocates a fresh identifier, registers the call, then transmits.
    /// The returned future resolves once, with the response's `result`, the
    /// classified remote error, or the transmission failure, whichever
    /// settles the call first. A transmission failure arriving after the
    /// call was settled goes to [`errors`](Self::errors).
    ///
    /// Must be called within a Tokio runtime: the transmission's completion
    /// is watched by a spawned task.
    ///
    /// # Errors
    ///
    /// Fails without transmitting when the method name starts with `rpc.`,
    /// when params are not an object or array, when no Tokio runtime is
    /// running, or when the identifier space is exhausted.
    #[tracing::instrument(skip(self, method, params), fields(method = %method.as_ref()))]
    pub fn call(
        &self,
        method: impl Into<String> + AsRef<str>,
        params: Option<Value>,
    ) -> Result<PendingResponse> {
        let method = method.into();
        check_method_name(&method)?;
        check_params(params.as_ref())?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::Internal("call requires a Tokio runtime".to_string()))?;

        let id = self.pending.next_id()?;
        let request = JsonRpcRequest::new(method.clone(), params, id.clone());

        // Register before transmitting: the transport may dispatch the
        // response before `transmit` returns.
        let rx = self.pending.register(id.clone(), method);

        let transmission = self.transport.transmit(request);
        runtime.spawn(watch_transmission(
            id.clone(),
            transmission,
            self.dispatcher.clone(),
            self.errors.clone(),
            self.metrics.clone(),
        ));

        tracing::debug!(id = %id, "Call transmitted");
        Ok(PendingResponse::new(id, rx))
    }

    /// Invoke a remote method without expecting a result
    ///
    /// Returns the transport's own completion signal. Once it succeeds there
    /// is no way to tell whether the remote executed the method.
    ///
    /// # Errors
    ///
    /// Fails without transmitting when the method name starts with `rpc.` or
    /// when params are not an object or array.
    #[tracing::instrument(skip(self, method, params), fields(method = %method.as_ref()))]
    pub fn notify(
        &self,
        method: impl Into<String> + AsRef<str>,
        params: Option<Value>,
    ) -> Result<Transmission> {
        let method = method.into();
        check_method_name(&method)?;
        check_params(params.as_ref())?;

        if let Some(ref m) = self.metrics {
            m.record_notification(&method);
        }

        tracing::debug!("Notification transmitted");
        Ok(self
            .transport
            .transmit(JsonRpcRequest::notification(method, params)))
    }

    /// Typed call: serialize `params`, await the result and deserialize it
    ///
    /// Params serializing to `null` (e.g. `()` or `None`) are omitted.
    pub async fn request<P, R>(&self, method: impl Into<String> + AsRef<str>, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = to_params(params)?;
        let result = self.call(method, params)?.await?;
        serde_json::from_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Feed an inbound response to the engine
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, response: JsonRpcResponse) -> Result<()> {
        self.dispatcher.dispatch(response)
    }

    /// Handle for the host's receive path
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Subscribe to errors that belong to no pending call
    pub fn errors(&self) -> broadcast::Receiver<Error> {
        self.errors.subscribe()
    }

    /// Fail every pending call with `error`
    ///
    /// For hosts whose connection is gone and whose pending calls can no
    /// longer be answered. Returns the number of calls failed.
    pub fn fail_pending(&self, error: Error) -> usize {
        let count = self.dispatcher.fail_all(error);
        if count > 0 {
            tracing::warn!(count, "Failed all pending calls");
        }
        count
    }

    /// Number of calls awaiting a response
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    /// Whether a call is pending under `id`
    pub fn is_pending(&self, id: &Id) -> bool {
        self.pending.is_pending(id)
    }
}

async fn watch_transmission(
    id: Id,
    transmission: Transmission,
    dispatcher: Dispatcher,
    errors: ErrorChannel,
    metrics: Option<Arc<RemoteMetrics>>,
) {
    let Err(error) = transmission.await else {
        return;
    };

    tracing::warn!(id = %id, error = %error, "Transmission failed");
    if let Some(ref m) = metrics {
        m.record_transmit_failure();
    }

    // Already settled by a response: nobody is waiting on this id anymore.
    if let Some(error) = dispatcher.fail(&id, error) {
        if let Some(ref m) = metrics {
            m.record_channel_error();
        }
        errors.publish(error);
    }
}

fn check_method_name(method: &str) -> Result<()> {
    if method.starts_with(RESERVED_METHOD_PREFIX) {
        return Err(Error::ReservedMethodName(method.to_string()));
    }
    Ok(())
}

fn check_params(params: Option<&Value>) -> Result<()> {
    match params {
        Some(value) if !is_structured(value) => Err(Error::InvalidParams(format!(
            "params must be an object or array, got {}",
            value
        ))),
        _ => Ok(()),
    }
}

fn to_params<P: Serialize>(params: P) -> Result<Option<Value>> {
    let value = serde_json::to_value(params).map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(if value.is_null() { None } else { Some(value) })
}
