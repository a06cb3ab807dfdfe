//! Engine builder
//!
//! `RemoteBuilder` configures an engine before it is created:
//! - Capacity of the general error channel
//! - Observability (OpenTelemetry)
//! - Service name for telemetry
//!
//! # Examples
//!
//! ```rust,no_run
//! use futures::FutureExt;
//! use jremote_client::{RemoteBuilder, Transmission};
//! use jremote_core::JsonRpcRequest;
//!
//! # fn example() -> jremote_core::Result<()> {
//! let transport = |message: JsonRpcRequest| -> Transmission {
//!     // hand `message` to the wire here
//!     async { Ok(()) }.boxed()
//! };
//!
//! let remote = RemoteBuilder::new(transport)
//!     .error_channel_capacity(256)
//!     .with_default_observability()
//!     .service_name("billing-gateway")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::error_channel::{ErrorChannel, DEFAULT_ERROR_CHANNEL_CAPACITY};
use crate::metrics::RemoteMetrics;
use crate::remote::Remote;
use crate::transport::Transport;
use jremote_core::{Error, ObservabilityConfig, Result};
use std::sync::Arc;

const DEFAULT_SERVICE_NAME: &str = "jremote";

/// Builder for configuring and creating a [`Remote`]
pub struct RemoteBuilder {
    transport: Arc<dyn Transport>,
    error_channel_capacity: usize,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
    enable_metrics: Option<bool>,
}

impl RemoteBuilder {
    /// Create a new builder around `transport`
    pub fn new(transport: impl Transport) -> Self {
        Self {
            transport: Arc::new(transport),
            error_channel_capacity: DEFAULT_ERROR_CHANNEL_CAPACITY,
            observability_config: None,
            service_name: None,
            enable_metrics: None,
        }
    }

    /// Number of unread errors retained per error channel subscriber
    pub fn error_channel_capacity(mut self, capacity: usize) -> Self {
        self.error_channel_capacity = capacity;
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    ///
    /// `build` installs the global subscriber and providers. Engine metrics
    /// follow the config's `enable_metrics` unless [`with_metrics`](Self::with_metrics)
    /// was called.
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(self) -> Self {
        self.with_observability(ObservabilityConfig::default())
    }

    /// Set service name for observability and metrics
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Record engine metrics on the global meter provider
    ///
    /// Useful when the host installed its own provider and does not want
    /// `build` to initialize observability. Takes precedence over the
    /// observability config's `enable_metrics` regardless of call order.
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Whether `build` will create engine metrics
    fn metrics_enabled(&self) -> bool {
        self.enable_metrics.unwrap_or_else(|| {
            self.observability_config
                .as_ref()
                .is_some_and(|config| config.enable_metrics)
        })
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// `Error::Internal` when observability was requested and could not be
    /// initialized.
    pub fn build(mut self) -> Result<Remote> {
        let enable_metrics = self.metrics_enabled();

        if let Some(mut config) = self.observability_config.take() {
            if let Some(ref name) = self.service_name {
                config.service_name = name.clone();
            }

            jremote_core::init_observability(config.clone())
                .map_err(|e| Error::Internal(format!("Failed to initialize observability: {}", e)))?;

            if self.service_name.is_none() {
                self.service_name = Some(config.service_name);
            }
        }

        let metrics = if enable_metrics {
            let name = self
                .service_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
            Some(Arc::new(RemoteMetrics::new(name)))
        } else {
            None
        };

        Ok(self.assemble(metrics))
    }

    pub(crate) fn assemble(self, metrics: Option<Arc<RemoteMetrics>>) -> Remote {
        tracing::debug!(
            error_channel_capacity = self.error_channel_capacity,
            metrics = metrics.is_some(),
            "Engine created"
        );
        Remote::from_parts(
            self.transport,
            ErrorChannel::with_capacity(self.error_channel_capacity),
            metrics,
        )
    }
}
