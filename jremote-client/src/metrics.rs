//! Engine metrics
//!
//! OpenTelemetry instruments describing correlation health. They are
//! recorded only when the engine was built with metrics enabled, and are
//! exported by whatever meter provider the host installed (see
//! `jremote_core::init_observability`).
//!
//! # Metrics Collected
//!
//! - **calls_total**: Calls resolved, by method and status (counter)
//! - **call_duration**: Time from registration to resolution (histogram)
//! - **notifications_total**: Notifications handed to the transport (counter)
//! - **pending_calls**: Calls currently awaiting a response (up/down counter)
//! - **unexpected_responses**: Responses with no matching pending call (counter)
//! - **transmit_failures**: Failed transmissions (counter)
//! - **channel_errors**: Errors published on the general error channel (counter)

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter, UpDownCounter},
    InstrumentationScope, KeyValue,
};

/// Engine metrics for monitoring
pub struct RemoteMetrics {
    /// Calls resolved, by method and status
    pub calls_total: Counter<u64>,
    /// Call duration in seconds
    pub call_duration: Histogram<f64>,
    /// Notifications transmitted, by method
    pub notifications_total: Counter<u64>,
    /// Calls currently pending
    pub pending_calls: UpDownCounter<i64>,
    /// Responses that matched no pending call
    pub unexpected_responses: Counter<u64>,
    /// Transmissions that failed
    pub transmit_failures: Counter<u64>,
    /// Errors routed to the general error channel
    pub channel_errors: Counter<u64>,
}

impl RemoteMetrics {
    /// Create metrics on the global meter provider
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into()).build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    /// Create metrics on a specific meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            calls_total: meter
                .u64_counter("jremote.calls.total")
                .with_description("Total number of calls resolved")
                .build(),
            call_duration: meter
                .f64_histogram("jremote.call.duration")
                .with_description("Call duration in seconds")
                .build(),
            notifications_total: meter
                .u64_counter("jremote.notifications.total")
                .with_description("Total number of notifications transmitted")
                .build(),
            pending_calls: meter
                .i64_up_down_counter("jremote.calls.pending")
                .with_description("Number of calls awaiting a response")
                .build(),
            unexpected_responses: meter
                .u64_counter("jremote.responses.unexpected")
                .with_description("Responses whose id matched no pending call")
                .build(),
            transmit_failures: meter
                .u64_counter("jremote.transmit.failures")
                .with_description("Total number of failed transmissions")
                .build(),
            channel_errors: meter
                .u64_counter("jremote.errors.channel")
                .with_description("Errors published on the general error channel")
                .build(),
        }
    }

    /// Record a newly registered call
    pub fn record_call_started(&self) {
        self.pending_calls.add(1, &[]);
    }

    /// Record a resolved call
    pub fn record_call(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.pending_calls.add(-1, &[]);
        self.calls_total.add(1, attributes);
        self.call_duration.record(duration_secs, attributes);
    }

    /// Record calls dropped with the engine before they were settled
    pub fn record_calls_abandoned(&self, count: usize) {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        self.pending_calls.add(-count, &[]);
    }

    /// Record a transmitted notification
    pub fn record_notification(&self, method: &str) {
        let attributes = &[KeyValue::new("method", method.to_string())];
        self.notifications_total.add(1, attributes);
    }

    /// Record a response with no pending call
    pub fn record_unexpected_response(&self) {
        self.unexpected_responses.add(1, &[]);
    }

    /// Record a failed transmission
    pub fn record_transmit_failure(&self) {
        self.transmit_failures.add(1, &[]);
    }

    /// Record an error published on the general error channel
    pub fn record_channel_error(&self) {
        self.channel_errors.add(1, &[]);
    }
}
