//! Performance metrics for search execution
//!
//! Tracks search requests from issue to terminal state, labeled by mode
//! and transport so batch and streaming behavior can be compared.
//!
//! # Metrics
//!
//! - `searches_total`: Counter of searches issued
//! - `search_duration_seconds`: Histogram of time to terminal state
//! - `search_completions_total`: Counter of terminal states by outcome
//! - `frames_decoded_total`: Counter of stream frames applied, by event
//! - `searches_active_count`: Gauge of searches currently in flight

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::api::types::SearchMode;

/// Metrics collection for a single search execution.
///
/// One tracker lives inside one search future. The recorded flag is
/// atomic so recording works through shared references on whatever
/// thread the future runs on.
#[derive(Debug)]
pub struct SearchMetrics {
    mode: SearchMode,
    transport: &'static str,
    start: Instant,
    recorded: AtomicBool,
}

impl SearchMetrics {
    /// Start tracking a search.
    ///
    /// Increments the issue counter and the active gauge.
    pub fn new(mode: SearchMode, streaming: bool) -> Self {
        let transport = if streaming { "stream" } else { "batch" };

        increment_counter!("searches_total", "mode" => mode.as_str(), "transport" => transport);
        increment_gauge!("searches_active_count", 1.0);

        Self {
            mode,
            transport,
            start: Instant::now(),
            recorded: AtomicBool::new(false),
        }
    }

    /// Count one applied stream frame.
    pub fn record_frame(&self, event: &str) {
        increment_counter!("frames_decoded_total", "event" => event.to_string());
    }

    /// Record the terminal state of the search.
    ///
    /// `outcome` is one of `done`, `error`, or `superseded`. Only the first
    /// call records; later calls are ignored.
    pub fn record_outcome(&self, outcome: &str) {
        if self.recorded.swap(true, Ordering::Relaxed) {
            return;
        }

        histogram!(
            "search_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "mode" => self.mode.as_str(),
            "transport" => self.transport,
            "outcome" => outcome.to_string()
        );

        increment_counter!(
            "search_completions_total",
            "outcome" => outcome.to_string()
        );

        decrement_gauge!("searches_active_count", 1.0);
    }

    /// Elapsed time since the search was issued.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for SearchMetrics {
    /// Keeps the active gauge accurate even when a search future is
    /// dropped before reaching a terminal state.
    fn drop(&mut self) {
        if !self.recorded.load(Ordering::Relaxed) {
            decrement_gauge!("searches_active_count", 1.0);
        }
    }
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter on the standard endpoint. When disabled,
/// it's a no-op and still safe to call.
///
/// # Examples
///
/// ```
/// use autosearch::session::metrics::init_metrics_exporter;
///
/// init_metrics_exporter();
/// ```
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
