//! Prometheus metrics for store observability.
//!
//! The store records metrics through the `metrics` facade on every dispatch.
//! Nothing is collected until a recorder is installed; [`MetricsRecorder`]
//! installs the Prometheus one and renders the text exposition format.
//!
//! # Example
//!
//! ```rust,no_run
//! use statehouse_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... dispatch actions ...
//!
//! if let Some(rendered) = recorder.render() {
//!     println!("{rendered}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics recorder.
///
/// Holds the handle used to render collected metrics.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe the store metrics and install the Prometheus recorder globally.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a metrics recorder is already installed (e.g., in tests), the call
    /// succeeds without a handle and [`render`](Self::render) returns `None`.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_001, 0.000_01, 0.000_1, 0.001, 0.01, 0.1, 1.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                register_metrics();
                self.handle = Some(handle);
                tracing::debug!("Prometheus metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this recorder was never installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "store_actions_dispatched_total",
        "Total number of plain actions reduced by stores"
    );
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time spent inside the reducer per dispatch"
    );
    describe_counter!(
        "store_listeners_notified_total",
        "Total number of listener invocations after dispatch"
    );
    describe_gauge!(
        "store_listeners_active",
        "Number of listeners currently subscribed"
    );
    describe_counter!(
        "store_thunks_spawned_total",
        "Total number of thunks whose deferred part was spawned"
    );
    describe_counter!(
        "store_thunks_failed_total",
        "Total number of thunk tasks that panicked"
    );
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record a reduced action.
    pub fn record_dispatch(duration: Duration) {
        counter!("store_actions_dispatched_total").increment(1);
        histogram!("store_reducer_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record listener invocations for one dispatch.
    pub fn record_notifications(count: usize) {
        counter!("store_listeners_notified_total").increment(count as u64);
    }

    /// Record the current number of listeners.
    // Precision loss is acceptable for a listener gauge
    #[allow(clippy::cast_precision_loss)]
    pub fn record_listeners(active: usize) {
        gauge!("store_listeners_active").set(active as f64);
    }

    /// Record a spawned thunk.
    pub fn record_thunk_spawned() {
        counter!("store_thunks_spawned_total").increment(1);
    }

    /// Record a thunk task that did not complete.
    pub fn record_thunk_failed() {
        counter!("store_thunks_failed_total").increment(1);
    }
}
