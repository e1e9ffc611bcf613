use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total score requests processed
    pub score_requests_total: AtomicU64,

    /// Total transactions scored
    pub predictions_total: AtomicU64,

    /// Predictions by verdict
    pub predictions_fraud: AtomicU64,
    pub predictions_legit: AtomicU64,

    /// Guard-rail overrides applied
    pub overrides_total: AtomicU64,

    /// Requests rejected at validation
    pub validation_failures_total: AtomicU64,

    /// Model inference failures
    pub model_errors_total: AtomicU64,

    /// Score latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_50_100ms: AtomicU64,
    pub latency_over_100ms: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record one scored batch.
    pub fn record_batch(&self, predictions: &[crate::domain::Prediction], overrides: u64) {
        self.score_requests_total.fetch_add(1, Ordering::Relaxed);
        self.predictions_total
            .fetch_add(predictions.len() as u64, Ordering::Relaxed);
        self.overrides_total.fetch_add(overrides, Ordering::Relaxed);

        for prediction in predictions {
            if prediction.is_fraud {
                self.predictions_fraud.fetch_add(1, Ordering::Relaxed);
            } else {
                self.predictions_legit.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a request rejected at validation.
    pub fn record_validation_failure(&self) {
        self.validation_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a model inference failure.
    pub fn record_model_error(&self) {
        self.model_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record score latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 1000 {
            self.latency_under_1ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 5000 {
            self.latency_1_5ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 10000 {
            self.latency_5_10ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 50000 {
            self.latency_10_50ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 100000 {
            self.latency_50_100ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_100ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP fraudr_score_requests_total Total score requests
# TYPE fraudr_score_requests_total counter
fraudr_score_requests_total {}

# HELP fraudr_predictions_total Total transactions scored
# TYPE fraudr_predictions_total counter
fraudr_predictions_total {}

# HELP fraudr_predictions Predictions by verdict
# TYPE fraudr_predictions counter
fraudr_predictions{{verdict="fraud"}} {}
fraudr_predictions{{verdict="legit"}} {}

# HELP fraudr_overrides_total Guard-rail overrides applied
# TYPE fraudr_overrides_total counter
fraudr_overrides_total {}

# HELP fraudr_validation_failures_total Requests rejected at validation
# TYPE fraudr_validation_failures_total counter
fraudr_validation_failures_total {}

# HELP fraudr_model_errors_total Model inference failures
# TYPE fraudr_model_errors_total counter
fraudr_model_errors_total {}

# HELP fraudr_score_latency_bucket Score latency histogram
# TYPE fraudr_score_latency_bucket counter
fraudr_score_latency_bucket{{le="0.001"}} {}
fraudr_score_latency_bucket{{le="0.005"}} {}
fraudr_score_latency_bucket{{le="0.01"}} {}
fraudr_score_latency_bucket{{le="0.05"}} {}
fraudr_score_latency_bucket{{le="0.1"}} {}
fraudr_score_latency_bucket{{le="+Inf"}} {}
"#,
            self.score_requests_total.load(Ordering::Relaxed),
            self.predictions_total.load(Ordering::Relaxed),
            self.predictions_fraud.load(Ordering::Relaxed),
            self.predictions_legit.load(Ordering::Relaxed),
            self.overrides_total.load(Ordering::Relaxed),
            self.validation_failures_total.load(Ordering::Relaxed),
            self.model_errors_total.load(Ordering::Relaxed),
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_50_100ms.load(Ordering::Relaxed),
            self.latency_over_100ms.load(Ordering::Relaxed),
        )
    }
}

/// Guard for timing operations.
pub struct TimingGuard<'a> {
    registry: &'a MetricsRegistry,
    start: Instant,
}

impl<'a> TimingGuard<'a> {
    pub fn new(registry: &'a MetricsRegistry) -> Self {
        TimingGuard {
            registry,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for TimingGuard<'a> {
    fn drop(&mut self) {
        self.registry.record_latency(self.start);
    }
}
