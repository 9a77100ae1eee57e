//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry,
    register_int_gauge_with_registry, Counter, CounterVec, Encoder, Histogram, HistogramOpts,
    IntGauge, Opts, Registry, TextEncoder,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Chat request metrics
    pub chat_requests: CounterVec,
    pub chat_request_duration: Histogram,
    pub prompt_tokens: Histogram,
    pub active_sessions: IntGauge,

    // Completion backend metrics
    pub completion_requests: CounterVec,
    pub completion_duration: Histogram,

    // Compaction metrics
    pub compactions: Counter,
    pub compaction_chunks: Counter,
    pub compaction_failures: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let chat_requests = register_counter_vec_with_registry!(
            Opts::new("chat_requests_total", "Total chat requests"),
            &["status"],
            registry
        )?;

        let chat_request_duration = register_histogram_with_registry!(
            "chat_request_duration_seconds",
            "End-to-end chat request duration in seconds",
            registry
        )?;

        let prompt_tokens = register_histogram_with_registry!(
            HistogramOpts::new("prompt_tokens", "Estimated tokens per prompt sent")
                .buckets(vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0]),
            registry
        )?;

        let active_sessions = register_int_gauge_with_registry!(
            Opts::new("active_sessions", "Sessions held in memory"),
            registry
        )?;

        let completion_requests = register_counter_vec_with_registry!(
            Opts::new("completion_requests_total", "Total completion requests"),
            &["kind", "status"],
            registry
        )?;

        let completion_duration = register_histogram_with_registry!(
            "completion_duration_seconds",
            "Completion backend latency in seconds",
            registry
        )?;

        let compactions = register_counter_with_registry!(
            Opts::new("compactions_total", "Total compaction passes completed"),
            registry
        )?;

        let compaction_chunks = register_counter_with_registry!(
            Opts::new("compaction_chunks_total", "Total chunks summarized"),
            registry
        )?;

        let compaction_failures = register_counter_with_registry!(
            Opts::new("compaction_failures_total", "Total compaction passes aborted"),
            registry
        )?;

        Ok(Self {
            registry,
            chat_requests,
            chat_request_duration,
            prompt_tokens,
            active_sessions,
            completion_requests,
            completion_duration,
            compactions,
            compaction_chunks,
            compaction_failures,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a finished chat request
    pub fn record_chat_request(&self, success: bool, elapsed: Duration) {
        let status = if success { "success" } else { "error" };
        self.chat_requests.with_label_values(&[status]).inc();
        self.chat_request_duration.observe(elapsed.as_secs_f64());
    }

    /// Record a completion call, `kind` is `turn` or `summary`
    pub fn record_completion(&self, kind: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.completion_requests.with_label_values(&[kind, status]).inc();
    }

    /// Record a completed compaction pass
    pub fn record_compaction(&self, chunks: usize) {
        self.compactions.inc();
        self.compaction_chunks.inc_by(chunks as f64);
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }
}
