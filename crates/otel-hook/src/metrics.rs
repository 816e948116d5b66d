//! OpenTelemetry metrics for flag evaluation
//!
//! Evaluation timing lives on the spans; the meter carries the counters.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter},
};
use std::sync::OnceLock;

use crate::span::HOOK_VERSION;

static METER: OnceLock<Meter> = OnceLock::new();

fn get_meter() -> &'static Meter {
    METER.get_or_init(|| global::meter("open-feature-otel-hook"))
}

/// Metrics instruments for flag evaluation
pub struct EvaluationMetrics {
    evaluation_total: Counter<u64>,
    evaluation_error_total: Counter<u64>,
}

impl EvaluationMetrics {
    /// Create a new EvaluationMetrics instance
    #[must_use]
    pub fn new() -> Self {
        let meter = get_meter();

        let evaluation_total = meter
            .u64_counter("feature_flag.evaluation_total")
            .with_description("Total number of flag evaluations")
            .with_unit("1")
            .build();

        let evaluation_error_total = meter
            .u64_counter("feature_flag.evaluation_error_total")
            .with_description("Total number of failed flag evaluations")
            .with_unit("1")
            .build();

        Self {
            evaluation_total,
            evaluation_error_total,
        }
    }

    /// Record a successful flag evaluation
    pub fn record_evaluation(&self, flag_key: &str, provider_name: &str, reason: &str) {
        let attributes = [
            KeyValue::new("feature_flag.key", flag_key.to_string()),
            KeyValue::new("feature_flag.provider_name", provider_name.to_string()),
            KeyValue::new("feature_flag.hook_version", HOOK_VERSION),
            KeyValue::new("feature_flag.reason", reason.to_string()),
        ];

        self.evaluation_total.add(1, &attributes);
    }

    /// Record a failed flag evaluation
    pub fn record_evaluation_error(&self, flag_key: &str, provider_name: &str, error_type: &str) {
        let attributes = [
            KeyValue::new("feature_flag.key", flag_key.to_string()),
            KeyValue::new("feature_flag.provider_name", provider_name.to_string()),
            KeyValue::new("feature_flag.hook_version", HOOK_VERSION),
            KeyValue::new("error.type", error_type.to_string()),
        ];

        self.evaluation_total.add(1, &attributes);
        self.evaluation_error_total.add(1, &attributes);
    }
}

impl Default for EvaluationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics instance for convenience
static GLOBAL_METRICS: OnceLock<EvaluationMetrics> = OnceLock::new();

/// Get the global evaluation metrics instance
#[must_use]
pub fn evaluation_metrics() -> &'static EvaluationMetrics {
    GLOBAL_METRICS.get_or_init(EvaluationMetrics::new)
}

/// Record a successful evaluation using global metrics
pub fn record_success(flag_key: &str, provider_name: &str, reason: &str) {
    evaluation_metrics().record_evaluation(flag_key, provider_name, reason);
}

/// Record a failed evaluation using global metrics
pub fn record_error(flag_key: &str, provider_name: &str, error_type: &str) {
    evaluation_metrics().record_evaluation_error(flag_key, provider_name, error_type);
}
