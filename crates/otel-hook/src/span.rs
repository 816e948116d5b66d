//! Span creation utilities for flag-evaluation tracing

use opentelemetry::trace::SpanKind;
use tracing::Span;

/// Crate version for telemetry attributes
pub const HOOK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Semantic convention attributes for feature flag evaluation
pub mod attributes {
    pub const FEATURE_FLAG_KEY: &str = "feature_flag.key";
    pub const FEATURE_FLAG_VARIANT: &str = "feature_flag.variant";
    pub const FEATURE_FLAG_REASON: &str = "feature_flag.reason";
    pub const FEATURE_FLAG_VALUE: &str = "feature_flag.value";
    pub const FEATURE_FLAG_CONTEXT_ID: &str = "feature_flag.context.id";
    pub const FEATURE_FLAG_PROVIDER_NAME: &str = "feature_flag.provider_name";
    pub const FEATURE_FLAG_HOOK_VERSION: &str = "feature_flag.hook_version";
    pub const OTEL_STATUS_CODE: &str = "otel.status_code";
    pub const ERROR_TYPE: &str = "error.type";
}

/// Create a span for one flag evaluation
///
/// Result fields are declared empty and recorded by the `record_*` helpers
/// once the evaluation has finished.
#[must_use]
pub fn make_evaluation_span(
    flag_key: &str,
    context_id: Option<&str>,
    provider_name: &str,
) -> Span {
    tracing::trace_span!(
        "feature_flag.evaluate",
        otel.name = format!("evaluate {}", flag_key),
        otel.kind = ?SpanKind::Client,
        { attributes::FEATURE_FLAG_KEY } = flag_key,
        { attributes::FEATURE_FLAG_CONTEXT_ID } = context_id,
        { attributes::FEATURE_FLAG_PROVIDER_NAME } = provider_name,
        { attributes::FEATURE_FLAG_HOOK_VERSION } = HOOK_VERSION,
        { attributes::FEATURE_FLAG_VARIANT } = tracing::field::Empty,
        { attributes::FEATURE_FLAG_REASON } = tracing::field::Empty,
        { attributes::FEATURE_FLAG_VALUE } = tracing::field::Empty,
        { attributes::OTEL_STATUS_CODE } = tracing::field::Empty,
        { attributes::ERROR_TYPE } = tracing::field::Empty,
    )
}

/// Record a successful evaluation result on a span
pub fn record_evaluation_result(span: &Span, variant: Option<&str>, reason: &str) {
    if let Some(variant) = variant {
        span.record(attributes::FEATURE_FLAG_VARIANT, variant);
    }
    span.record(attributes::FEATURE_FLAG_REASON, reason);
    span.record(attributes::OTEL_STATUS_CODE, "OK");
}

/// Record the evaluated flag value on a span
pub fn record_evaluation_value(span: &Span, value: &str) {
    span.record(attributes::FEATURE_FLAG_VALUE, value);
}

/// Record evaluation error on a span
pub fn record_evaluation_error(span: &Span, error: &str) {
    span.record(attributes::OTEL_STATUS_CODE, "ERROR");
    span.record(attributes::ERROR_TYPE, error);
}
