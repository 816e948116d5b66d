//! OpenTelemetry evaluation hook
//!
//! Implements the [`EvaluationHook`] contract against the `tracing` /
//! OpenTelemetry stack: one client span per evaluation, result metadata
//! recorded on success and failure alike, and evaluation counters on the
//! global meter.

use open_feature_hooks::hook::{EvaluationHook, EvaluationOutcome, HookContext};
use open_feature_hooks::{error_code_label, reason_label, value_label};
use tracing::Span;

use crate::metrics;
use crate::span::{
    make_evaluation_span, record_evaluation_error, record_evaluation_result,
    record_evaluation_value,
};

/// Configuration for [`OtelHook`].
#[derive(Debug, Clone, Default)]
pub struct HookOptions {
    /// Attach the evaluated flag value to the span.
    ///
    /// Off by default: flag payloads can carry sensitive configuration and
    /// must not leak into telemetry unless explicitly opted in.
    pub include_value: bool,
}

/// Evaluation hook that traces every flag evaluation as an OpenTelemetry
/// client span.
pub struct OtelHook {
    options: HookOptions,
}

impl OtelHook {
    #[must_use]
    pub fn new(options: HookOptions) -> Self {
        Self { options }
    }
}

impl Default for OtelHook {
    fn default() -> Self {
        Self::new(HookOptions::default())
    }
}

impl EvaluationHook for OtelHook {
    fn before_evaluation(&self, context: &HookContext<'_>) -> Span {
        make_evaluation_span(context.flag_key, context.context_id, context.provider_name)
    }

    fn after_evaluation(&self, span: Span, outcome: &EvaluationOutcome<'_>) {
        match outcome.error {
            None => {
                let reason = outcome
                    .reason
                    .map(reason_label)
                    .unwrap_or_else(|| "UNKNOWN".to_string());
                record_evaluation_result(&span, outcome.variant, &reason);
                if self.options.include_value
                    && let Some(value) = outcome.value
                {
                    record_evaluation_value(&span, &value_label(value));
                }
                metrics::record_success(outcome.flag_key, outcome.provider_name, &reason);
            }
            Some(error) => {
                let error_type = error_code_label(&error.code);
                record_evaluation_error(&span, &error_type);
                metrics::record_error(outcome.flag_key, outcome.provider_name, &error_type);
            }
        }
        // Dropping the span here closes it; this runs on every outcome.
        drop(span);
    }
}
