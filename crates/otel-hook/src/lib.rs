//! OpenTelemetry instrumentation for OpenFeature flag evaluation
//!
//! This crate provides the tracing side of the evaluation-hook contract
//! defined in `open-feature-hooks`:
//! - [`OtelHook`] — one client span per flag evaluation, with result
//!   metadata recorded on success and failure alike
//! - evaluation counters on the global OpenTelemetry meter
//! - [`TelemetrySession`] — the OTLP pipeline to a local collector/agent,
//!   with flush-and-shutdown guaranteed on scope exit
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use open_feature_hooks::FlagClient;
//! use open_feature_otel_hook::{HookOptions, OtelHook, TelemetryOptions, TelemetrySession};
//! use std::sync::Arc;
//!
//! # async fn run(provider: Arc<dyn open_feature::provider::FeatureProvider + Send + Sync>) {
//! // The agent pipeline must be up before the first evaluation.
//! let session = TelemetrySession::init(TelemetryOptions::default()).unwrap();
//!
//! let hook = OtelHook::new(HookOptions { include_value: true });
//! let client = FlagClient::new(provider).with_hook(Arc::new(hook));
//!
//! let context = open_feature::EvaluationContext::default().with_targeting_key("user-123");
//! let enabled = client.bool_variation("test-lpl", &context, false).await;
//! println!("test-lpl = {enabled}");
//!
//! session.shutdown().unwrap();
//! # }
//! ```

pub mod hook;
pub mod metrics;
pub mod span;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use hook::{HookOptions, OtelHook};
pub use metrics::{EvaluationMetrics, evaluation_metrics, record_error, record_success};
pub use span::*;
pub use telemetry::{OTLP_ENDPOINT_ENV, TelemetryOptions, TelemetrySession};
