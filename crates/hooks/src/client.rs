//! Hook-aware evaluation client.
//!
//! [`FlagClient`] wraps any [`FeatureProvider`] and applies an ordered list
//! of [`EvaluationHook`]s around every evaluation. The `*_details` methods
//! return the provider result unaltered; the `*_variation` methods apply
//! the call-site fallback policy of logging the failure and returning the
//! supplied default.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;

use open_feature::provider::{FeatureProvider, ResolutionDetails};
use open_feature::{EvaluationContext, EvaluationError, StructValue, Value};
use tracing::{Instrument, Span, warn};

use crate::hook::{EvaluationHook, EvaluationOutcome, HookContext};

type ResolveFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<ResolutionDetails<T>, EvaluationError>> + Send + 'a>>;

/// A flag-evaluation client with an ordered hook list.
///
/// Hooks open their spans in attachment order and close them in reverse
/// order, so span lifetimes nest per evaluation.
pub struct FlagClient {
    provider: Arc<dyn FeatureProvider + Send + Sync>,
    hooks: Vec<Arc<dyn EvaluationHook>>,
}

impl FlagClient {
    /// Creates a client over an existing provider with no hooks attached.
    #[must_use]
    pub fn new(provider: Arc<dyn FeatureProvider + Send + Sync>) -> Self {
        Self {
            provider,
            hooks: Vec::new(),
        }
    }

    /// Appends a hook to the ordered hook list.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn EvaluationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Name of the wrapped provider, as reported by its metadata.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider.metadata().name
    }

    /// Evaluates a boolean flag, returning the full resolution details.
    pub async fn bool_details(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: bool,
    ) -> Result<ResolutionDetails<bool>, EvaluationError> {
        let resolve: ResolveFuture<'_, bool> =
            Box::pin(self.provider.resolve_bool_value(flag_key, context));
        self.evaluate_with_hooks(flag_key, context, Value::Bool(default), resolve)
            .await
    }

    /// Evaluates a boolean flag, falling back to `default` on any error.
    pub async fn bool_variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: bool,
    ) -> bool {
        unwrap_or_default(self.bool_details(flag_key, context, default).await, flag_key, default)
    }

    /// Evaluates a string flag, returning the full resolution details.
    pub async fn string_details(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: String,
    ) -> Result<ResolutionDetails<String>, EvaluationError> {
        let resolve: ResolveFuture<'_, String> =
            Box::pin(self.provider.resolve_string_value(flag_key, context));
        self.evaluate_with_hooks(flag_key, context, Value::String(default), resolve)
            .await
    }

    /// Evaluates a string flag, falling back to `default` on any error.
    pub async fn string_variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: String,
    ) -> String {
        let result = self.string_details(flag_key, context, default.clone()).await;
        unwrap_or_default(result, flag_key, default)
    }

    /// Evaluates an integer flag, returning the full resolution details.
    pub async fn int_details(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: i64,
    ) -> Result<ResolutionDetails<i64>, EvaluationError> {
        let resolve: ResolveFuture<'_, i64> =
            Box::pin(self.provider.resolve_int_value(flag_key, context));
        self.evaluate_with_hooks(flag_key, context, Value::Int(default), resolve)
            .await
    }

    /// Evaluates an integer flag, falling back to `default` on any error.
    pub async fn int_variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: i64,
    ) -> i64 {
        unwrap_or_default(self.int_details(flag_key, context, default).await, flag_key, default)
    }

    /// Evaluates a float flag, returning the full resolution details.
    pub async fn float_details(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: f64,
    ) -> Result<ResolutionDetails<f64>, EvaluationError> {
        let resolve: ResolveFuture<'_, f64> =
            Box::pin(self.provider.resolve_float_value(flag_key, context));
        self.evaluate_with_hooks(flag_key, context, Value::Float(default), resolve)
            .await
    }

    /// Evaluates a float flag, falling back to `default` on any error.
    pub async fn float_variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: f64,
    ) -> f64 {
        unwrap_or_default(self.float_details(flag_key, context, default).await, flag_key, default)
    }

    /// Evaluates a structured flag, returning the full resolution details.
    pub async fn struct_details(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: StructValue,
    ) -> Result<ResolutionDetails<StructValue>, EvaluationError> {
        let resolve: ResolveFuture<'_, StructValue> =
            Box::pin(self.provider.resolve_struct_value(flag_key, context));
        self.evaluate_with_hooks(flag_key, context, Value::Struct(default), resolve)
            .await
    }

    /// Evaluates a structured flag, falling back to `default` on any error.
    pub async fn struct_variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: StructValue,
    ) -> StructValue {
        let result = self.struct_details(flag_key, context, default.clone()).await;
        unwrap_or_default(result, flag_key, default)
    }

    /// Runs the hook list around a provider resolution.
    ///
    /// Every hook gets exactly one `before_evaluation` and exactly one
    /// `after_evaluation` per call, on success and failure alike. The
    /// provider future is polled with the hook spans entered so provider
    /// logs land inside them.
    async fn evaluate_with_hooks<'a, T>(
        &'a self,
        flag_key: &'a str,
        context: &'a EvaluationContext,
        default_value: Value,
        resolve: ResolveFuture<'a, T>,
    ) -> Result<ResolutionDetails<T>, EvaluationError>
    where
        T: IntoFeatureValue + Clone,
    {
        let provider_name = self.provider.metadata().name.clone();
        let hook_context = HookContext {
            flag_key,
            context_id: context.targeting_key.as_deref(),
            default_value: &default_value,
            provider_name: &provider_name,
        };

        let spans: Vec<Span> = self
            .hooks
            .iter()
            .map(|hook| open_span(hook.as_ref(), &hook_context))
            .collect();

        let mut resolve = resolve;
        for span in spans.iter().rev() {
            resolve = Box::pin(resolve.instrument(span.clone()));
        }
        let result = resolve.await;

        let value = result
            .as_ref()
            .ok()
            .map(|details| details.value.clone().into_feature_value());
        let outcome = match &result {
            Ok(details) => EvaluationOutcome {
                flag_key,
                provider_name: &provider_name,
                variant: details.variant.as_deref(),
                reason: details.reason.as_ref(),
                value: value.as_ref(),
                error: None,
            },
            Err(error) => EvaluationOutcome {
                flag_key,
                provider_name: &provider_name,
                variant: None,
                reason: None,
                value: None,
                error: Some(error),
            },
        };

        // Close in reverse attachment order so span lifetimes nest.
        for (hook, span) in self.hooks.iter().zip(spans).rev() {
            close_span(hook.as_ref(), span, &outcome);
        }

        result
    }
}

impl std::fmt::Debug for FlagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagClient")
            .field("provider", &self.provider.metadata().name)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Hook failures must never alter the evaluation result, so panics are
/// contained here and logged.
fn open_span(hook: &dyn EvaluationHook, context: &HookContext<'_>) -> Span {
    panic::catch_unwind(AssertUnwindSafe(|| hook.before_evaluation(context))).unwrap_or_else(
        |_| {
            warn!(
                flag_key = context.flag_key,
                "evaluation hook panicked in before_evaluation"
            );
            Span::none()
        },
    )
}

fn close_span(hook: &dyn EvaluationHook, span: Span, outcome: &EvaluationOutcome<'_>) {
    // The span moves into the hook; an unwind still drops and closes it.
    if panic::catch_unwind(AssertUnwindSafe(|| hook.after_evaluation(span, outcome))).is_err() {
        warn!(
            flag_key = outcome.flag_key,
            "evaluation hook panicked in after_evaluation"
        );
    }
}

fn unwrap_or_default<T>(
    result: Result<ResolutionDetails<T>, EvaluationError>,
    flag_key: &str,
    default: T,
) -> T {
    match result {
        Ok(details) => details.value,
        Err(error) => {
            warn!(flag_key, error = ?error, "flag evaluation failed; returning default");
            default
        }
    }
}

/// Conversion into the OpenFeature value type for hook metadata.
pub trait IntoFeatureValue {
    fn into_feature_value(self) -> Value;
}

impl IntoFeatureValue for bool {
    fn into_feature_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoFeatureValue for i64 {
    fn into_feature_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoFeatureValue for f64 {
    fn into_feature_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoFeatureValue for String {
    fn into_feature_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoFeatureValue for StructValue {
    fn into_feature_value(self) -> Value {
        Value::Struct(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_feature_value_conversions() {
        assert!(matches!(true.into_feature_value(), Value::Bool(true)));
        assert!(matches!(7i64.into_feature_value(), Value::Int(7)));
        assert!(matches!(
            "on".to_string().into_feature_value(),
            Value::String(_)
        ));
        assert!(matches!(
            StructValue::default().into_feature_value(),
            Value::Struct(_)
        ));
    }
}
