//! Evaluation-hook contract applied around every flag evaluation.
//!
//! A hook opens a [`tracing::Span`] before the provider is called and
//! records the outcome on it afterwards. `after_evaluation` takes the span
//! by value: dropping the argument is what closes the span, so closure is
//! guaranteed on every exit path, including hook implementations that
//! record nothing or panic mid-way.

use open_feature::{EvaluationError, EvaluationErrorCode, EvaluationReason, Value};
use tracing::Span;

/// Borrowed view of an evaluation that is about to happen.
#[derive(Debug)]
pub struct HookContext<'a> {
    /// Key of the flag being evaluated.
    pub flag_key: &'a str,
    /// Targeting key of the evaluation context, when present.
    pub context_id: Option<&'a str>,
    /// Default value supplied at the call site.
    pub default_value: &'a Value,
    /// Name of the provider performing the evaluation.
    pub provider_name: &'a str,
}

/// Borrowed view of how an evaluation ended.
///
/// Exactly one of the success fields or `error` is populated. The selected
/// variation is identified by its `variant` name, which is how the
/// OpenFeature model names variations.
#[derive(Debug)]
pub struct EvaluationOutcome<'a> {
    pub flag_key: &'a str,
    pub provider_name: &'a str,
    pub variant: Option<&'a str>,
    pub reason: Option<&'a EvaluationReason>,
    pub value: Option<&'a Value>,
    pub error: Option<&'a EvaluationError>,
}

impl EvaluationOutcome<'_> {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A plugin applied around every evaluation performed by the client.
///
/// Hooks must never affect the evaluation result: `before_evaluation` is
/// infallible by signature, and the client swallows panics from both
/// methods.
pub trait EvaluationHook: Send + Sync {
    /// Opens a span for the evaluation. Must not panic.
    fn before_evaluation(&self, context: &HookContext<'_>) -> Span;

    /// Records the outcome and closes the span by consuming it.
    fn after_evaluation(&self, span: Span, outcome: &EvaluationOutcome<'_>);
}

/// Renders an evaluation reason as a stable SCREAMING_SNAKE label.
#[must_use]
pub fn reason_label(reason: &EvaluationReason) -> String {
    match reason {
        EvaluationReason::Static => "STATIC".to_string(),
        EvaluationReason::Default => "DEFAULT".to_string(),
        EvaluationReason::TargetingMatch => "TARGETING_MATCH".to_string(),
        EvaluationReason::Disabled => "DISABLED".to_string(),
        EvaluationReason::Cached => "CACHED".to_string(),
        EvaluationReason::Error => "ERROR".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

/// Renders an evaluation error code as a stable label.
#[must_use]
pub fn error_code_label(code: &EvaluationErrorCode) -> String {
    match code {
        EvaluationErrorCode::ProviderNotReady => "PROVIDER_NOT_READY".to_string(),
        EvaluationErrorCode::FlagNotFound => "FLAG_NOT_FOUND".to_string(),
        EvaluationErrorCode::ParseError => "PARSE_ERROR".to_string(),
        EvaluationErrorCode::TypeMismatch => "TYPE_MISMATCH".to_string(),
        EvaluationErrorCode::InvalidContext => "INVALID_CONTEXT".to_string(),
        EvaluationErrorCode::General(message) => format!("GENERAL: {message}"),
        other => format!("{other:?}").to_uppercase(),
    }
}

/// Renders an evaluated value as JSON for span metadata.
#[must_use]
pub fn value_label(value: &Value) -> String {
    serde_json::to_string(&value_to_json(value)).unwrap_or_else(|_| format!("{value:?}"))
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Struct(s) => serde_json::Value::Object(
            s.fields
                .iter()
                .map(|(key, field)| (key.clone(), value_to_json(field)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use open_feature::StructValue;

    #[test]
    fn test_reason_labels() {
        assert_eq!(reason_label(&EvaluationReason::Static), "STATIC");
        assert_eq!(
            reason_label(&EvaluationReason::TargetingMatch),
            "TARGETING_MATCH"
        );
        assert_eq!(reason_label(&EvaluationReason::Disabled), "DISABLED");
        assert_eq!(reason_label(&EvaluationReason::Error), "ERROR");
    }

    #[test]
    fn test_error_code_labels() {
        assert_eq!(
            error_code_label(&EvaluationErrorCode::FlagNotFound),
            "FLAG_NOT_FOUND"
        );
        assert_eq!(
            error_code_label(&EvaluationErrorCode::General("boom".to_string())),
            "GENERAL: boom"
        );
    }

    #[test]
    fn test_value_label_primitives() {
        assert_eq!(value_label(&Value::Bool(true)), "true");
        assert_eq!(value_label(&Value::Int(42)), "42");
        assert_eq!(value_label(&Value::String("dark".to_string())), "\"dark\"");
    }

    #[test]
    fn test_value_label_struct() {
        let mut fields = StructValue::default();
        fields.add_field("enabled".to_string(), Value::Bool(true));
        let rendered = value_label(&Value::Struct(fields));
        assert_eq!(rendered, "{\"enabled\":true}");
    }

    #[test]
    fn test_outcome_is_error() {
        let error = EvaluationError {
            code: EvaluationErrorCode::FlagNotFound,
            message: None,
        };
        let outcome = EvaluationOutcome {
            flag_key: "test-flag",
            provider_name: "stub",
            variant: None,
            reason: None,
            value: None,
            error: Some(&error),
        };
        assert!(outcome.is_error());
    }
}
