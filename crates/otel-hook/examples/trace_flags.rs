//! Traced flag evaluation example
//!
//! Wires the OpenTelemetry evaluation hook into a flag client and traces a
//! handful of evaluations. Spans are exported to the local OTLP
//! collector/agent at `OTEL_EXPORTER_OTLP_ENDPOINT` (default
//! http://localhost:4317).
//!
//! Run with: LAUNCHDARKLY_SDK_KEY=<key> cargo run --example trace_flags
//!
//! The SDK key is validated fail-closed: the example refuses to start with
//! the variable unset or left at a placeholder value.

use std::sync::Arc;

use async_trait::async_trait;
use open_feature::provider::{FeatureProvider, ProviderMetadata, ResolutionDetails};
use open_feature::{
    EvaluationContext, EvaluationError, EvaluationErrorCode, EvaluationReason, EvaluationResult,
    StructValue,
};
use open_feature_hooks::{FlagClient, SdkKey};
use open_feature_otel_hook::{HookOptions, OtelHook, TelemetryOptions, TelemetrySession};

/// Stand-in for a real flag backend; serves a few fixed flags.
struct DemoProvider {
    metadata: ProviderMetadata,
}

impl DemoProvider {
    fn new(_sdk_key: SdkKey) -> Self {
        Self {
            metadata: ProviderMetadata::new("demo"),
        }
    }

    fn not_found(flag_key: &str) -> EvaluationError {
        EvaluationError {
            code: EvaluationErrorCode::FlagNotFound,
            message: Some(format!("Flag: {flag_key} not found")),
        }
    }
}

#[async_trait]
impl FeatureProvider for DemoProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn resolve_bool_value(
        &self,
        flag_key: &str,
        _context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<bool>> {
        match flag_key {
            "test-lpl" => Ok(ResolutionDetails {
                value: true,
                variant: Some("on".to_string()),
                reason: Some(EvaluationReason::TargetingMatch),
                flag_metadata: Default::default(),
            }),
            _ => Err(Self::not_found(flag_key)),
        }
    }

    async fn resolve_string_value(
        &self,
        flag_key: &str,
        _context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<String>> {
        match flag_key {
            "feature-theme" => Ok(ResolutionDetails {
                value: "dark".to_string(),
                variant: Some("dark".to_string()),
                reason: Some(EvaluationReason::Static),
                flag_metadata: Default::default(),
            }),
            _ => Err(Self::not_found(flag_key)),
        }
    }

    async fn resolve_int_value(
        &self,
        flag_key: &str,
        _context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<i64>> {
        Err(Self::not_found(flag_key))
    }

    async fn resolve_float_value(
        &self,
        flag_key: &str,
        _context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<f64>> {
        Err(Self::not_found(flag_key))
    }

    async fn resolve_struct_value(
        &self,
        flag_key: &str,
        _context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<StructValue>> {
        Err(Self::not_found(flag_key))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The agent pipeline must be up before the first evaluation is traced.
    let session = TelemetrySession::init(TelemetryOptions::default())?;

    let sdk_key = SdkKey::from_env()?;

    let hook = OtelHook::new(HookOptions {
        include_value: true,
    });
    let client =
        FlagClient::new(Arc::new(DemoProvider::new(sdk_key))).with_hook(Arc::new(hook));

    let context = EvaluationContext::default()
        .with_targeting_key("user-123")
        .with_custom_field("email", "user@example.com");

    // Each evaluation gets its own span, tagged with key, variant, reason
    // and (since include_value is on) the evaluated value.
    let enabled = client.bool_variation("test-lpl", &context, false).await;
    println!("test-lpl = {enabled}");

    let theme = client
        .string_variation("feature-theme", &context, "light".to_string())
        .await;
    println!("feature-theme = {theme}");

    // Unknown flag: the error is traced and the default comes back.
    let missing = client.bool_variation("not-a-flag", &context, false).await;
    println!("not-a-flag = {missing}");

    session.shutdown()?;
    Ok(())
}
