//! Tests for the OpenTelemetry evaluation hook
//!
//! These tests verify that exactly one span is exported per evaluation,
//! that result metadata lands on it, and that the value attribute honors
//! `include_value`.

#[cfg(test)]
mod span_tests {
    use crate::span::{
        make_evaluation_span, record_evaluation_error, record_evaluation_result,
        record_evaluation_value,
    };
    use std::time::Duration;

    use fake_opentelemetry_collector::{FakeCollectorServer, setup_tracer_provider};
    use opentelemetry::trace::TracerProvider;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_evaluation_span_created() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;

        // Setup tracing-opentelemetry layer - keep guard alive!
        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        // Create an evaluation span
        {
            let span = make_evaluation_span("test-flag", Some("user-123"), "stub");
            let _enter = span.enter();
            record_evaluation_result(&span, Some("on"), "STATIC");
            record_evaluation_value(&span, "true");
        }

        // Drop guard before flush to ensure spans are sent
        drop(_guard);

        // Force flush and shutdown
        let _ = tracer_provider.force_flush();
        tracer_provider.shutdown().expect("shutdown ok");
        drop(tracer_provider);

        // Collect spans
        let spans = fake_collector
            .exported_spans(1, Duration::from_secs(5))
            .await;

        assert!(!spans.is_empty(), "Should have at least one span");

        let span = &spans[0];
        assert!(
            span.name.contains("evaluate"),
            "Span name should contain 'evaluate'"
        );
        assert!(!span.attributes.is_empty(), "Span should have attributes");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_evaluation_error_recorded() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        // Create a span with error
        {
            let span = make_evaluation_span("error-flag", None, "stub");
            let _enter = span.enter();
            record_evaluation_error(&span, "FLAG_NOT_FOUND");
        }

        drop(_guard);

        let _ = tracer_provider.force_flush();
        tracer_provider.shutdown().expect("shutdown ok");
        drop(tracer_provider);

        let spans = fake_collector
            .exported_spans(1, Duration::from_secs(5))
            .await;

        assert!(!spans.is_empty(), "Should have at least one span");

        let span = &spans[0];
        assert!(
            span.name.contains("evaluate"),
            "Error span should still be an evaluate span"
        );
        let attributes = format!("{:?}", span.attributes);
        assert!(
            attributes.contains("FLAG_NOT_FOUND"),
            "Error type should be recorded, got: {attributes}"
        );
    }
}

/// Integration tests for the hooked client end to end
#[cfg(test)]
mod hooked_client_tests {
    use crate::hook::{HookOptions, OtelHook};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use fake_opentelemetry_collector::{FakeCollectorServer, setup_tracer_provider};
    use open_feature::provider::{FeatureProvider, ProviderMetadata, ResolutionDetails};
    use open_feature::{
        EvaluationContext, EvaluationError, EvaluationErrorCode, EvaluationReason,
        EvaluationResult, StructValue,
    };
    use open_feature_hooks::FlagClient;
    use opentelemetry::trace::TracerProvider;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    /// Provider stub serving one boolean flag, or failing every call.
    struct StubProvider {
        metadata: ProviderMetadata,
        fail: bool,
    }

    impl StubProvider {
        fn new(fail: bool) -> Self {
            Self {
                metadata: ProviderMetadata::new("stub"),
                fail,
            }
        }

        fn network_error(&self) -> EvaluationError {
            EvaluationError {
                code: EvaluationErrorCode::General("network unreachable".to_string()),
                message: Some("connection refused".to_string()),
            }
        }
    }

    #[async_trait]
    impl FeatureProvider for StubProvider {
        fn metadata(&self) -> &ProviderMetadata {
            &self.metadata
        }

        async fn resolve_bool_value(
            &self,
            _flag_key: &str,
            _context: &EvaluationContext,
        ) -> EvaluationResult<ResolutionDetails<bool>> {
            if self.fail {
                return Err(self.network_error());
            }
            Ok(ResolutionDetails {
                value: true,
                variant: Some("on".to_string()),
                reason: Some(EvaluationReason::TargetingMatch),
                flag_metadata: Default::default(),
            })
        }

        async fn resolve_string_value(
            &self,
            _flag_key: &str,
            _context: &EvaluationContext,
        ) -> EvaluationResult<ResolutionDetails<String>> {
            Err(self.network_error())
        }

        async fn resolve_int_value(
            &self,
            _flag_key: &str,
            _context: &EvaluationContext,
        ) -> EvaluationResult<ResolutionDetails<i64>> {
            Err(self.network_error())
        }

        async fn resolve_float_value(
            &self,
            _flag_key: &str,
            _context: &EvaluationContext,
        ) -> EvaluationResult<ResolutionDetails<f64>> {
            Err(self.network_error())
        }

        async fn resolve_struct_value(
            &self,
            _flag_key: &str,
            _context: &EvaluationContext,
        ) -> EvaluationResult<ResolutionDetails<StructValue>> {
            Err(self.network_error())
        }
    }

    fn hooked_client(fail: bool, include_value: bool) -> FlagClient {
        FlagClient::new(Arc::new(StubProvider::new(fail)))
            .with_hook(Arc::new(OtelHook::new(HookOptions { include_value })))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_successful_evaluation_exports_single_span_with_value() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = hooked_client(false, true);
        let context = EvaluationContext::default().with_targeting_key("user-123");
        let value = client.bool_variation("test-lpl", &context, false).await;
        assert!(value, "stub provider serves true");

        drop(_guard);

        let _ = tracer_provider.force_flush();
        tracer_provider.shutdown().expect("shutdown ok");
        drop(tracer_provider);

        let spans = fake_collector
            .exported_spans(1, Duration::from_secs(5))
            .await;

        assert_eq!(spans.len(), 1, "Exactly one span per evaluation");

        let span = &spans[0];
        assert!(
            span.name.contains("evaluate") && span.name.contains("test-lpl"),
            "Span should be named after the evaluation, got: {}",
            span.name
        );

        let attributes = format!("{:?}", span.attributes);
        assert!(attributes.contains("test-lpl"), "got: {attributes}");
        assert!(attributes.contains("TARGETING_MATCH"), "got: {attributes}");
        assert!(
            attributes.contains("feature_flag.value"),
            "include_value=true must attach the value, got: {attributes}"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_value_omitted_when_include_value_off() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = hooked_client(false, false);
        let context = EvaluationContext::default().with_targeting_key("user-123");
        let _ = client.bool_variation("test-lpl", &context, false).await;

        drop(_guard);

        let _ = tracer_provider.force_flush();
        tracer_provider.shutdown().expect("shutdown ok");
        drop(tracer_provider);

        let spans = fake_collector
            .exported_spans(1, Duration::from_secs(5))
            .await;

        assert_eq!(spans.len(), 1, "Exactly one span per evaluation");

        let attributes = format!("{:?}", spans[0].attributes);
        assert!(
            !attributes.contains("feature_flag.value"),
            "include_value=false must omit the value, got: {attributes}"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_evaluation_exports_span_and_returns_default() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = hooked_client(true, true);
        let context = EvaluationContext::default().with_targeting_key("user-123");
        let value = client.bool_variation("test-lpl", &context, false).await;
        assert!(!value, "caller must receive the supplied default");

        drop(_guard);

        let _ = tracer_provider.force_flush();
        tracer_provider.shutdown().expect("shutdown ok");
        drop(tracer_provider);

        let spans = fake_collector
            .exported_spans(1, Duration::from_secs(5))
            .await;

        assert_eq!(spans.len(), 1, "Error evaluations still export one span");

        let attributes = format!("{:?}", spans[0].attributes);
        assert!(attributes.contains("error.type"), "got: {attributes}");
        assert!(
            !attributes.contains("feature_flag.value"),
            "No value attribute on errors, got: {attributes}"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_each_hook_exports_its_own_span() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = FlagClient::new(Arc::new(StubProvider::new(false)))
            .with_hook(Arc::new(OtelHook::new(HookOptions::default())))
            .with_hook(Arc::new(OtelHook::new(HookOptions::default())));
        let context = EvaluationContext::default();
        let _ = client.bool_variation("test-lpl", &context, false).await;

        drop(_guard);

        let _ = tracer_provider.force_flush();
        tracer_provider.shutdown().expect("shutdown ok");
        drop(tracer_provider);

        let spans = fake_collector
            .exported_spans(2, Duration::from_secs(5))
            .await;

        assert_eq!(spans.len(), 2, "One span per attached hook");
    }
}

/// Integration tests for the telemetry session lifetime
#[cfg(test)]
mod telemetry_session_tests {
    use crate::span::{make_evaluation_span, record_evaluation_result};
    use crate::telemetry::TelemetrySession;
    use std::time::Duration;

    use fake_opentelemetry_collector::{FakeCollectorServer, setup_tracer_provider};
    use opentelemetry::trace::TracerProvider;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_flushes_pending_spans() {
        let mut fake_collector = FakeCollectorServer::start()
            .await
            .expect("fake collector started");

        let tracer_provider = setup_tracer_provider(&fake_collector).await;
        let session = TelemetrySession::from_provider(tracer_provider.clone());

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("hook-test"));
        let subscriber = Registry::default().with(telemetry_layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        {
            let span = make_evaluation_span("session-flag", None, "stub");
            let _enter = span.enter();
            record_evaluation_result(&span, Some("on"), "STATIC");
        }

        drop(_guard);
        drop(tracer_provider);

        session.shutdown().expect("session shutdown ok");

        let spans = fake_collector
            .exported_spans(1, Duration::from_secs(5))
            .await;

        assert!(!spans.is_empty(), "Session shutdown should flush spans");
    }
}
