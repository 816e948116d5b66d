//! Telemetry session wiring for the local OTLP agent
//!
//! The hook only creates spans; something still has to export them. A
//! [`TelemetrySession`] owns that pipeline: an OTLP exporter pointed at the
//! local collector/agent process, a batching tracer provider, and the
//! global `tracing` subscriber carrying the OpenTelemetry layer. The
//! session is a scoped resource: spans are flushed and the provider shut
//! down when `shutdown` is called, and on `Drop` if it never is.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use open_feature_hooks::HookError;

/// Environment variable overriding the OTLP endpoint.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Configuration for [`TelemetrySession::init`].
#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    /// OTLP endpoint of the local collector/agent.
    pub endpoint: String,
    /// Service name attached to every exported span.
    pub service_name: String,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        let endpoint = std::env::var(OTLP_ENDPOINT_ENV)
            .unwrap_or_else(|_| DEFAULT_OTLP_ENDPOINT.to_string());
        Self {
            endpoint,
            service_name: "feature-flags".to_string(),
        }
    }
}

/// A running telemetry pipeline with a scoped lifetime.
pub struct TelemetrySession {
    provider: Option<SdkTracerProvider>,
}

impl TelemetrySession {
    /// Builds the OTLP pipeline and installs the global subscriber.
    ///
    /// Must run before any flag client is constructed so that the first
    /// evaluation is already traced, and within a Tokio runtime (the
    /// exporter's gRPC channel lives on it). Log output honors `RUST_LOG`;
    /// span export is never filtered.
    ///
    /// # Errors
    ///
    /// Returns `HookError::Telemetry` if the exporter cannot be built or a
    /// global subscriber is already installed.
    pub fn init(options: TelemetryOptions) -> Result<Self, HookError> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&options.endpoint)
            .build()
            .map_err(|e| HookError::Telemetry(format!("Failed to build OTLP exporter: {e}")))?;

        let processor = BatchSpanProcessor::builder(exporter).build();

        let resource = Resource::builder()
            .with_service_name(options.service_name.clone())
            .build();

        let provider = SdkTracerProvider::builder()
            .with_span_processor(processor)
            .with_resource(resource)
            .build();

        let telemetry_layer =
            tracing_opentelemetry::layer().with_tracer(provider.tracer("open-feature-otel-hook"));
        // The env filter applies to log output only; spans always export.
        let fmt_layer =
            tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
        let subscriber = Registry::default().with(telemetry_layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            HookError::Telemetry(format!("Failed to install tracing subscriber: {e}"))
        })?;

        debug!(endpoint = %options.endpoint, service_name = %options.service_name, "telemetry session started");
        Ok(Self {
            provider: Some(provider),
        })
    }

    /// Wraps an already-configured tracer provider.
    ///
    /// For embedders (and tests) that install their own subscriber; the
    /// session then only owns the flush-and-shutdown lifetime.
    #[must_use]
    pub fn from_provider(provider: SdkTracerProvider) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Flushes pending spans and shuts the provider down.
    ///
    /// # Errors
    ///
    /// Returns `HookError::Telemetry` if the provider fails to shut down.
    pub fn shutdown(mut self) -> Result<(), HookError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), HookError> {
        let Some(provider) = self.provider.take() else {
            return Ok(());
        };
        let _ = provider.force_flush();
        provider
            .shutdown()
            .map_err(|e| HookError::Telemetry(format!("Failed to shut down tracer provider: {e}")))
    }
}

impl Drop for TelemetrySession {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            eprintln!("telemetry session shutdown failed: {error}");
        }
    }
}
