//! Evaluation hooks for OpenFeature providers
//!
//! This crate defines the backend-agnostic contract for plugins applied
//! around feature-flag evaluations, and a small client that wraps any
//! [`open_feature::provider::FeatureProvider`] with an ordered hook list.
//!
//! A hook opens a span before the provider is called and records the
//! outcome on it afterwards. Hooks are isolated from the evaluation: a
//! failing hook is logged and ignored, and the caller always receives the
//! provider's result (or the supplied default with the `*_variation`
//! methods).
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use open_feature::EvaluationContext;
//! use open_feature_hooks::FlagClient;
//! use std::sync::Arc;
//!
//! # async fn run(provider: Arc<dyn open_feature::provider::FeatureProvider + Send + Sync>) {
//! let client = FlagClient::new(provider);
//! let context = EvaluationContext::default().with_targeting_key("user-123");
//!
//! // Evaluation failures are logged and the default comes back.
//! let enabled = client.bool_variation("test-lpl", &context, false).await;
//! println!("test-lpl = {enabled}");
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hook;

pub use client::FlagClient;
pub use config::{SDK_KEY_ENV, SdkKey};
pub use error::HookError;
pub use hook::{
    EvaluationHook, EvaluationOutcome, HookContext, error_code_label, reason_label, value_label,
};
