//! SDK key handling for the wrapped flag backend.
//!
//! The key is a secret: it never appears in `Debug` or `Display` output,
//! and placeholder values are rejected outright instead of being passed
//! through to the backend.

use std::env;
use std::fmt;

use crate::error::HookError;

/// Environment variable holding the flag backend SDK key.
pub const SDK_KEY_ENV: &str = "LAUNCHDARKLY_SDK_KEY";

/// Placeholder commonly left behind by copy-pasted setup snippets.
const PLACEHOLDER_KEY: &str = "YOUR_SDK_KEY";

/// A validated SDK key.
///
/// Construction fails closed: an unset variable, an empty string, or the
/// well-known placeholder is a configuration error, never a value that is
/// silently sent to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct SdkKey(String);

impl SdkKey {
    /// Validates and wraps an SDK key.
    ///
    /// # Errors
    ///
    /// Returns `HookError::Config` if the key is empty or the placeholder.
    pub fn new(key: impl Into<String>) -> Result<Self, HookError> {
        let key = key.into();
        if key.is_empty() {
            return Err(HookError::Config("SDK key cannot be empty".to_string()));
        }
        if key == PLACEHOLDER_KEY {
            return Err(HookError::Config(format!(
                "SDK key is the placeholder '{PLACEHOLDER_KEY}'; set {SDK_KEY_ENV} to a real key"
            )));
        }
        Ok(Self(key))
    }

    /// Reads the key from [`SDK_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns `HookError::Config` if the variable is unset or fails
    /// [`SdkKey::new`] validation.
    pub fn from_env() -> Result<Self, HookError> {
        match env::var(SDK_KEY_ENV) {
            Ok(value) => Self::new(value),
            Err(_) => Err(HookError::Config(format!("{SDK_KEY_ENV} is not set"))),
        }
    }

    /// Returns the raw key for handing to the flag backend.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SdkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SdkKey").field(&"<redacted>").finish()
    }
}

impl fmt::Display for SdkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted>")
    }
}
