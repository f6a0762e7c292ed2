//! Error classification for the dispatcher
//!
//! Invalid invocation syntax (argument counts, flag parsing) is wrapped in
//! [`UsageError`] so the top-level runner can decide to print usage text.
//! Everything a command's own `run` returns passes through untouched.

use thiserror::Error;

/// An error caused by invalid invocation syntax rather than a runtime
/// failure. Carries the original message and unwraps to the underlying
/// cause when there is one.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UsageError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Converts a flag-parsing failure into a usage error, keeping the
    /// parser's error as the cause. clap renders multi-line reports; only
    /// the first line carries the actual complaint.
    pub fn from_clap(err: clap::Error) -> Self {
        let first = err.to_string();
        let first = first.lines().next().unwrap_or("invalid arguments");
        let message = first.trim_start_matches("error: ").to_string();
        Self::with_source(message, Box::new(err))
    }
}

/// True when `err` is, or was caused by, a [`UsageError`].
pub fn is_usage_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<UsageError>())
}
