//! Error types for the bullet-summary library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`RenderError`]: the document renderer could not represent the
//!   content it was given (a character the embedded font has no glyph for,
//!   a control character). Never retried automatically. The summarisation
//!   entry points keep the bullets and carry this error in
//!   [`crate::SummaryOutput::render_error`].
//!
//! * [`SummaryError`]: **Fatal** for one end-to-end request: empty input,
//!   bad configuration, provider not configured, model call exhausted its
//!   retries, or the PDF could not be written.
//!
//! Bullet normalisation has no error type at all: it is total over every
//! input string.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// The renderer could not turn the given title or bullets into a document.
///
/// No partial output accompanies this error: rendering either produces a
/// complete document or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Cannot render document: {reason}")]
pub struct RenderError {
    pub reason: String,
}

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// All fatal errors returned by the summarisation pipeline.
#[derive(Debug, Error)]
pub enum SummaryError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The transcript is empty or whitespace only.
    #[error("Input text is empty.\nPaste or pipe some transcript text first.")]
    EmptyInput,

    /// The transcript file could not be read.
    #[error("Failed to read input '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider could not be created (missing key, unknown name).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The summarisation call failed on every attempt.
    #[error("LLM call failed after {retries} retries: {detail}")]
    LlmFailed { retries: u32, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The bullet list could not be rendered to a document.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
