//! Progress-callback trait for summarisation stage events.
//!
//! Inject an [`Arc<dyn SummaryProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to hear about
//! each stage as the pipeline runs: chunking, the model call (and its
//! retries), and rendering. The binary uses it to drive a spinner; a server
//! could forward the same events to a websocket.
//!
//! # Example
//!
//! ```rust
//! use bullet_summary::{SummaryConfig, SummaryProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct RetryCounter {
//!     retries: AtomicUsize,
//! }
//!
//! impl SummaryProgressCallback for RetryCounter {
//!     fn on_llm_retry(&self, attempt: u32, max_retries: u32, error: &str) {
//!         self.retries.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("retry {attempt}/{max_retries}: {error}");
//!     }
//! }
//!
//! let config = SummaryConfig::builder()
//!     .progress_callback(Arc::new(RetryCounter { retries: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the summarisation pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called once the transcript has been split into windows.
    ///
    /// # Arguments
    /// * `total_chunks`: windows produced by the chunker
    /// * `used_chunks`: windows that go into the prompt context
    fn on_chunked(&self, total_chunks: usize, used_chunks: usize) {
        let _ = (total_chunks, used_chunks);
    }

    /// Called just before the model request is sent.
    fn on_llm_start(&self, model: &str) {
        let _ = model;
    }

    /// Called before each retry of a failed model request.
    fn on_llm_retry(&self, attempt: u32, max_retries: u32, error: &str) {
        let _ = (attempt, max_retries, error);
    }

    /// Called when the model answered.
    fn on_llm_complete(&self, response_len: usize) {
        let _ = response_len;
    }

    /// Called after the PDF was rendered.
    fn on_rendered(&self, pages: usize, bytes: usize) {
        let _ = (pages, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;
