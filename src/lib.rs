//! # bullet-summary
//!
//! Turn a transcript (or a model's free-form answer) into a clean,
//! de-duplicated bullet list and a paginated PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! transcript
//!  │
//!  ├─ 1. Chunk      recursive character windows with overlap
//!  ├─ 2. Context    first N windows joined with "---"
//!  ├─ 3. LLM        one summarisation call (Ollama by default), retried
//!  ├─ 4. Normalize  markers stripped, whitespace collapsed, duplicates dropped
//!  └─ 5. Render     title + hanging-indent bullets → PDF bytes
//! ```
//!
//! Stages 4 and 5 are pure and usable on their own: [`BulletNormalizer`]
//! accepts any bullet-like text and [`DocumentRenderer`] accepts any list of
//! strings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bullet_summary::{summarize, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Local Ollama with llama3.2:3b unless EDGEQUAKE_LLM_PROVIDER is set
//!     let config = SummaryConfig::default();
//!     let transcript = std::fs::read_to_string("meeting.txt")?;
//!     let output = summarize(&transcript, &config).await?;
//!     println!("{}", output.markdown);
//!     if let Some(doc) = output.document {
//!         std::fs::write("summary.pdf", doc.as_bytes())?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Without a model:
//!
//! ```rust
//! use bullet_summary::{BulletNormalizer, DocumentRenderer, NormalizeStrategy};
//!
//! let bullets = BulletNormalizer::new(NormalizeStrategy::LineMarker)
//!     .normalize("1. First\n2) Second\n3. First");
//! assert_eq!(bullets.as_slice(), ["First", "Second"]);
//!
//! let doc = DocumentRenderer::default()
//!     .render("Bullet Summary", bullets.as_slice())
//!     .unwrap();
//! assert!(doc.as_bytes().starts_with(b"%PDF-"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bullets` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! bullet-summary = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BulletStyle, DocumentStyle, Margins, PageSize, SummaryConfig, SummaryConfigBuilder, TitleStyle,
};
pub use error::{RenderError, SummaryError};
pub use output::{SummaryOutput, SummaryStats};
pub use pipeline::chunk::TextChunker;
pub use pipeline::normalize::{
    normalize_line_markers, split_glyph_bullets, BulletList, BulletNormalizer, NormalizeStrategy,
};
pub use pipeline::render::{DocumentRenderer, PreparedDocument, RenderedDocument};
pub use progress::{NoopProgressCallback, ProgressCallback, SummaryProgressCallback};
pub use summarize::{
    bullets_from_response, prepare_context, summarize, summarize_sync, summarize_to_file,
    write_document, PreparedContext,
};
