//! End-to-end summarisation entry points.
//!
//! [`summarize`] runs the whole pipeline: chunk the transcript, join the
//! leading windows into a context, ask the model for bullets, normalise the
//! answer and render the PDF. [`bullets_from_response`] is the tail of that
//! pipeline on its own, for callers that already hold a model response (or
//! any bullet-like text) and need no provider at all.

use crate::config::{SummaryConfig, DEFAULT_PROVIDER};
use crate::error::SummaryError;
use crate::output::{SummaryOutput, SummaryStats};
use crate::pipeline::chunk::TextChunker;
use crate::pipeline::llm;
use crate::pipeline::normalize::BulletNormalizer;
use crate::pipeline::render::{DocumentRenderer, RenderedDocument};
use crate::prompts::build_context;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The context string sent to the model and how it was assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedContext {
    /// Windows produced by the chunker.
    pub total_chunks: usize,
    /// Windows joined into `context`.
    pub used_chunks: usize,
    pub context: String,
}

/// Summarise a transcript into bullets and a PDF.
///
/// # Errors
/// - [`SummaryError::EmptyInput`] for empty or whitespace-only text
/// - [`SummaryError::ProviderNotConfigured`] when no provider can be built
/// - [`SummaryError::LlmFailed`] when every attempt failed
///
/// An answer with no extractable bullet is not an error: the output then
/// carries the raw response as its markdown and no document. Neither is a
/// bullet the PDF cannot show: the bullets are kept and the failure is in
/// [`SummaryOutput::render_error`].
///
/// # Example
/// ```rust,no_run
/// use bullet_summary::{summarize, SummaryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transcript = std::fs::read_to_string("meeting.txt")?;
/// let output = summarize(&transcript, &SummaryConfig::default()).await?;
/// println!("{}", output.markdown);
/// eprintln!("{}", output.usage_line());
/// # Ok(())
/// # }
/// ```
pub async fn summarize(
    text: impl AsRef<str>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let total_start = Instant::now();
    let text = text.as_ref();
    info!("Starting summary of {} chars", text.chars().count());

    // ── Step 1: Chunk and build the context ──────────────────────────────
    let prepared = prepare_context(text, config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_chunked(prepared.total_chunks, prepared.used_chunks);
    }

    // ── Step 2: Get/create provider ──────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 3: Ask the model ────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_llm_start(config.model_name());
    }
    let response = llm::request_bullets(&provider, &prepared.context, config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_llm_complete(response.content.len());
    }

    // ── Step 4: Normalise and render ─────────────────────────────────────
    let mut output = bullets_from_response(&response.content, config);
    output.stats = SummaryStats {
        total_chunks: prepared.total_chunks,
        used_chunks: prepared.used_chunks,
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        llm_retries: response.retries,
        llm_duration_ms: response.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        ..output.stats
    };

    info!(
        "Summary complete: {} bullets from {}/{} chunks, {}ms total",
        output.stats.bullet_count,
        output.stats.used_chunks,
        output.stats.total_chunks,
        output.stats.total_duration_ms
    );

    Ok(output)
}

/// Summarise and write the PDF to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files. When the
/// answer held no bullets, or they could not be rendered, nothing is written;
/// check [`SummaryOutput::document`] and [`SummaryOutput::render_error`].
pub async fn summarize_to_file(
    text: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let output = summarize(text, config).await?;
    match output.document {
        Some(ref document) => write_document(document, output_path).await?,
        None => warn!(
            "No document rendered; not writing {}",
            output_path.as_ref().display()
        ),
    }
    Ok(output)
}

/// Synchronous wrapper around [`summarize`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    text: impl AsRef<str>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummaryError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize(text, config))
}

/// Normalise a model response and render it, without calling any model.
///
/// Never fails. With no bullets the markdown is the raw response and no
/// document is rendered; when rendering fails the bullets and markdown are
/// still returned, with the cause in [`SummaryOutput::render_error`]. The
/// chunk and token counters in the returned stats are zero.
pub fn bullets_from_response(raw: &str, config: &SummaryConfig) -> SummaryOutput {
    let bullets = BulletNormalizer::new(config.strategy).normalize(raw);

    let (markdown, rendered) = if bullets.is_empty() {
        warn!("No bullets found in response; showing it verbatim");
        (raw.to_string(), Ok(None))
    } else {
        let renderer = DocumentRenderer::new(config.document_style);
        let rendered = renderer.render(&config.title, bullets.as_slice()).map(Some);
        (bullets.to_markdown(), rendered)
    };

    let (document, render_error) = match rendered {
        Ok(document) => (document, None),
        Err(e) => {
            warn!("{}; keeping {} bullets without a document", e, bullets.len());
            (None, Some(e))
        }
    };
    if let (Some(document), Some(cb)) = (&document, &config.progress_callback) {
        cb.on_rendered(document.page_count(), document.len());
    }

    let stats = SummaryStats {
        bullet_count: bullets.len(),
        page_count: document.as_ref().map_or(0, RenderedDocument::page_count),
        ..Default::default()
    };

    SummaryOutput {
        bullets,
        markdown,
        raw_response: raw.to_string(),
        document,
        render_error,
        stats,
    }
}

/// Chunk `text` and join the leading windows into the prompt context.
pub fn prepare_context(text: &str, config: &SummaryConfig) -> Result<PreparedContext, SummaryError> {
    if text.trim().is_empty() {
        return Err(SummaryError::EmptyInput);
    }
    let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
    let chunks = chunker.split(text);
    let used_chunks = chunks.len().min(config.max_chunks);
    debug!(
        "Using {} of {} chunks (max {})",
        used_chunks,
        chunks.len(),
        config.max_chunks
    );
    Ok(PreparedContext {
        total_chunks: chunks.len(),
        used_chunks,
        context: build_context(&chunks, config.max_chunks),
    })
}

/// Write a rendered document atomically, creating parent directories.
pub async fn write_document(
    document: &RenderedDocument,
    path: impl AsRef<Path>,
) -> Result<(), SummaryError> {
    let path = path.as_ref();
    let write_err = |e: std::io::Error| SummaryError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, document.as_bytes())
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!("Wrote {} bytes to {}", document.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SummaryError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SummaryError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with the configured model.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    honoured only when both are set and non-empty.
/// 4. **Local Ollama** with the configured model (default `llama3.2:3b`).
fn resolve_provider(config: &SummaryConfig) -> Result<Arc<dyn LLMProvider>, SummaryError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.model_name());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    debug!("No provider configured; using {} with {}", DEFAULT_PROVIDER, config.model_name());
    create_provider(DEFAULT_PROVIDER, config.model_name())
}
