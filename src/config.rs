//! Configuration types for transcript summarisation and PDF rendering.
//!
//! Every knob of a request lives in [`SummaryConfig`], built through
//! [`SummaryConfigBuilder`] once per request and passed to the pipeline. The
//! pipeline never reads ambient state: chunk sizes, model settings, the
//! normalisation strategy and the page geometry all arrive through here.
//!
//! Document geometry is grouped in [`DocumentStyle`]. Its defaults are
//! constants reproducing a US Letter page with 0.75 in margins, an 18 pt bold
//! centred title and 10 pt bullets.

use crate::error::SummaryError;
use crate::pipeline::normalize::NormalizeStrategy;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Provider used when neither the config nor the environment names one.
pub const DEFAULT_PROVIDER: &str = "ollama";

/// Upper bound on retries of the model call.
pub const MAX_RETRIES: u32 = 10;

/// Title rendered at the top of the first page.
pub const DEFAULT_TITLE: &str = "Bullet Summary";

/// Configuration for one summarisation request.
///
/// # Example
/// ```rust
/// use bullet_summary::{NormalizeStrategy, SummaryConfig};
///
/// let config = SummaryConfig::builder()
///     .chunk_size(1200)
///     .chunk_overlap(100)
///     .max_chunks(4)
///     .strategy(NormalizeStrategy::GlyphSplit)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_chunks, 4);
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Target window size in characters. Range: 500–3000. Default: 1500.
    pub chunk_size: usize,

    /// Characters shared by consecutive windows. Range: 0–500. Default: 150.
    ///
    /// Must stay below `chunk_size`.
    pub chunk_overlap: usize,

    /// How many leading windows go into the prompt context. Range: 1–12. Default: 6.
    ///
    /// Windows past this count are dropped: small local models have short
    /// context lengths and a transcript's opening usually carries its agenda.
    pub max_chunks: usize,

    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "ollama", "openai", "anthropic").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Range: 0.0–1.0. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    pub max_tokens: usize,

    /// Retry attempts on a failed model call. Range: 0–10. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Custom system prompt. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Bullet extraction strategy. Default: [`NormalizeStrategy::LineMarker`].
    pub strategy: NormalizeStrategy,

    /// Document title. Default: [`DEFAULT_TITLE`].
    pub title: String,

    /// Page geometry and text styles of the rendered document.
    pub document_style: DocumentStyle,

    /// Optional progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 150,
            max_chunks: 6,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 1024,
            max_retries: 2,
            retry_backoff_ms: 500,
            system_prompt: None,
            strategy: NormalizeStrategy::default(),
            title: DEFAULT_TITLE.to_string(),
            document_style: DocumentStyle::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("max_chunks", &self.max_chunks)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("strategy", &self.strategy)
            .field("title", &self.title)
            .field("document_style", &self.document_style)
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will be requested.
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n.clamp(500, 3000);
        self
    }

    pub fn chunk_overlap(mut self, n: usize) -> Self {
        self.config.chunk_overlap = n.min(500);
        self
    }

    pub fn max_chunks(mut self, n: usize) -> Self {
        self.config.max_chunks = n.clamp(1, 12);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(MAX_RETRIES);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn strategy(mut self, strategy: NormalizeStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn document_style(mut self, style: DocumentStyle) -> Self {
        self.config.document_style = style;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SummaryError> {
        let c = &self.config;
        if c.chunk_overlap >= c.chunk_size {
            return Err(SummaryError::InvalidConfig(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.max_retries > MAX_RETRIES {
            return Err(SummaryError::InvalidConfig(format!(
                "max_retries ({}) must be at most {}",
                c.max_retries, MAX_RETRIES
            )));
        }
        if c.max_tokens == 0 {
            return Err(SummaryError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        c.document_style.validate()?;
        Ok(self.config)
    }
}

// ── Document geometry ────────────────────────────────────────────────────────

/// Page dimensions in PDF points (1/72 in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(pt: f32) -> Self {
        Self {
            top: pt,
            right: pt,
            bottom: pt,
            left: pt,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(54.0)
    }
}

/// Style of the title paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TitleStyle {
    pub font_size: u8,
    /// Gap between the title and the first bullet, in points.
    pub space_after: f32,
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            font_size: 18,
            space_after: 18.0,
        }
    }
}

/// Style of each bullet paragraph.
///
/// Wrapped lines of a bullet align under its text, not under the glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletStyle {
    pub glyph: char,
    pub font_size: u8,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    pub space_before: f32,
    pub space_after: f32,
}

impl Default for BulletStyle {
    fn default() -> Self {
        Self {
            glyph: '•',
            font_size: 10,
            line_spacing: 1.4,
            space_before: 2.0,
            space_after: 2.0,
        }
    }
}

/// Everything the renderer needs to place text on pages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentStyle {
    pub page_size: PageSize,
    pub margins: Margins,
    pub title: TitleStyle,
    pub bullet: BulletStyle,
    /// Substitute for characters the embedded font has no glyph for.
    /// `None` makes such characters a render error.
    pub replacement: Option<char>,
}

impl DocumentStyle {
    /// Width available to text between the left and right margins.
    pub fn frame_width(&self) -> f32 {
        self.page_size.width - self.margins.left - self.margins.right
    }

    /// Height available to text between the top and bottom margins.
    pub fn frame_height(&self) -> f32 {
        self.page_size.height - self.margins.top - self.margins.bottom
    }

    pub fn validate(&self) -> Result<(), SummaryError> {
        let b = &self.bullet;
        // A line of the largest font must fit in the frame.
        let tallest = f32::from(b.font_size.max(self.title.font_size)) * b.line_spacing.max(1.0);
        if self.frame_width() <= tallest || self.frame_height() <= tallest {
            return Err(SummaryError::InvalidConfig(format!(
                "Margins leave no room for text on a {}×{} pt page",
                self.page_size.width, self.page_size.height
            )));
        }
        if b.font_size == 0 || self.title.font_size == 0 {
            return Err(SummaryError::InvalidConfig("Font sizes must be positive".into()));
        }
        if b.line_spacing < 1.0 {
            return Err(SummaryError::InvalidConfig(
                "Line spacing must be at least 1.0".into(),
            ));
        }
        if b.space_before < 0.0 || b.space_after < 0.0 || self.title.space_after < 0.0 {
            return Err(SummaryError::InvalidConfig("Spacing must not be negative".into()));
        }
        Ok(())
    }
}
