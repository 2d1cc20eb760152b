//! CLI binary for bullet-summary.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig` and prints results.

use anyhow::{Context, Result};
use bullet_summary::{
    bullets_from_response, summarize, write_document, DocumentStyle, NormalizeStrategy,
    ProgressCallback, SummaryConfig, SummaryOutput, SummaryProgressCallback,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

/// Characters of transcript shown by `--preview`.
const PREVIEW_CHARS: usize = 1000;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that follows the pipeline stages.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Splitting transcript…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SummaryProgressCallback for CliProgressCallback {
    fn on_chunked(&self, total_chunks: usize, used_chunks: usize) {
        self.bar
            .set_message(format!("{used_chunks}/{total_chunks} chunk(s) in context"));
    }

    fn on_llm_start(&self, model: &str) {
        self.bar.set_prefix("Summarizing");
        self.bar.set_message(format!("asking {model}…"));
    }

    fn on_llm_retry(&self, attempt: u32, max_retries: u32, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} retry {attempt}/{max_retries}  {}",
            yellow("↻"),
            red(&msg)
        ));
    }

    fn on_llm_complete(&self, response_len: usize) {
        self.bar.set_prefix("Rendering");
        self.bar
            .set_message(format!("{} chars received", response_len));
    }

    fn on_rendered(&self, pages: usize, bytes: usize) {
        self.bar.println(format!(
            "  {} PDF  {}  {}",
            green("✓"),
            dim(&format!("{pages} page(s)")),
            dim(&format!("{bytes} bytes")),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a transcript with local Ollama (llama3.2:3b), bullets on stdout
  bullets meeting.txt

  # Also write the PDF
  bullets meeting.txt -o summary.pdf

  # Read from stdin, use a hosted model
  cat meeting.txt | bullets --provider openai --model gpt-4.1-nano

  # Skip the model: the input already is a bullet list or a model answer
  bullets --from-response notes.md -o summary.pdf

  # Bullets separated by • on one line
  bullets --from-response --strategy glyph-split notes.txt

  # JSON output with stats
  bullets --json meeting.txt > summary.json

ENVIRONMENT VARIABLES:
  EDGEQUAKE_LLM_PROVIDER  Provider used when --provider is not given (with EDGEQUAKE_MODEL)
  EDGEQUAKE_MODEL         Model ID
  OLLAMA_HOST             Ollama server (default http://localhost:11434)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  BULLETS_*               Any long flag, e.g. BULLETS_CHUNK_SIZE=1200

SETUP:
  1. Start Ollama:    ollama pull llama3.2:3b && ollama serve
  2. Summarise:       bullets meeting.txt -o summary.pdf
"#;

/// Summarise transcripts into bullet points and a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "bullets",
    version,
    about = "Summarise transcripts into bullet points and a PDF",
    long_about = "Split a transcript into overlapping windows, ask an LLM for 6–12 concise \
bullets, clean and de-duplicate the answer, and render it as a paginated PDF. Runs against a \
local Ollama model by default; any provider supported by edgequake-llm works.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Transcript file. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write the PDF to this file.
    #[arg(short, long, env = "BULLETS_OUTPUT")]
    output: Option<PathBuf>,

    /// Treat the input as a model response: normalise and render only.
    #[arg(long, env = "BULLETS_FROM_RESPONSE")]
    from_response: bool,

    /// Bullet extraction strategy.
    #[arg(long, env = "BULLETS_STRATEGY", value_enum, default_value = "line-marker")]
    strategy: StrategyArg,

    /// LLM model ID (e.g. llama3.2:3b, gpt-4.1-nano).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: ollama, openai, anthropic, gemini, …
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Window size in characters (500–3000).
    #[arg(long, env = "BULLETS_CHUNK_SIZE", default_value_t = 1500,
          value_parser = clap::value_parser!(u32).range(500..=3000))]
    chunk_size: u32,

    /// Characters shared by consecutive windows (0–500).
    #[arg(long, env = "BULLETS_CHUNK_OVERLAP", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(0..=500))]
    chunk_overlap: u32,

    /// Windows sent as context (1–12).
    #[arg(long, env = "BULLETS_MAX_CHUNKS", default_value_t = 6,
          value_parser = clap::value_parser!(u32).range(1..=12))]
    max_chunks: u32,

    /// LLM temperature (0.0–1.0).
    #[arg(long, env = "BULLETS_TEMPERATURE", default_value_t = 0.1,
          value_parser = parse_temperature)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "BULLETS_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Retries on LLM failure (0–10).
    #[arg(long, env = "BULLETS_MAX_RETRIES", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(0..=10))]
    max_retries: u32,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "BULLETS_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Document title.
    #[arg(long, env = "BULLETS_TITLE", default_value = "Bullet Summary")]
    title: String,

    /// Render characters the PDF fonts cannot show as this character.
    #[arg(long, env = "BULLETS_REPLACE_UNSUPPORTED")]
    replace_unsupported: Option<char>,

    /// Print the first 1000 characters of the transcript before summarising.
    #[arg(long)]
    preview: bool,

    /// Output structured JSON (SummaryOutput) instead of Markdown.
    #[arg(long, env = "BULLETS_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "BULLETS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BULLETS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BULLETS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    LineMarker,
    GlyphSplit,
}

impl From<StrategyArg> for NormalizeStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::LineMarker => NormalizeStrategy::LineMarker,
            StrategyArg::GlyphSplit => NormalizeStrategy::GlyphSplit,
        }
    }
}

fn parse_temperature(s: &str) -> Result<f32, String> {
    let t: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&t) {
        Ok(t)
    } else {
        Err(format!("{t} is not in 0.0..=1.0"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Read input ───────────────────────────────────────────────────────
    let text = read_input(cli.input.as_ref()).await?;
    if text.trim().is_empty() {
        eprintln!("{} Please paste a transcript first.", yellow("⚠"));
        std::process::exit(2);
    }

    if cli.preview && !cli.quiet {
        eprintln!("{}", bold("Preview"));
        eprintln!("{}", dim(&preview(&text)));
    }

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = if show_progress && !cli.from_response {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let progress_cb = spinner
        .as_ref()
        .map(|cb| Arc::clone(cb) as ProgressCallback);

    let config = build_config(&cli, progress_cb).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = if cli.from_response {
        Ok(bullets_from_response(&text, &config))
    } else {
        summarize(&text, &config).await.context("Summary failed")
    };
    if let Some(ref cb) = spinner {
        cb.finish();
    }
    let output = result?;

    // Bullets go to stdout even when the PDF could not be rendered.
    print_output(&cli, &output)?;

    if !cli.quiet && !cli.json {
        print_summary(&cli, &output);
    }

    if let Some(ref output_path) = cli.output {
        match (&output.document, &output.render_error) {
            (Some(document), _) => {
                write_document(document, output_path)
                    .await
                    .context("Failed to write PDF")?;
            }
            (None, Some(err)) => {
                return Err(err.clone())
                    .with_context(|| format!("{} not written", output_path.display()));
            }
            (None, None) => {
                if !cli.quiet {
                    eprintln!(
                        "{} No bullets found; {} not written",
                        yellow("⚠"),
                        output_path.display()
                    );
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .chunk_size(cli.chunk_size as usize)
        .chunk_overlap(cli.chunk_overlap as usize)
        .max_chunks(cli.max_chunks as usize)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .strategy(cli.strategy.into())
        .title(cli.title.clone())
        .document_style(DocumentStyle {
            replacement: cli.replace_unsupported,
            ..DocumentStyle::default()
        });

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Read the transcript from a file, or stdin for `None` / `-`.
async fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("Failed to read transcript from {:?}", p)),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read transcript from stdin")?;
            Ok(text)
        }
    }
}

fn preview(text: &str) -> String {
    let mut shown: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        shown.push('…');
    }
    shown
}

fn print_output(cli: &Cli, output: &SummaryOutput) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let json = serde_json::to_string_pretty(output).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else {
        handle
            .write_all(output.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure a trailing newline on stdout.
        if !output.markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }
    Ok(())
}

fn print_summary(cli: &Cli, output: &SummaryOutput) {
    let stats = &output.stats;
    if output.is_fallback() {
        eprintln!("{} No bullets found; showing the raw response", yellow("⚠"));
    }
    if let Some(ref err) = output.render_error {
        eprintln!("{} PDF not rendered: {}", yellow("⚠"), err.reason);
    }
    if cli.from_response {
        eprintln!("{} {} bullet(s)", green("✔"), bold(&stats.bullet_count.to_string()));
    } else {
        eprintln!("{} {}", green("✔"), output.usage_line());
        eprintln!(
            "   {} tokens in  /  {} tokens out  —  {}ms total",
            dim(&stats.input_tokens.to_string()),
            dim(&stats.output_tokens.to_string()),
            stats.total_duration_ms,
        );
    }
    if let (Some(path), Some(_)) = (cli.output.as_ref(), output.document.as_ref()) {
        eprintln!(
            "   {} page(s)  →  {}",
            stats.page_count,
            bold(&path.display().to_string())
        );
    }
}
