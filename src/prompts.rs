//! Prompts and context assembly for the summarisation request.
//!
//! Every string sent to the model is defined here so that tests can inspect
//! it without a provider. Callers can override the system prompt via
//! [`crate::config::SummaryConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a precise assistant. Use only the transcript. Return ONLY markdown bullets, one per line, no intro/outro.";

/// User message template. `{context}` is replaced with the joined windows.
pub const USER_PROMPT_TEMPLATE: &str =
    "Summarize the transcript into 6–12 concise bullets (≤ ~20 words each).\n\nTranscript:\n{context}\n";

/// Placed between windows when they are joined into one context string.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join the first `max_chunks` windows with [`CONTEXT_SEPARATOR`].
pub fn build_context<S: AsRef<str>>(chunks: &[S], max_chunks: usize) -> String {
    chunks
        .iter()
        .take(max_chunks)
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Render the user message for a context string.
pub fn render_user_prompt(context: &str) -> String {
    USER_PROMPT_TEMPLATE.replace("{context}", context)
}
