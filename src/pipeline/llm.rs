//! Model interaction: send the context and return the raw response.
//!
//! All prompt text lives in [`crate::prompts`]; this module only assembles
//! the messages, applies the sampling options and retries transient failures.
//!
//! ## Retry Strategy
//!
//! Local Ollama servers answer 503 while a model is still loading, and hosted
//! APIs answer 429 under load. Failed attempts are retried with exponential
//! backoff (`retry_backoff_ms * 2^(attempt-1)`): with the defaults (500 ms,
//! 2 retries) the waits are 500 ms then 1 s.

use crate::config::SummaryConfig;
use crate::error::SummaryError;
use crate::prompts::{render_user_prompt, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// The model's answer plus accounting for one request.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Free-form response text, not yet normalised.
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
    /// Attempts beyond the first that were needed.
    pub retries: u32,
}

/// Build the two-message conversation for a context string.
pub fn build_messages(context: &str, config: &SummaryConfig) -> Vec<ChatMessage> {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(render_user_prompt(context)),
    ]
}

/// Ask the model to summarise `context` into bullets.
///
/// Returns the raw text on the first successful attempt. After
/// `config.max_retries` failed retries the last provider error is returned
/// as [`SummaryError::LlmFailed`].
pub async fn request_bullets(
    provider: &Arc<dyn LLMProvider>,
    context: &str,
    config: &SummaryConfig,
) -> Result<LlmResponse, SummaryError> {
    let start = Instant::now();
    let messages = build_messages(context, config);
    let options = build_options(config);

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = retry_backoff(config.retry_backoff_ms, attempt);
            warn!(
                "Summary request: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_llm_retry(
                    attempt,
                    config.max_retries,
                    last_err.as_deref().unwrap_or("unknown error"),
                );
            }
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                let duration = start.elapsed();
                debug!(
                    "Summary request: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens, response.completion_tokens, duration
                );
                return Ok(LlmResponse {
                    content: response.content,
                    input_tokens: response.prompt_tokens as u64,
                    output_tokens: response.completion_tokens as u64,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt,
                });
            }
            Err(e) => {
                let err_msg = format!("{}", e);
                warn!("Summary request: attempt {} failed: {}", attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
        }
    }

    Err(SummaryError::LlmFailed {
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Delay before retry `attempt` (1-based): `base_ms * 2^(attempt-1)`,
/// saturating instead of overflowing.
fn retry_backoff(base_ms: u64, attempt: u32) -> u64 {
    2u64.checked_pow(attempt.saturating_sub(1))
        .map_or(u64::MAX, |factor| base_ms.saturating_mul(factor))
}

/// Build `CompletionOptions` from the summary config.
fn build_options(config: &SummaryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = SummaryConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(1024));
    }

    #[test]
    fn build_options_follow_builder() {
        let config = SummaryConfig::builder()
            .temperature(0.7)
            .max_tokens(512)
            .build()
            .unwrap();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.max_tokens, Some(512));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(retry_backoff(500, 1), 500);
        assert_eq!(retry_backoff(500, 2), 1000);
        assert_eq!(retry_backoff(500, 4), 4000);
    }

    #[test]
    fn backoff_saturates_on_large_attempts() {
        assert_eq!(retry_backoff(500, 60), u64::MAX);
        assert_eq!(retry_backoff(500, u32::MAX), u64::MAX);
        assert_eq!(retry_backoff(0, 60), 0);
    }

    #[test]
    fn messages_use_default_prompt() {
        let config = SummaryConfig::default();
        let messages = build_messages("Q3 revenue grew.", &config);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert!(messages[1].content.contains("Transcript:\nQ3 revenue grew."));
    }

    #[test]
    fn messages_honour_prompt_override() {
        let config = SummaryConfig::builder()
            .system_prompt("Answer in French.")
            .build()
            .unwrap();
        let messages = build_messages("x", &config);
        assert_eq!(messages[0].content, "Answer in French.");
    }
}
