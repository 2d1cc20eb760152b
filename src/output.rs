//! Result types returned by the summarisation entry points.

use crate::error::RenderError;
use crate::pipeline::normalize::BulletList;
use crate::pipeline::render::RenderedDocument;
use serde::Serialize;

/// Everything one summarisation request produced.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutput {
    /// Normalised bullets, possibly empty.
    pub bullets: BulletList,

    /// Display text: one `- bullet` per line, or the raw response verbatim
    /// when no bullet could be extracted.
    pub markdown: String,

    /// The model's answer before normalisation.
    pub raw_response: String,

    /// The rendered PDF. `None` when the bullet list is empty or could not
    /// be rendered.
    #[serde(skip)]
    pub document: Option<RenderedDocument>,

    /// Why the bullets have no document, when rendering failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<RenderError>,

    pub stats: SummaryStats,
}

impl SummaryOutput {
    /// Whether the markdown is the raw-response fallback.
    pub fn is_fallback(&self) -> bool {
        self.bullets.is_empty()
    }

    /// The "Used N chunk(s) out of M." status line.
    pub fn usage_line(&self) -> String {
        format!(
            "Used {} chunk(s) out of {}.",
            self.stats.used_chunks, self.stats.total_chunks
        )
    }
}

/// Counters and timings for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    /// Windows produced by the chunker.
    pub total_chunks: usize,
    /// Windows joined into the prompt context.
    pub used_chunks: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub llm_retries: u32,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
    pub bullet_count: usize,
    /// Zero when no document was rendered.
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(bullets: &[&str]) -> SummaryOutput {
        let bullets: BulletList = bullets.iter().copied().collect();
        SummaryOutput {
            markdown: bullets.to_markdown(),
            bullets,
            raw_response: String::new(),
            document: None,
            render_error: None,
            stats: SummaryStats {
                total_chunks: 9,
                used_chunks: 6,
                ..Default::default()
            },
        }
    }

    #[test]
    fn usage_line_matches_status_text() {
        assert_eq!(output(&["a"]).usage_line(), "Used 6 chunk(s) out of 9.");
    }

    #[test]
    fn fallback_when_no_bullets() {
        assert!(output(&[]).is_fallback());
        assert!(!output(&["a"]).is_fallback());
    }

    #[test]
    fn serialises_bullets_as_array() {
        let json = serde_json::to_value(output(&["One", "Two"])).unwrap();
        assert_eq!(json["bullets"], serde_json::json!(["One", "Two"]));
        assert_eq!(json["stats"]["used_chunks"], 6);
        assert!(json.get("document").is_none());
        assert!(json.get("render_error").is_none());
    }

    #[test]
    fn serialises_render_error_reason() {
        let mut out = output(&["Launch 🚀"]);
        out.render_error = Some(RenderError::new("no glyph"));
        let json = serde_json::to_value(out).unwrap();
        assert_eq!(json["render_error"]["reason"], "no glyph");
        assert_eq!(json["bullets"], serde_json::json!(["Launch 🚀"]));
    }
}
