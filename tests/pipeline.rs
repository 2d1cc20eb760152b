//! Integration tests for the model-free part of the pipeline.
//!
//! Everything here runs offline: normalisation, rendering, chunking, context
//! assembly and the response-to-PDF path. The model call itself needs a live
//! provider and is not exercised.

use bullet_summary::{
    bullets_from_response, normalize_line_markers, prepare_context, split_glyph_bullets,
    summarize, write_document, BulletNormalizer, DocumentRenderer, DocumentStyle,
    NormalizeStrategy, SummaryConfig, SummaryError, SummaryProgressCallback, TextChunker,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Responses shaped like what small local models actually return.
const RESPONSES: &[&str] = &[
    "- Q3 revenue grew 12% year over year\n- Hiring freeze lifted for engineering\n- Launch moved to March",
    "Here are the key points:\n\n* Budget approved\n* Budget approved\n*   Vendor   review next week  ",
    "1. Ship the beta\n2) Collect feedback\n3. Ship the beta\n10. Plan the GA release",
    "• One thing • Another thing • A third thing",
    "– Team agreed on the roadmap\r\n— Risks logged in the tracker\r\n· Follow-up on Friday",
    "Plain prose with no markers at all, just one sentence.",
    "◦ Hollow bullet\n○ Circle bullet\n· Middle dot",
    "",
    "\n\n   \n",
];

fn all_strategies() -> [BulletNormalizer; 2] {
    [
        BulletNormalizer::new(NormalizeStrategy::LineMarker),
        BulletNormalizer::new(NormalizeStrategy::GlyphSplit),
    ]
}

// ── Normalisation properties ────────────────────────────────────────────────

#[test]
fn normalising_twice_changes_nothing() {
    let normalizer = BulletNormalizer::default();
    for raw in RESPONSES {
        let once = normalizer.normalize(raw);
        let twice = normalizer.normalize(&once.as_slice().join("\n"));
        assert_eq!(once.as_slice(), twice.as_slice(), "input: {raw:?}");
    }
}

#[test]
fn content_that_looks_like_a_marker_survives() {
    let bullets = normalize_line_markers("- 3.5% growth in Q3\n- one more hire approved");
    assert_eq!(bullets.as_slice(), ["3.5% growth in Q3", "one more hire approved"]);
}

#[test]
fn only_the_first_marker_is_stripped() {
    let bullets = normalize_line_markers("- - Nested marker\n1. • Numbered then glyph");
    assert_eq!(bullets.as_slice(), ["- Nested marker", "• Numbered then glyph"]);
}

#[test]
fn renormalising_marker_like_content_is_not_stable() {
    // A bullet that itself starts with a marker, or that is a lone line with
    // an inline " - ", changes on a second pass.
    let once = normalize_line_markers("- a - b\n- a - b");
    assert_eq!(once.as_slice(), ["a - b"]);
    let twice = normalize_line_markers(&once.as_slice().join("\n"));
    assert_eq!(twice.as_slice(), ["a", "b"]);

    let once = normalize_line_markers("- one more\n- two more");
    let twice = normalize_line_markers(&once.as_slice().join("\n"));
    assert_eq!(twice.as_slice(), ["ne more", "two more"]);
}

#[test]
fn output_has_no_duplicates() {
    for normalizer in all_strategies() {
        for raw in RESPONSES {
            let bullets = normalizer.normalize(raw);
            let unique: HashSet<&String> = bullets.iter().collect();
            assert_eq!(unique.len(), bullets.len(), "input: {raw:?}");
        }
    }
}

#[test]
fn output_has_no_empty_or_padded_bullets() {
    for normalizer in all_strategies() {
        for raw in RESPONSES {
            for b in &normalizer.normalize(raw) {
                assert!(!b.is_empty(), "input: {raw:?}");
                assert_eq!(b.trim(), b, "input: {raw:?}");
            }
        }
    }
}

#[test]
fn line_marker_output_has_no_leading_marker() {
    let normalizer = BulletNormalizer::new(NormalizeStrategy::LineMarker);
    for raw in RESPONSES {
        for b in &normalizer.normalize(raw) {
            assert!(
                !bullet_summary::pipeline::rules::has_leading_marker(b),
                "{b:?} from {raw:?}"
            );
            assert!(!b.contains("  "), "{b:?} from {raw:?}");
        }
    }
}

#[test]
fn order_follows_first_occurrence() {
    let bullets = normalize_line_markers("- Gamma\n- Alpha\n- Gamma\n- Beta\n- Alpha");
    assert_eq!(bullets.as_slice(), ["Gamma", "Alpha", "Beta"]);
}

#[test]
fn normaliser_is_total() {
    let odd = [
        "", " ", "x", "•", "-", "1.", "1)", "o", "\u{2028}", "\r\n\r\n", "• • •", "----", "12345",
    ];
    for normalizer in all_strategies() {
        for raw in odd {
            let _ = normalizer.normalize(raw);
        }
    }
    assert!(normalize_line_markers("").is_empty());
    assert!(split_glyph_bullets("").is_empty());
}

#[test]
fn documented_examples() {
    assert_eq!(
        normalize_line_markers("• One thing • Another thing").as_slice(),
        ["One thing", "Another thing"]
    );
    assert_eq!(
        normalize_line_markers("1. First\n2) Second\n3. First").as_slice(),
        ["First", "Second"]
    );
    assert_eq!(
        normalize_line_markers("Too    many   spaces").as_slice(),
        ["Too many spaces"]
    );
}

#[test]
fn prose_becomes_one_bullet() {
    let raw = "Plain prose with no markers at all, just one sentence.";
    assert_eq!(normalize_line_markers(raw).as_slice(), [raw]);
}

#[test]
fn every_line_break_kind_splits() {
    let raw = "a1\r\nb2\rc3\u{0B}d4\u{0C}e5\u{1C}f6\u{85}g7\u{2028}h8\u{2029}i9";
    assert_eq!(normalize_line_markers(raw).len(), 9);
}

#[test]
fn glyph_split_keeps_only_marked_lines() {
    let raw = "Here you go:\n- Alpha\n• Beta\n* Gamma\n- Alpha";
    assert_eq!(split_glyph_bullets(raw).as_slice(), ["Alpha", "Beta"]);
}

#[test]
fn glyph_split_falls_back_to_bullet_char() {
    assert_eq!(
        split_glyph_bullets("One • Two •  • Three").as_slice(),
        ["One", "Two", "Three"]
    );
}

#[test]
fn strategies_differ_on_numbered_lists() {
    let raw = "1. First\n2. Second";
    assert_eq!(normalize_line_markers(raw).as_slice(), ["First", "Second"]);
    assert_eq!(split_glyph_bullets(raw).as_slice(), ["1. First\n2. Second"]);
}

// ── Rendering ───────────────────────────────────────────────────────────────

#[test]
fn empty_candidates_are_dropped() {
    let prepared = DocumentRenderer::default()
        .prepare("Bullet Summary", &["", "  ", "Keep this"])
        .unwrap();
    assert_eq!(prepared.blocks, ["Keep this"]);
}

#[test]
fn renderer_keeps_order_and_duplicates() {
    let prepared = DocumentRenderer::default()
        .prepare("T", &["- Beta", "Alpha", "Beta"])
        .unwrap();
    assert_eq!(prepared.blocks, ["Beta", "Alpha", "Beta"]);
}

#[test]
fn renderer_strips_only_one_marker() {
    let prepared = DocumentRenderer::default()
        .prepare("T", &["- 3.5% growth", "- one more hire"])
        .unwrap();
    assert_eq!(prepared.blocks, ["3.5% growth", "one more hire"]);
}

#[test]
fn rendering_twice_gives_the_same_pages() {
    let bullets = normalize_line_markers(RESPONSES[0]);
    let renderer = DocumentRenderer::default();
    let first = renderer.render("Bullet Summary", bullets.as_slice()).unwrap();
    let second = renderer.render("Bullet Summary", bullets.as_slice()).unwrap();
    assert_eq!(first.page_count(), 1);
    assert_eq!(first.page_count(), second.page_count());
}

#[test]
fn long_lists_spill_onto_more_pages() {
    let bullets: Vec<String> = (1..=120)
        .map(|i| format!("Action item number {i} for the follow-up meeting"))
        .collect();
    let doc = DocumentRenderer::default()
        .render("Bullet Summary", &bullets)
        .unwrap();
    assert!(doc.page_count() >= 2, "got {} pages", doc.page_count());
}

#[test]
fn wide_glyphs_wrap_instead_of_overflowing() {
    // Same character count, very different advance widths.
    let wide: Vec<String> = (0..40).map(|_| "ÆÆÆÆ ".repeat(60)).collect();
    let narrow: Vec<String> = (0..40).map(|_| "iiii ".repeat(60)).collect();
    let renderer = DocumentRenderer::default();
    let wide = renderer.render("T", &wide).unwrap();
    let narrow = renderer.render("T", &narrow).unwrap();
    assert!(
        wide.page_count() > narrow.page_count(),
        "wide {} vs narrow {}",
        wide.page_count(),
        narrow.page_count()
    );
}

#[test]
fn unrenderable_text_names_the_character() {
    let err = DocumentRenderer::default()
        .render("Summary", &["Sync with 東京 office"])
        .unwrap_err();
    assert!(err.reason.contains("U+6771"), "got: {err}");
}

// ── Chunking and context ────────────────────────────────────────────────────

#[test]
fn chunks_appear_in_document_order() {
    let text: String = (0..200).map(|i| format!("sentence{i} ")).collect();
    let chunks = TextChunker::new(500, 50).unwrap().split(&text);
    assert!(chunks.len() > 1);
    let firsts: Vec<usize> = chunks
        .iter()
        .map(|c| {
            let word = c.split(' ').next().unwrap();
            word.trim_start_matches("sentence").parse().unwrap()
        })
        .collect();
    assert!(firsts.windows(2).all(|w| w[0] < w[1]), "{firsts:?}");
    assert!(chunks.iter().all(|c| c.chars().count() <= 500));
}

#[test]
fn context_uses_at_most_max_chunks() {
    let config = SummaryConfig::builder()
        .chunk_size(500)
        .chunk_overlap(0)
        .max_chunks(3)
        .build()
        .unwrap();
    let text = "lorem ipsum dolor sit amet ".repeat(200);
    let prepared = prepare_context(&text, &config).unwrap();
    assert!(prepared.total_chunks > 3);
    assert_eq!(prepared.used_chunks, 3);
    assert_eq!(prepared.context.split("\n\n---\n\n").count(), 3);
}

// ── End to end without a model ──────────────────────────────────────────────

#[derive(Default)]
struct RenderCounter {
    rendered: AtomicUsize,
}

impl SummaryProgressCallback for RenderCounter {
    fn on_rendered(&self, _pages: usize, _bytes: usize) {
        self.rendered.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn response_to_pdf() {
    let counter = Arc::new(RenderCounter::default());
    let config = SummaryConfig::builder()
        .title("Weekly Sync")
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    let out = bullets_from_response(RESPONSES[2], &config);
    assert_eq!(
        out.markdown,
        "- Ship the beta\n- Collect feedback\n- Plan the GA release"
    );
    assert_eq!(out.stats.bullet_count, 3);
    assert_eq!(counter.rendered.load(Ordering::SeqCst), 1);

    assert!(out.render_error.is_none());
    let doc = out.document.expect("document rendered");
    assert!(doc.as_bytes().starts_with(b"%PDF-"));
    assert_eq!(out.stats.page_count, doc.page_count());
}

#[test]
fn glyph_split_config_is_honoured() {
    let config = SummaryConfig::builder()
        .strategy(NormalizeStrategy::GlyphSplit)
        .build()
        .unwrap();
    let out = bullets_from_response("Intro line\n- Kept\n1. Ignored", &config);
    assert_eq!(out.bullets.as_slice(), ["Kept"]);
}

#[test]
fn empty_response_falls_back_to_raw_text() {
    let out = bullets_from_response("", &SummaryConfig::default());
    assert!(out.is_fallback());
    assert!(out.document.is_none());
    assert_eq!(out.markdown, "");
}

#[test]
fn unrenderable_response_still_yields_bullets() {
    let counter = Arc::new(RenderCounter::default());
    let config = SummaryConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    let out = bullets_from_response("- Kickoff in 東京\n- Costs flat", &config);
    assert_eq!(out.markdown, "- Kickoff in 東京\n- Costs flat");
    assert!(out.document.is_none());
    assert!(out.render_error.is_some());
    assert_eq!(counter.rendered.load(Ordering::SeqCst), 0);
}

#[test]
fn replacement_lets_unrenderable_response_render() {
    let config = SummaryConfig::builder()
        .document_style(DocumentStyle {
            replacement: Some('?'),
            ..DocumentStyle::default()
        })
        .build()
        .unwrap();
    let out = bullets_from_response("- Kickoff in 東京\n- Costs flat", &config);
    assert!(out.render_error.is_none());
    assert!(out.document.is_some());
}

#[test]
fn empty_transcript_is_rejected_before_any_model_call() {
    let result = tokio_test::block_on(summarize("  \n ", &SummaryConfig::default()));
    assert!(matches!(result, Err(SummaryError::EmptyInput)));
}

#[tokio::test]
async fn written_document_matches_rendered_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.pdf");
    let out = bullets_from_response(RESPONSES[0], &SummaryConfig::default());
    let doc = out.document.unwrap();
    write_document(&doc, &path).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), doc.as_bytes());
}
