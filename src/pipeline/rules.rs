//! Cleaning rule tables shared by the normaliser and the renderer.
//!
//! Every rule is a declarative pattern plus a tiny pure function applying it,
//! so each can be tested on its own without going through the strategies
//! that combine them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Glyphs that mark a list item when they lead a line.
///
/// The lowercase letter `o` is included: plain-text outlines use it as a
/// hollow bullet.
pub const MARKER_GLYPHS: &[char] = &['-', '–', '—', '*', '•', '·', 'o', '◦', '○'];

/// Glyphs that start a qualifying line in the glyph-split strategy.
pub const GLYPH_SPLIT_MARKERS: &[char] = &['-', '•'];

/// The literal separator used when glyph-split falls back to splitting the
/// whole text.
pub const BULLET_CHAR: char = '•';

// ── Leading marker ───────────────────────────────────────────────────────────

/// A run of marker glyphs, or a numeric marker (`12.` / `3)`), with the
/// whitespace around it.
pub static RE_LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-–—*•·o◦○]+|\d+[.)]\s*)\s*").unwrap());

/// A numeric marker at the start of a string.
pub static RE_NUMERIC_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]").unwrap());

/// Strip one leading marker and the whitespace after it.
///
/// Only the first marker goes: in `"- one more"` the `o` is content, and in
/// `"- 3.5% growth"` so is `3.`.
pub fn strip_leading_marker(line: &str) -> &str {
    match RE_LEADING_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Whether `s` begins with a marker glyph or a numeric marker.
pub fn has_leading_marker(s: &str) -> bool {
    s.starts_with(MARKER_GLYPHS) || RE_NUMERIC_MARKER.is_match(s)
}

// ── Whitespace ───────────────────────────────────────────────────────────────

pub static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    RE_WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

// ── Line breaks ──────────────────────────────────────────────────────────────

/// Every line boundary a pasted transcript may contain, not just `\n`.
pub static RE_LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0B\x0C\x1C\x1D\x1E\x{85}\x{2028}\x{2029}]").unwrap()
});

/// Split on line boundaries, trim each line, drop the blank ones.
pub fn non_empty_lines(text: &str) -> Vec<&str> {
    RE_LINE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

// ── Degenerate single-line split ─────────────────────────────────────────────

/// A bullet glyph followed by whitespace, used to break up a run-on line.
pub static RE_INLINE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•\-*\x{2022}]\s+").unwrap());

/// Split a single run-on line at inline bullet glyphs.
///
/// Returns the trimmed non-empty pieces, or the line itself when splitting
/// produced nothing.
pub fn split_inline_bullets(line: &str) -> Vec<&str> {
    let pieces: Vec<&str> = RE_INLINE_BULLET
        .split(line)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if pieces.is_empty() {
        vec![line]
    } else {
        pieces
    }
}
