//! Bullet extraction: free-form text → ordered, de-duplicated bullet list.
//!
//! Two strategies share one entry point, [`BulletNormalizer`]:
//!
//! | Strategy | Recognises | Whitespace |
//! |----------|-----------|------------|
//! | [`NormalizeStrategy::LineMarker`] (default) | `-`, `–`, `—`, `*`, `•`, `·`, `o`, `◦`, `○`, `1.`, `2)` | collapsed inside the bullet |
//! | [`NormalizeStrategy::GlyphSplit`] | lines starting with `-` or `•`; otherwise text split on `•` | trimmed at the ends only |
//!
//! The two are **not** interchangeable: a numbered list normalises to clean
//! items under `LineMarker` but produces a single bullet (the whole text)
//! under `GlyphSplit`. The caller picks one explicitly.
//!
//! Normalisation never fails. Empty input yields an empty list, prose with no
//! markers yields a single bullet, so the caller can always show something.

use crate::pipeline::rules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which extraction rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizeStrategy {
    /// One bullet per line, broad marker recognition including numbered
    /// lists, single run-on lines split at inline glyphs. (default)
    #[default]
    LineMarker,
    /// Only `-`/`•` lines count as bullets; text without such lines is split
    /// on the `•` character.
    GlyphSplit,
}

impl fmt::Display for NormalizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeStrategy::LineMarker => write!(f, "line-marker"),
            NormalizeStrategy::GlyphSplit => write!(f, "glyph-split"),
        }
    }
}

impl FromStr for NormalizeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line-marker" | "line" => Ok(NormalizeStrategy::LineMarker),
            "glyph-split" | "glyph" => Ok(NormalizeStrategy::GlyphSplit),
            other => Err(format!(
                "unknown strategy '{other}' (expected line-marker or glyph-split)"
            )),
        }
    }
}

// ── BulletList ───────────────────────────────────────────────────────────────

/// Ordered bullets, unique by exact string, in first-occurrence order.
///
/// The only way to add an element is through [`BulletList`]'s own
/// insertion, which drops empties and duplicates, so the invariant cannot be
/// broken from outside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BulletList {
    items: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl BulletList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bullet` unless it is empty or already present.
    ///
    /// Returns whether it was appended.
    fn push(&mut self, bullet: String) -> bool {
        if bullet.is_empty() || self.seen.contains(&bullet) {
            return false;
        }
        self.seen.insert(bullet.clone());
        self.items.push(bullet);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }

    /// Markdown for on-screen display: one `- ` bullet per line.
    pub fn to_markdown(&self) -> String {
        self.items
            .iter()
            .map(|b| format!("- {b}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a BulletList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl AsRef<[String]> for BulletList {
    fn as_ref(&self) -> &[String] {
        &self.items
    }
}

impl<S: Into<String>> FromIterator<S> for BulletList {
    /// Collect with the list's own rules: empties and repeats are dropped.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = BulletList::new();
        for s in iter {
            list.push(s.into());
        }
        list
    }
}

// ── BulletNormalizer ─────────────────────────────────────────────────────────

/// Converts raw text into a [`BulletList`] with a fixed strategy.
///
/// Holds no mutable state; one normaliser can be shared across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulletNormalizer {
    strategy: NormalizeStrategy,
}

impl BulletNormalizer {
    pub fn new(strategy: NormalizeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> NormalizeStrategy {
        self.strategy
    }

    pub fn normalize(&self, raw: &str) -> BulletList {
        let bullets = match self.strategy {
            NormalizeStrategy::LineMarker => normalize_line_markers(raw),
            NormalizeStrategy::GlyphSplit => split_glyph_bullets(raw),
        };
        debug!(
            "Normalised {} chars into {} bullets ({})",
            raw.len(),
            bullets.len(),
            self.strategy
        );
        bullets
    }
}

/// The line-marker strategy.
///
/// 1. Split on line boundaries, drop blank lines.
/// 2. A single remaining line is split at inline bullet glyphs.
/// 3. Each working line loses its leading marker, has whitespace collapsed,
///    and is appended unless empty or already present.
pub fn normalize_line_markers(raw: &str) -> BulletList {
    let mut lines = rules::non_empty_lines(raw);
    if lines.len() == 1 {
        lines = rules::split_inline_bullets(lines[0]);
    }
    debug!("line-marker: {} working lines", lines.len());

    lines
        .into_iter()
        .map(|line| rules::collapse_whitespace(rules::strip_leading_marker(line)))
        .collect()
}

/// The glyph-split strategy.
///
/// Keeps only lines starting with `-` or `•`, stripped of those characters.
/// When no line qualifies the whole text is split on `•` instead.
pub fn split_glyph_bullets(raw: &str) -> BulletList {
    let marked: Vec<&str> = rules::non_empty_lines(raw)
        .into_iter()
        .filter(|line| line.starts_with(rules::GLYPH_SPLIT_MARKERS))
        .collect();

    if marked.is_empty() {
        debug!("glyph-split: no marked lines, splitting on '{}'", rules::BULLET_CHAR);
        return raw
            .split(rules::BULLET_CHAR)
            .map(str::trim)
            .collect();
    }

    marked
        .into_iter()
        .map(|line| {
            line.trim_start_matches(|c: char| rules::GLYPH_SPLIT_MARKERS.contains(&c) || c == ' ')
                .trim()
        })
        .collect()
}
