//! Transcript windowing: split long text into overlapping windows.
//!
//! Recursive character splitting: try the coarsest separator present in the
//! text (paragraph break, then line break, then space, then between
//! characters), merge the pieces greedily up to `chunk_size` characters, and
//! recurse into any piece still too long using the finer separators. When a
//! window is emitted, trailing pieces totalling at most `chunk_overlap`
//! characters are carried into the next one.
//!
//! Separators stay attached to the start of the piece that follows them, so
//! paragraph structure survives into the windows. Every window is trimmed;
//! empty windows are dropped. Lengths are counted in characters, not bytes.

use crate::error::SummaryError;
use std::collections::VecDeque;
use tracing::debug;

/// Separators tried in order, coarsest first. The empty separator splits
/// between characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SummaryError> {
        if chunk_size == 0 {
            return Err(SummaryError::InvalidConfig("Chunk size must be ≥ 1".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(SummaryError::InvalidConfig(format!(
                "Chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into windows in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let windows = self.split_recursive(text, &self.separators);
        debug!(
            "Chunked {} chars into {} windows (size {}, overlap {})",
            text.chars().count(),
            windows.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        windows
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text; the empty one always matches.
        let (index, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_empty() || text.contains(s.as_str()))
            .map(|(i, s)| (i, s.as_str()))
            .unwrap_or((separators.len().saturating_sub(1), ""));
        let finer = separators.get(index + 1..).unwrap_or(&[]);

        let mut windows = Vec::new();
        let mut fitting: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                windows.extend(self.merge(&fitting));
                fitting.clear();
            }
            if finer.is_empty() || separator.is_empty() {
                windows.push(piece);
            } else {
                windows.extend(self.split_recursive(&piece, finer));
            }
        }
        if !fitting.is_empty() {
            windows.extend(self.merge(&fitting));
        }
        windows
    }

    /// Greedily join pieces into windows of at most `chunk_size` characters,
    /// carrying up to `chunk_overlap` characters of tail into the next one.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_window(&mut windows, &current);
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        push_window(&mut windows, &current);
        windows
    }
}

fn push_window(windows: &mut Vec<String>, pieces: &VecDeque<&str>) {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, attaching each separator to the piece after it.
/// The empty separator yields single characters. Empty pieces are dropped.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(text[start..pos].to_string());
        }
        start = pos;
    }
    pieces.push(text[start..].to_string());
    pieces.retain(|p| !p.is_empty());
    pieces
}
