//! Song detection capability.
//!
//! The classifier hands the whole document corpus to a `SongDetector` and
//! expects the song titles back in document order.

use async_trait::async_trait;

use crate::error::Result;

/// Finds song titles in the text of a planning document.
#[async_trait]
pub trait SongDetector: Send + Sync {
    /// Return song titles in the order they appear, or an empty list.
    async fn detect_songs(&self, corpus: &str) -> Result<Vec<String>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Characters that mark a list entry inside a praise block.
const BULLETS: &[char] = &['-', '–', '•', '*'];

/// Deterministic detector for documents that list songs as bullet lines
/// below a labelled praise block ("Lobpreis-Block").
///
/// A line containing the marker opens the block. Bullet lines add titles,
/// blank lines are skipped, and the first other line closes the block.
#[derive(Debug, Clone)]
pub struct PraiseBlockDetector {
    marker: String,
}

impl PraiseBlockDetector {
    /// Create a detector for the given block marker.
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    /// Synchronous detection, used by the async trait method.
    pub fn titles(&self, corpus: &str) -> Vec<String> {
        let mut titles = Vec::new();
        let mut in_block = false;

        for line in corpus.lines() {
            let trimmed = line.trim();

            if trimmed.contains(self.marker.as_str()) {
                in_block = true;
                continue;
            }
            if !in_block || trimmed.is_empty() {
                continue;
            }

            match strip_bullet(trimmed) {
                Some(title) if !title.is_empty() => titles.push(title.to_string()),
                Some(_) => {}
                None => in_block = false,
            }
        }

        titles
    }
}

impl Default for PraiseBlockDetector {
    fn default() -> Self {
        Self::new(crate::constants::extraction::DEFAULT_PRAISE_BLOCK_MARKER)
    }
}

#[async_trait]
impl SongDetector for PraiseBlockDetector {
    async fn detect_songs(&self, corpus: &str) -> Result<Vec<String>> {
        Ok(self.titles(corpus))
    }

    fn name(&self) -> &'static str {
        "praise-block"
    }
}

/// Strip a leading bullet and the whitespace around it.
fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix(BULLETS).map(str::trim)
}
