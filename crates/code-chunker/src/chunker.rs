use crate::config::{SegmenterConfig, CHARS_PER_TOKEN};
use crate::error::Result;
use crate::types::Chunk;
use repochat_extractor::AnnotatedDocument;

/// Cut markers in priority order
pub const BOUNDARY_MARKERS: [&str; 5] = ["\n}", ";\n", "\n\n", "\n", ". "];

/// Character range `[start, end)` of one chunk within its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits file content into bounded, overlapping, boundary-aligned chunks
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    /// Create a segmenter; fails on an invalid configuration
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment one annotated document into header-wrapped chunks
    pub fn segment(&self, doc: &AnnotatedDocument) -> Vec<Chunk> {
        let chars: Vec<char> = doc.raw_content.chars().collect();
        let spans = self.split_chars(&chars);
        let total = self.estimated_total(chars.len(), spans.len());
        if total != spans.len() {
            log::debug!(
                "{}: estimated {total} chunks, emitted {}",
                doc.file_path,
                spans.len()
            );
        }

        spans
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let slice: String = chars[span.start..span.end].iter().collect();
                Chunk::new(doc, slice, span.start, span.end, i + 1, total)
            })
            .collect()
    }

    /// Up-front chunk count carried in every header; overlap can make the
    /// emitted count exceed it
    #[must_use]
    pub fn estimated_total(&self, len_chars: usize, emitted: usize) -> usize {
        if emitted <= 1 {
            emitted
        } else {
            len_chars.div_ceil(self.config.chunk_chars())
        }
    }

    /// Character spans the content would be cut into
    pub fn split(&self, content: &str) -> Vec<Span> {
        let chars: Vec<char> = content.chars().collect();
        self.split_chars(&chars)
    }

    fn split_chars(&self, chars: &[char]) -> Vec<Span> {
        let len = chars.len();
        if len == 0 {
            return Vec::new();
        }
        if len / CHARS_PER_TOKEN <= self.config.chunk_size {
            return vec![Span { start: 0, end: len }];
        }

        let threshold = self.config.chunk_chars();
        let overlap = self.config.overlap_chars();
        let mut spans = Vec::new();
        let mut start = 0;

        while len - start >= threshold {
            let cut = find_cut(&chars[start..], threshold, overlap);
            spans.push(Span {
                start,
                end: start + cut,
            });

            if start + cut >= len {
                start = len;
                break;
            }
            // Keep the trailing overlap as the seed of the next chunk
            start += cut.saturating_sub(overlap);
        }

        if start < len {
            spans.push(Span { start, end: len });
        }

        spans
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            config: SegmenterConfig::default(),
        }
    }
}

/// Cut position within `text`: just past the last marker at or before the target end,
/// trying markers in priority order and accepting only hits inside the overlap window.
/// Falls back to a hard cut at the target end.
fn find_cut(text: &[char], threshold: usize, overlap: usize) -> usize {
    let target = threshold.min(text.len());
    let window_start = target.saturating_sub(overlap);

    for marker in BOUNDARY_MARKERS {
        if let Some(index) = last_index_of(text, marker, window_start, target) {
            return index + marker.chars().count();
        }
    }

    target
}

/// Last index in `[from, to]` where `marker` starts
fn last_index_of(text: &[char], marker: &str, from: usize, to: usize) -> Option<usize> {
    let marker: Vec<char> = marker.chars().collect();
    let last_start = text.len().checked_sub(marker.len())?.min(to);
    if last_start < from {
        return None;
    }
    (from..=last_start)
        .rev()
        .find(|&i| text[i..i + marker.len()] == marker[..])
}
