//! Fixed-size, overlapping character windows over page text.
//!
//! Sizes are counted in characters, not bytes, so multi-byte text never gets
//! split inside a code point.

use crate::error::{Error, Result};
use crate::types::{Chunk, Page};

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_OVERLAP: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_OVERLAP }
    }
}

impl Chunker {
    /// `overlap` must be strictly smaller than `chunk_size`; otherwise the
    /// window start would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk_size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidArgument(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn overlap(&self) -> usize { self.overlap }

    /// Distance in characters between consecutive window starts.
    pub fn step(&self) -> usize { self.chunk_size - self.overlap }

    /// Newlines become spaces, then the ends are trimmed.
    pub fn normalize(text: &str) -> String {
        text.replace('\n', " ").trim().to_string()
    }

    /// Lazily yields windows over already-normalized text. Cloning the
    /// iterator (or calling this again) restarts the sequence.
    pub fn windows<'a>(&self, normalized: &'a str) -> Windows<'a> {
        Windows { text: normalized, start: 0, size: self.chunk_size, step: self.step() }
    }

    /// `ceil(len / step)` for a normalized text of `char_len` characters.
    pub fn expected_count(&self, char_len: usize) -> usize {
        char_len.div_ceil(self.step())
    }

    pub fn chunk_page(&self, source: &str, page: &Page) -> Vec<Chunk> {
        let text = Self::normalize(&page.text);
        self.windows(&text)
            .map(|window| Chunk { text: window.to_string(), source: source.to_string(), page: page.number })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Windows<'a> {
    text: &'a str,
    start: usize,
    size: usize,
    step: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.start >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.start..];
        let window = &rest[..byte_offset(rest, self.size)];
        self.start += byte_offset(rest, self.step);
        Some(window)
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}
