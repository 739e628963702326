//! Whitespace tokenization
//!
//! BLEU statistics here are computed over lowercased, whitespace-separated
//! tokens. Nothing smarter is attempted: punctuation stays attached to its
//! word and no Unicode segmentation is applied.

/// A lowercasing whitespace tokenizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into lowercased tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Number of tokens in `text`, without allocating them
    pub fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Total token count over several texts
    pub fn count_all<S: AsRef<str>>(&self, texts: &[S]) -> usize {
        texts.iter().map(|t| self.count(t.as_ref())).sum()
    }
}
