//! Text processing for scoring
//!
//! - [`tokenizer`]: lowercasing whitespace tokenizer
//! - [`ngrams`]: n-gram count extraction

pub mod ngrams;
pub mod tokenizer;
