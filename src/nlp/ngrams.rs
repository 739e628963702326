//! N-gram count extraction
//!
//! Counts every n-gram of order `min_order..=max_order` in a list of texts.
//! Each text is tokenized on its own, so an n-gram never runs from the end of
//! one text into the start of the next.

use super::tokenizer::Tokenizer;
use rustc_hash::FxHashMap;

/// N-gram text (tokens joined by a single space) → occurrence count
pub type NgramCounts = FxHashMap<String, u64>;

/// Count n-grams of order `min_order..=max_order` across `texts`.
///
/// Texts are lowercased and whitespace-split independently. Counts from all
/// texts and all orders land in one map. A `min_order` of 0 is treated as 1.
pub fn extract_ngrams<S: AsRef<str>>(texts: &[S], min_order: usize, max_order: usize) -> NgramCounts {
    let tokenizer = Tokenizer::new();
    let min_order = min_order.max(1);
    let mut ngrams = NgramCounts::default();

    for text in texts {
        let tokens = tokenizer.tokenize(text.as_ref());
        for n in min_order..=max_order {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                *ngrams.entry(window.join(" ")).or_insert(0) += 1;
            }
        }
    }

    ngrams
}

/// Order of an n-gram key, i.e. its token count
pub fn ngram_order(ngram: &str) -> usize {
    ngram.split(' ').count()
}

/// Keep, per n-gram, the larger of the two counts
pub fn merge_max(into: &mut NgramCounts, other: NgramCounts) {
    for (ngram, count) in other {
        let slot = into.entry(ngram).or_insert(0);
        *slot = (*slot).max(count);
    }
}
