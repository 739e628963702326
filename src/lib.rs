//! # eqbleu
//!
//! Reconciles competing segmentations of the same text into equivalence
//! classes, then scores candidate text against multiple admissible references
//! with BLEU computed over the matched units.
//!
//! ## Features
//!
//! - **Equivalence classes**: merges any number of trusted annotators, or a
//!   ground-truth/prediction pair with tentative locations
//! - **Enumeration**: lazily walks every admissible global grouping
//! - **Multi-reference BLEU**: clipped n-gram statistics against the
//!   closest-length reference combination, aggregated corpus-wide
//!
//! ## Example
//!
//! ```
//! use eqbleu::*;
//!
//! let a = AnnotatorMapping::from_blocks([vec![1], vec![2, 3]]);
//! let b = AnnotatorMapping::from_blocks([vec![1, 2, 3]]);
//! let classes = build_equivalence_classes(&[a, b], MergeMode::Trusted).unwrap();
//! assert_eq!(classes.len(), 1);
//! assert_eq!(classes.all_combinations().count(), 2);
//! ```

/// Enter a tracing span for a processing stage (when the `tracing` feature
/// is enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("eqbleu_stage", stage = $name).entered();
    };
}

/// Emit a debug event (when the `tracing` feature is enabled).
macro_rules! trace_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)*);
        }
    };
}

pub mod bleu;
pub mod classes;
pub mod errors;
pub mod nlp;
pub mod product;
pub mod types;

// Re-export commonly used types
pub use errors::{EqBleuError, Result};
pub use types::{
    AnnotatorMapping, Block, BleuConfig, ClassId, Location, MergeMode, NgramSpan, Smoothing,
    Superblock,
};

// Re-export main functionality
pub use bleu::corpus::{corpus_bleu, CorpusAggregator, CorpusReport, SentenceStats};
pub use bleu::lookup::{FnLookup, Realizations, TranslationLookup, TranslationTable};
pub use bleu::reference::{reference_stats, ReferenceStats};
pub use bleu::score::{compute_bleu, BleuResult, BleuScorer, NGRAM_ORDER};
pub use bleu::Segment;
pub use classes::builder::{build_equivalence_classes, EquivalenceClassBuilder};
pub use classes::combinations::AllCombinations;
pub use classes::observer::{ClassObserver, NoopObserver};
pub use classes::{EqClass, EqClasses};
pub use nlp::ngrams::{extract_ngrams, NgramCounts};
pub use nlp::tokenizer::Tokenizer;
pub use product::CartesianProduct;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
