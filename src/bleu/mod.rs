//! Multi-reference BLEU over matched units
//!
//! - [`lookup`]: block key → admissible text realizations
//! - [`reference`]: clipped statistics against the closest reference combination
//! - [`score`]: smoothed, brevity-penalized score from sufficient statistics
//! - [`corpus`]: sentence → document → corpus accumulation

pub mod corpus;
pub mod lookup;
pub mod reference;
pub mod score;

use serde::{Deserialize, Serialize};

/// One matched unit: the reference blocks and candidate blocks of a class.
///
/// Keys are resolved to text through a
/// [`TranslationLookup`](lookup::TranslationLookup) when scored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment<K> {
    /// Reference block keys; each resolves to all its alternatives
    pub references: Vec<K>,
    /// Candidate block keys; each resolves to its primary realization
    pub candidates: Vec<K>,
}

impl<K> Segment<K> {
    /// Create a segment from reference and candidate keys
    pub fn new(references: Vec<K>, candidates: Vec<K>) -> Self {
        Self {
            references,
            candidates,
        }
    }

    /// Map both sides to another key type
    pub fn map_keys<J>(self, mut f: impl FnMut(K) -> J) -> Segment<J> {
        Segment {
            references: self.references.into_iter().map(&mut f).collect(),
            candidates: self.candidates.into_iter().map(&mut f).collect(),
        }
    }
}
