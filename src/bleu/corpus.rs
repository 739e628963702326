//! Corpus-level accumulation
//!
//! BLEU is not averaged over sentences. Sufficient statistics are summed
//! sentence by sentence into documents, documents into the corpus, and the
//! score is computed once from the totals.

use super::lookup::TranslationLookup;
use super::reference::{reference_stats_with_span, span_ngrams, ReferenceStats};
use super::score::{BleuResult, BleuScorer, NGRAM_ORDER};
use super::Segment;
use crate::errors::{EqBleuError, Result};
use crate::nlp::ngrams::{ngram_order, NgramCounts};
use crate::types::{BleuConfig, NgramSpan};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::AddAssign;

/// Sufficient statistics of one sentence, document or corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceStats {
    /// Clipped matches per order
    pub correct: [u64; NGRAM_ORDER],
    /// Candidate n-grams per order
    pub total: [u64; NGRAM_ORDER],
    /// Candidate length
    pub sys_len: u64,
    /// Chosen reference length
    pub ref_len: u64,
}

impl SentenceStats {
    /// Statistics of a candidate against its reference statistics
    pub fn from_ngrams(candidate: &NgramCounts, reference: &ReferenceStats) -> Self {
        let mut stats = Self::default();
        stats.accumulate_sentence(candidate, reference);
        stats
    }

    /// Add one sentence: each candidate n-gram is clipped to the reference
    /// count for `correct` and counted in full for `total`.
    pub fn accumulate_sentence(&mut self, candidate: &NgramCounts, reference: &ReferenceStats) {
        for (ngram, &count) in candidate {
            let Some(order) = ngram_order(ngram).checked_sub(1) else {
                continue;
            };
            if order >= NGRAM_ORDER {
                continue;
            }
            let matched = reference.ngrams.get(ngram).copied().unwrap_or(0);
            self.correct[order] += count.min(matched);
            self.total[order] += count;
        }
        self.sys_len += reference.candidate_len as u64;
        self.ref_len += reference.ref_len as u64;
    }

    /// Resolve a segment's keys and compute its statistics.
    ///
    /// Reference keys contribute every alternative; candidate keys contribute
    /// their primary realization.
    pub fn from_segment<K, L>(segment: &Segment<K>, lookup: &L, span: NgramSpan) -> Result<Self>
    where
        K: Debug,
        L: TranslationLookup<K> + ?Sized,
    {
        let references = segment
            .references
            .iter()
            .map(|key| lookup.lookup(key).map(|r| r.into_alternatives()))
            .collect::<Result<Vec<Vec<String>>>>()?;

        let candidates = segment
            .candidates
            .iter()
            .map(|key| {
                lookup.lookup(key)?.into_primary().ok_or_else(|| {
                    EqBleuError::precondition(format!("candidate block {key:?} has no realization"))
                })
            })
            .collect::<Result<Vec<String>>>()?;

        let reference = reference_stats_with_span(candidates.as_slice(), references.as_slice(), span)?;
        let candidate_ngrams = span_ngrams(candidates.as_slice(), span);
        Ok(Self::from_ngrams(&candidate_ngrams, &reference))
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for SentenceStats {
    fn add_assign(&mut self, other: Self) {
        for n in 0..NGRAM_ORDER {
            self.correct[n] += other.correct[n];
            self.total[n] += other.total[n];
        }
        self.sys_len += other.sys_len;
        self.ref_len += other.ref_len;
    }
}

impl std::ops::Add for SentenceStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl std::iter::Sum for SentenceStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Result of scoring a corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    /// Score over the corpus totals
    pub bleu: BleuResult,
    /// Corpus totals
    pub totals: SentenceStats,
    /// Per-document totals, in the order documents were closed
    pub documents: Vec<SentenceStats>,
}

/// Accumulates sentence statistics into documents and a corpus
#[derive(Debug, Clone, Default)]
pub struct CorpusAggregator {
    scorer: BleuScorer,
    current: SentenceStats,
    sentences_in_current: usize,
    documents: Vec<SentenceStats>,
}

impl CorpusAggregator {
    /// Create an aggregator with a validated configuration
    pub fn new(config: BleuConfig) -> Result<Self> {
        Ok(Self {
            scorer: BleuScorer::with_config(config)?,
            ..Self::default()
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &BleuConfig {
        self.scorer.config()
    }

    /// Add precomputed sentence statistics to the open document
    pub fn add_sentence(&mut self, stats: SentenceStats) {
        self.current += stats;
        self.sentences_in_current += 1;
    }

    /// Resolve and add one segment to the open document
    pub fn add_segment<K, L>(&mut self, segment: &Segment<K>, lookup: &L) -> Result<SentenceStats>
    where
        K: Debug,
        L: TranslationLookup<K> + ?Sized,
    {
        let stats = SentenceStats::from_segment(segment, lookup, self.config().ngram_span)?;
        self.add_sentence(stats);
        Ok(stats)
    }

    /// Close the open document and return its totals
    pub fn end_document(&mut self) -> SentenceStats {
        let document = std::mem::take(&mut self.current);
        trace_event!(
            document = self.documents.len(),
            sentences = self.sentences_in_current,
            sys_len = document.sys_len,
            ref_len = document.ref_len,
            "document closed"
        );
        self.sentences_in_current = 0;
        self.documents.push(document);
        document
    }

    /// Closed documents so far
    pub fn documents(&self) -> &[SentenceStats] {
        &self.documents
    }

    /// Corpus totals, including the open document
    pub fn totals(&self) -> SentenceStats {
        self.documents.iter().copied().sum::<SentenceStats>() + self.current
    }

    /// Score the corpus and reset for the next one.
    ///
    /// An open document with at least one sentence is closed first.
    pub fn finalize(&mut self) -> CorpusReport {
        trace_stage!("corpus_finalize");

        if self.sentences_in_current > 0 {
            self.end_document();
        }
        let totals = self.totals();
        let bleu = self.scorer.score(&totals);
        let documents = std::mem::take(&mut self.documents);
        self.reset();

        CorpusReport {
            bleu,
            totals,
            documents,
        }
    }

    /// Drop everything accumulated, keeping the configuration
    pub fn reset(&mut self) {
        self.current = SentenceStats::default();
        self.sentences_in_current = 0;
        self.documents.clear();
    }
}

/// Score a corpus of documents, each a list of segments
pub fn corpus_bleu<K, L>(corpus: &[Vec<Segment<K>>], lookup: &L, config: &BleuConfig) -> Result<CorpusReport>
where
    K: Debug,
    L: TranslationLookup<K> + ?Sized,
{
    let mut aggregator = CorpusAggregator::new(config.clone())?;
    for document in corpus {
        for segment in document {
            aggregator.add_segment(segment, lookup)?;
        }
        aggregator.end_document();
    }
    Ok(aggregator.finalize())
}
