//! Multi-reference sufficient statistics
//!
//! A reference superblock is a list of positions, each with one or more
//! admissible texts. Every combination (one text per position) is a possible
//! reference. Against all of them at once we keep, per n-gram, the largest
//! count any combination offers, and the combination length closest to the
//! candidate length.

use super::score::NGRAM_ORDER;
use crate::errors::{EqBleuError, Result};
use crate::nlp::ngrams::{extract_ngrams, merge_max, NgramCounts};
use crate::nlp::tokenizer::Tokenizer;
use crate::product::CartesianProduct;
use crate::types::NgramSpan;

/// Reference-side statistics for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceStats {
    /// Per n-gram, the maximum count over all reference combinations
    pub ngrams: NgramCounts,
    /// `|candidate_len - ref_len|` for the chosen combination
    pub length_diff: usize,
    /// Length of the combination closest to the candidate (shorter on ties)
    pub ref_len: usize,
    /// Total whitespace token count of the candidate texts
    pub candidate_len: usize,
}

/// Statistics of `candidate_texts` against every combination of
/// `reference_choices`, with n-grams formed inside each text.
///
/// An empty `reference_choices` is a single empty reference of length 0.
/// A position with no admissible text is a precondition failure.
pub fn reference_stats<C, R, P>(candidate_texts: &[C], reference_choices: &[P]) -> Result<ReferenceStats>
where
    C: AsRef<str>,
    R: AsRef<str>,
    P: AsRef<[R]>,
{
    reference_stats_with_span(candidate_texts, reference_choices, NgramSpan::Block)
}

/// Like [`reference_stats`], with an explicit n-gram span policy
pub fn reference_stats_with_span<C, R, P>(
    candidate_texts: &[C],
    reference_choices: &[P],
    span: NgramSpan,
) -> Result<ReferenceStats>
where
    C: AsRef<str>,
    R: AsRef<str>,
    P: AsRef<[R]>,
{
    trace_stage!("reference_stats");

    let tokenizer = Tokenizer::new();
    let candidate_len = tokenizer.count_all(candidate_texts);

    let choices: Vec<&[R]> = reference_choices.iter().map(AsRef::as_ref).collect();
    if let Some(position) = choices.iter().position(|c| c.is_empty()) {
        return Err(EqBleuError::precondition(format!(
            "reference position {position} has no admissible text"
        )));
    }

    let mut ngrams = NgramCounts::default();
    // (length_diff, ref_len) of the closest combination so far
    let mut closest: Option<(usize, usize)> = None;

    for combination in CartesianProduct::from_slices(choices) {
        let texts: Vec<&str> = combination
            .into_iter()
            .map(|text| AsRef::<str>::as_ref(text))
            .collect();

        let ref_len = tokenizer.count_all(&texts);
        let diff = candidate_len.abs_diff(ref_len);
        closest = match closest {
            Some((best_diff, best_len))
                if best_diff < diff || (best_diff == diff && best_len <= ref_len) =>
            {
                Some((best_diff, best_len))
            }
            _ => Some((diff, ref_len)),
        };

        merge_max(&mut ngrams, span_ngrams(&texts, span));
    }

    let (length_diff, ref_len) = closest
        .ok_or_else(|| EqBleuError::precondition("reference product yielded no combination"))?;

    trace_event!(candidate_len, ref_len, ngrams = ngrams.len(), "reference stats");

    Ok(ReferenceStats {
        ngrams,
        length_diff,
        ref_len,
        candidate_len,
    })
}

/// N-grams of one side of a segment under the given span policy
pub(crate) fn span_ngrams<S: AsRef<str>>(texts: &[S], span: NgramSpan) -> NgramCounts {
    match span {
        NgramSpan::Block => extract_ngrams(texts, 1, NGRAM_ORDER),
        NgramSpan::Superblock => {
            let joined = texts
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(" ");
            extract_ngrams(&[joined], 1, NGRAM_ORDER)
        }
    }
}
