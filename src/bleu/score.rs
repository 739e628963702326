//! BLEU from sufficient statistics
//!
//! `log BLEU = min(1 - r/c, 0) + Σ w_n log p_n` with uniform weights over the
//! orders in use. Precisions are reported on a 0–100 scale.

use super::corpus::SentenceStats;
use super::lookup::TranslationLookup;
use super::Segment;
use crate::errors::Result;
use crate::types::{BleuConfig, Smoothing};
use serde::Serialize;
use std::fmt::{self, Debug};

/// Highest n-gram order scored
pub const NGRAM_ORDER: usize = 4;

/// Stand-in for `ln(0)`, so a zero precision drives the score to zero
/// without producing NaN
pub const LOG_FLOOR: f64 = -9_999_999_999.0;

fn floored_ln(value: f64) -> f64 {
    if value == 0.0 {
        LOG_FLOOR
    } else {
        value.ln()
    }
}

/// A BLEU score with the statistics it was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BleuResult {
    /// Score on a 0–100 scale
    pub score: f64,
    /// Matched n-grams per order
    pub correct: [u64; NGRAM_ORDER],
    /// Candidate n-grams per order
    pub total: [u64; NGRAM_ORDER],
    /// Per-order precision, 0–100
    pub precisions: [f64; NGRAM_ORDER],
    pub brevity_penalty: f64,
    pub sys_len: u64,
    pub ref_len: u64,
    /// Number of orders averaged in the geometric mean
    pub effective_order: usize,
}

impl BleuResult {
    /// System to reference length ratio (0 when the reference is empty)
    pub fn ratio(&self) -> f64 {
        if self.ref_len > 0 {
            self.sys_len as f64 / self.ref_len as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for BleuResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BLEU = {:.2} ", self.score)?;
        for (i, p) in self.precisions.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{p:.1}")?;
        }
        write!(
            f,
            " (BP = {:.3} ratio = {:.3} hyp_len = {} ref_len = {})",
            self.brevity_penalty,
            self.ratio(),
            self.sys_len,
            self.ref_len
        )
    }
}

/// Compute BLEU from its sufficient statistics.
///
/// Orders are visited from 1 up. The first order with no candidate n-grams
/// stops the walk, with or without effective order, and every later
/// precision stays 0 even if that order has n-grams. Without effective order
/// the score is 0 in that case anyway. With
/// `use_effective_order` the geometric mean covers only the orders visited
/// (all four if none was). An order with n-grams but no matches gets its
/// precision from `smoothing`:
///
/// - `None`: 0
/// - `Floor`: `100 * smooth_floor / total`
/// - `Exp`: `100 / (m * total)` where `m` doubles at every such order
pub fn compute_bleu(
    correct: &[u64; NGRAM_ORDER],
    total: &[u64; NGRAM_ORDER],
    sys_len: u64,
    ref_len: u64,
    smoothing: Smoothing,
    smooth_floor: f64,
    use_effective_order: bool,
) -> BleuResult {
    let mut precisions = [0.0; NGRAM_ORDER];
    let mut multiplier = 1.0;
    let mut effective_order = NGRAM_ORDER;

    for n in 0..NGRAM_ORDER {
        if total[n] == 0 {
            break;
        }
        if use_effective_order {
            effective_order = n + 1;
        }

        let denominator = total[n] as f64;
        precisions[n] = if correct[n] == 0 {
            match smoothing {
                Smoothing::Exp => {
                    multiplier *= 2.0;
                    100.0 / (multiplier * denominator)
                }
                Smoothing::Floor => 100.0 * smooth_floor / denominator,
                Smoothing::None => 0.0,
            }
        } else {
            100.0 * correct[n] as f64 / denominator
        };
    }

    let brevity_penalty = if sys_len >= ref_len {
        1.0
    } else if sys_len > 0 {
        (1.0 - ref_len as f64 / sys_len as f64).exp()
    } else {
        0.0
    };

    let log_sum: f64 = precisions[..effective_order]
        .iter()
        .map(|&p| floored_ln(p))
        .sum();
    let score = brevity_penalty * (log_sum / effective_order as f64).exp();

    BleuResult {
        score,
        correct: *correct,
        total: *total,
        precisions,
        brevity_penalty,
        sys_len,
        ref_len,
        effective_order,
    }
}

// ============================================================================
// Scorer
// ============================================================================

/// Scores statistics and segments under one [`BleuConfig`]
#[derive(Debug, Clone, Default)]
pub struct BleuScorer {
    config: BleuConfig,
}

impl BleuScorer {
    /// Create a scorer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with a validated configuration
    pub fn with_config(config: BleuConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    pub fn config(&self) -> &BleuConfig {
        &self.config
    }

    /// Score accumulated statistics
    pub fn score(&self, stats: &SentenceStats) -> BleuResult {
        compute_bleu(
            &stats.correct,
            &stats.total,
            stats.sys_len,
            stats.ref_len,
            self.config.smoothing,
            self.config.smooth_floor,
            self.config.use_effective_order,
        )
    }

    /// Score a single segment on its own
    pub fn score_segment<K, L>(&self, segment: &Segment<K>, lookup: &L) -> Result<BleuResult>
    where
        K: Debug,
        L: TranslationLookup<K> + ?Sized,
    {
        let stats = SentenceStats::from_segment(segment, lookup, self.config.ngram_span)?;
        Ok(self.score(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_perfect_match() {
        let result = compute_bleu(&[3, 2, 1, 0], &[3, 2, 1, 0], 3, 3, Smoothing::None, 0.01, true);
        assert_eq!(result.effective_order, 3);
        assert!(approx(result.score, 100.0));
        assert_eq!(result.brevity_penalty, 1.0);
    }

    #[test]
    fn test_exp_smoothing_doubles_multiplier() {
        let result = compute_bleu(&[3, 1, 0, 0], &[3, 2, 1, 0], 3, 3, Smoothing::Exp, 0.01, true);
        assert!(approx(result.precisions[2], 50.0));
        assert!(approx(result.score, (100.0f64 * 50.0 * 50.0).cbrt()));

        let twice = compute_bleu(&[2, 0, 0, 0], &[2, 1, 1, 1], 2, 2, Smoothing::Exp, 0.01, false);
        assert!(approx(twice.precisions[1], 50.0));
        assert!(approx(twice.precisions[2], 25.0));
        assert!(approx(twice.precisions[3], 12.5));
    }

    #[test]
    fn test_floor_smoothing() {
        let result = compute_bleu(&[2, 0, 0, 0], &[2, 1, 0, 0], 2, 2, Smoothing::Floor, 0.5, true);
        assert!(approx(result.precisions[1], 50.0));
        assert_eq!(result.precisions[2], 0.0);
        assert_eq!(result.effective_order, 2);
        assert!(approx(result.score, (100.0f64 * 50.0).sqrt()));
    }

    #[test]
    fn test_no_smoothing_zeroes_the_score() {
        let result = compute_bleu(&[3, 2, 1, 0], &[3, 2, 1, 1], 3, 3, Smoothing::None, 0.01, false);
        assert_eq!(result.precisions[3], 0.0);
        assert_eq!(result.effective_order, NGRAM_ORDER);
        assert!(result.score.is_finite());
        assert!(result.score < 1e-12);
    }

    #[test]
    fn test_effective_order_off_uses_all_orders() {
        let result = compute_bleu(&[3, 2, 1, 0], &[3, 2, 1, 0], 3, 3, Smoothing::None, 0.01, false);
        assert_eq!(result.effective_order, NGRAM_ORDER);
        assert!(result.score < 1e-12);
    }

    #[test]
    fn test_nothing_reached_keeps_order_four() {
        let result = compute_bleu(&[0; 4], &[0; 4], 0, 0, Smoothing::Exp, 0.01, true);
        assert_eq!(result.effective_order, NGRAM_ORDER);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.brevity_penalty, 1.0);
    }

    #[test]
    fn test_empty_order_stops_the_walk() {
        let result = compute_bleu(&[0, 2, 1, 0], &[0, 2, 1, 1], 4, 4, Smoothing::None, 0.01, false);
        assert_eq!(result.precisions, [0.0; NGRAM_ORDER]);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_brevity_penalty() {
        let short = compute_bleu(&[2, 1, 0, 0], &[2, 1, 0, 0], 2, 4, Smoothing::None, 0.01, true);
        assert!(approx(short.brevity_penalty, (1.0f64 - 2.0).exp()));
        assert!(approx(short.score, 100.0 * (-1.0f64).exp()));

        let empty = compute_bleu(&[0; 4], &[0; 4], 0, 4, Smoothing::None, 0.01, true);
        assert_eq!(empty.brevity_penalty, 0.0);
        assert_eq!(empty.score, 0.0);
    }

    #[test]
    fn test_display_format() {
        let result = compute_bleu(&[3, 2, 1, 0], &[3, 2, 1, 0], 3, 3, Smoothing::None, 0.01, true);
        assert_eq!(
            result.to_string(),
            "BLEU = 100.00 100.0/100.0/100.0/0.0 (BP = 1.000 ratio = 1.000 hyp_len = 3 ref_len = 3)"
        );
    }

    #[test]
    fn test_scorer_rejects_invalid_config() {
        let config = BleuConfig::new().with_smooth_floor(-1.0);
        assert!(BleuScorer::with_config(config).is_err());
    }
}
