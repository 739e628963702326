//! Core types for eqbleu
//!
//! This module defines the shared vocabulary of the library: locations,
//! annotator blocks and mappings, class identifiers, the two merge regimes,
//! and the scoring configuration.

use crate::errors::{EqBleuError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Locations & Blocks
// ============================================================================

/// An atomic text-position identifier.
///
/// In uncertain mode the sign carries meaning: positive locations are
/// confirmed members of a block, non-positive ones are tentative.
pub type Location = i64;

/// Whether a location is a confirmed (positive) location
#[inline]
pub fn is_confirmed(loc: Location) -> bool {
    loc > 0
}

/// An ordered, immutable sequence of locations that one annotator asserts
/// form a single unit (a recognized line, a caption, ...).
///
/// Two blocks are equal iff their location sequences are equal, so `(4, 5)`
/// and `(5, 4)` are distinct blocks even though they cover the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(Arc<[Location]>);

impl Block {
    /// Create a block from a sequence of locations
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        Self(locations.into_iter().collect())
    }

    /// The locations of this block, in annotator order
    pub fn locations(&self) -> &[Location] {
        &self.0
    }

    /// Number of locations in the block
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the block has no locations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the confirmed (positive) locations of the block
    pub fn confirmed(&self) -> impl Iterator<Item = Location> + '_ {
        self.0.iter().copied().filter(|&loc| is_confirmed(loc))
    }

    /// Check if every location of the block is confirmed
    pub fn is_fully_confirmed(&self) -> bool {
        self.0.iter().all(|&loc| is_confirmed(loc))
    }

    /// Smallest absolute location, used to order blocks for presentation
    pub fn min_abs(&self) -> Option<u64> {
        self.0.iter().map(|loc| loc.unsigned_abs()).min()
    }
}

impl From<Vec<Location>> for Block {
    fn from(locations: Vec<Location>) -> Self {
        Self(locations.into())
    }
}

impl From<&[Location]> for Block {
    fn from(locations: &[Location]) -> Self {
        Self(locations.into())
    }
}

impl<const N: usize> From<[Location; N]> for Block {
    fn from(locations: [Location; N]) -> Self {
        Self(Arc::from(locations.as_slice()))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, loc) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{loc}")?;
        }
        write!(f, ")")
    }
}

/// Sort key that orders blocks by their smallest absolute location.
pub(crate) fn presentation_order(a: &Block, b: &Block) -> std::cmp::Ordering {
    a.min_abs()
        .cmp(&b.min_abs())
        .then_with(|| a.locations().cmp(b.locations()))
}

/// The set of one annotator's blocks that together cover one equivalence class.
pub type Superblock = BTreeSet<Block>;

// ============================================================================
// Annotator Mapping
// ============================================================================

/// One annotator's assignment of every location it observed to the exact
/// block containing it.
///
/// Serializes as the list of distinct blocks, which is enough to rebuild the
/// mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Block>", into = "Vec<Block>")]
pub struct AnnotatorMapping {
    loc_to_block: FxHashMap<Location, Block>,
}

impl AnnotatorMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from blocks: every location of every block maps to
    /// that block. A location listed in two blocks maps to the later one and
    /// leaves the mapping inconsistent; see [`AnnotatorMapping::validate`].
    pub fn from_blocks<B: Into<Block>>(blocks: impl IntoIterator<Item = B>) -> Self {
        let mut mapping = Self::new();
        for block in blocks {
            mapping.insert_block(block.into());
        }
        mapping
    }

    /// Map every location of `block` to it
    pub fn insert_block(&mut self, block: Block) {
        for &loc in block.locations() {
            self.loc_to_block.insert(loc, block.clone());
        }
    }

    /// Map a single location to a block. The mapping is only consistent once
    /// every location of `block` maps to it.
    pub fn insert(&mut self, loc: Location, block: Block) {
        self.loc_to_block.insert(loc, block);
    }

    /// The block containing `loc`, if this annotator observed it
    pub fn block_of(&self, loc: Location) -> Option<&Block> {
        self.loc_to_block.get(&loc)
    }

    /// Check if this annotator observed `loc`
    pub fn contains(&self, loc: Location) -> bool {
        self.loc_to_block.contains_key(&loc)
    }

    /// Iterate `(location, block)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (Location, &Block)> {
        self.loc_to_block.iter().map(|(&loc, block)| (loc, block))
    }

    /// Iterate observed locations in arbitrary order
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.loc_to_block.keys().copied()
    }

    /// Distinct blocks, ordered by smallest absolute location
    pub fn distinct_blocks(&self) -> Vec<Block> {
        let unique: BTreeSet<&Block> = self.loc_to_block.values().collect();
        let mut blocks: Vec<Block> = unique.into_iter().cloned().collect();
        blocks.sort_by(presentation_order);
        blocks
    }

    /// Check that the mapping describes a segmentation: every block contains
    /// the location mapped to it, and every location of a block maps back to
    /// that same block. Overlapping blocks fail the second check.
    pub fn validate(&self) -> Result<()> {
        for (loc, block) in self.iter() {
            if !block.locations().contains(&loc) {
                return Err(EqBleuError::precondition(format!(
                    "location {loc} is mapped to {block}, which does not contain it"
                )));
            }
            for &other in block.locations() {
                if self.block_of(other) != Some(block) {
                    return Err(EqBleuError::precondition(format!(
                        "location {other} of block {block} does not map back to it"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of observed locations
    pub fn len(&self) -> usize {
        self.loc_to_block.len()
    }

    /// Check if the annotator observed nothing
    pub fn is_empty(&self) -> bool {
        self.loc_to_block.is_empty()
    }
}

impl From<Vec<Block>> for AnnotatorMapping {
    fn from(blocks: Vec<Block>) -> Self {
        Self::from_blocks(blocks)
    }
}

impl From<AnnotatorMapping> for Vec<Block> {
    fn from(mapping: AnnotatorMapping) -> Self {
        mapping.distinct_blocks()
    }
}

impl<B: Into<Block>> FromIterator<B> for AnnotatorMapping {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        Self::from_blocks(iter)
    }
}

// ============================================================================
// Class Id
// ============================================================================

/// Serial identifier of an equivalence class.
///
/// Ids are bookkeeping only: a merge retires the ids of every participant and
/// hands out a fresh one, so the same partition can carry different ids
/// depending on processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EQ{}", self.0)
    }
}

// ============================================================================
// Merge Mode
// ============================================================================

/// Consistency regime used while merging annotators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Any number of fully trusted annotators; every location is positive.
    #[default]
    Trusted,
    /// Exactly two annotators whose blocks may carry tentative (negative)
    /// locations.
    Uncertain,
}

impl MergeMode {
    /// Check the annotator list against this regime's preconditions
    pub fn validate(self, annotators: &[AnnotatorMapping]) -> Result<()> {
        if self == MergeMode::Uncertain && annotators.len() != 2 {
            return Err(EqBleuError::precondition(format!(
                "uncertain mode requires exactly 2 annotators, got {}",
                annotators.len()
            )));
        }
        for (idx, annotator) in annotators.iter().enumerate() {
            if let Err(EqBleuError::Precondition { message }) = annotator.validate() {
                return Err(EqBleuError::precondition(format!("annotator {idx}: {message}")));
            }
        }

        match self {
            MergeMode::Trusted => {
                for (idx, annotator) in annotators.iter().enumerate() {
                    for (loc, block) in annotator.iter() {
                        if !is_confirmed(loc) {
                            return Err(EqBleuError::precondition(format!(
                                "trusted mode requires positive locations, annotator {idx} maps {loc}"
                            )));
                        }
                        if !block.is_fully_confirmed() {
                            return Err(EqBleuError::precondition(format!(
                                "trusted mode requires positive blocks, annotator {idx} has {block}"
                            )));
                        }
                    }
                }
                Ok(())
            }
            MergeMode::Uncertain => Ok(()),
        }
    }

    /// Whether a class whose closure touched `participants` classes and
    /// absorbed new locations must be replaced by a fresh class.
    ///
    /// Trusted mode only ever grows through confirmed locations; uncertain
    /// mode also recreates a class that picked up tentative locations alone.
    pub fn replaces(self, participants: usize, grew_confirmed: bool, grew_tentative: bool) -> bool {
        let merged = participants > 1;
        match self {
            MergeMode::Trusted => merged || grew_confirmed,
            MergeMode::Uncertain => merged || grew_confirmed || grew_tentative,
        }
    }

    /// Whether combinatorial enumeration is defined for this regime
    pub fn supports_enumeration(self) -> bool {
        matches!(self, MergeMode::Trusted)
    }
}

impl std::str::FromStr for MergeMode {
    type Err = EqBleuError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "trusted" | "all_gt" | "gt" => Ok(MergeMode::Trusted),
            "uncertain" | "tentative" => Ok(MergeMode::Uncertain),
            other => Err(EqBleuError::invalid_config(format!(
                "unknown merge mode '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Scoring Configuration
// ============================================================================

/// Smoothing applied to orders with zero matched n-grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// Leave the precision at zero
    #[default]
    None,
    /// Replace the match count with a fixed floor value
    Floor,
    /// Halve the pseudo-count each time a zero is met (mteval style)
    Exp,
}

impl std::str::FromStr for Smoothing {
    type Err = EqBleuError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "none" => Ok(Smoothing::None),
            "floor" => Ok(Smoothing::Floor),
            "exp" => Ok(Smoothing::Exp),
            other => Err(EqBleuError::invalid_config(format!(
                "unknown smoothing method '{other}'"
            ))),
        }
    }
}

/// Whether n-grams may cross the boundary between blocks of one superblock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NgramSpan {
    /// N-grams are formed inside each block text only
    #[default]
    Block,
    /// Block texts of a superblock are joined with a space first, so n-grams
    /// may run across block boundaries
    Superblock,
}

/// Configuration for BLEU scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BleuConfig {
    /// Smoothing method for zero-match orders
    #[serde(default)]
    pub smoothing: Smoothing,
    /// Pseudo-count used by `Smoothing::Floor`
    #[serde(default = "default_smooth_floor")]
    pub smooth_floor: f64,
    /// Scale the geometric mean to the highest order that has n-grams
    #[serde(default)]
    pub use_effective_order: bool,
    /// N-gram boundary policy for superblock texts
    #[serde(default)]
    pub ngram_span: NgramSpan,
}

fn default_smooth_floor() -> f64 {
    0.01
}

impl Default for BleuConfig {
    fn default() -> Self {
        Self {
            smoothing: Smoothing::None,
            smooth_floor: default_smooth_floor(),
            use_effective_order: false,
            ngram_span: NgramSpan::Block,
        }
    }
}

impl BleuConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BleuConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.smooth_floor.is_finite() || self.smooth_floor < 0.0 {
            return Err(EqBleuError::invalid_config(format!(
                "smooth_floor must be a finite value >= 0, got {}",
                self.smooth_floor
            )));
        }
        Ok(())
    }

    /// Builder method: set smoothing method
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Builder method: set floor value for `Smoothing::Floor`
    pub fn with_smooth_floor(mut self, floor: f64) -> Self {
        self.smooth_floor = floor;
        self
    }

    /// Builder method: enable or disable effective order
    pub fn with_effective_order(mut self, enabled: bool) -> Self {
        self.use_effective_order = enabled;
        self
    }

    /// Builder method: set n-gram span policy
    pub fn with_ngram_span(mut self, span: NgramSpan) -> Self {
        self.ngram_span = span;
        self
    }
}
