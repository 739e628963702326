//! Equivalence classes over annotator segmentations
//!
//! - [`builder`]: merges annotators into maximal agreement classes
//! - [`table`]: the disjoint-set table the builder mutates
//! - [`superblock`]: per-annotator covers of each finalized class
//! - [`combinations`]: lazy enumeration of admissible global groupings
//! - [`observer`]: hooks into the build process

pub mod builder;
pub mod combinations;
pub mod observer;
pub mod superblock;
pub mod table;

use crate::bleu::Segment;
use crate::errors::{EqBleuError, Result};
use crate::types::{presentation_order, Block, ClassId, Location, MergeMode, Superblock};
use combinations::AllCombinations;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A finalized equivalence class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EqClass {
    id: ClassId,
    members: BTreeSet<Location>,
    /// One superblock per annotator, in annotator order
    superblocks: Vec<Superblock>,
    /// Distinct superblocks in first-seen order
    unique_superblocks: Vec<Superblock>,
}

impl EqClass {
    pub(crate) fn new(
        id: ClassId,
        members: BTreeSet<Location>,
        superblocks: Vec<Superblock>,
        unique_superblocks: Vec<Superblock>,
    ) -> Self {
        Self {
            id,
            members,
            superblocks,
            unique_superblocks,
        }
    }

    /// Serial id of the class
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Every location carried by the class, tentative ones included
    pub fn members(&self) -> &BTreeSet<Location> {
        &self.members
    }

    /// Confirmed (positive) members
    pub fn confirmed_members(&self) -> impl Iterator<Item = Location> + '_ {
        self.members.iter().copied().filter(|&loc| loc > 0)
    }

    /// Superblock of each annotator, in annotator order
    pub fn superblocks(&self) -> &[Superblock] {
        &self.superblocks
    }

    /// Superblock of one annotator
    pub fn superblock(&self, annotator: usize) -> Option<&Superblock> {
        self.superblocks.get(annotator)
    }

    /// Distinct superblocks in first-seen annotator order
    pub fn unique_superblocks(&self) -> &[Superblock] {
        &self.unique_superblocks
    }
}

fn sorted_blocks(sb: &Superblock) -> Vec<&Block> {
    let mut blocks: Vec<&Block> = sb.iter().collect();
    blocks.sort_by(|a, b| presentation_order(a, b));
    blocks
}

fn write_blocks(f: &mut fmt::Formatter<'_>, label: &str, sb: &Superblock) -> fmt::Result {
    write!(f, "\n{label}: [")?;
    for (i, block) in sorted_blocks(sb).into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{block}")?;
    }
    write!(f, "]")
}

impl fmt::Display for EqClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members: Vec<Location> = self.members.iter().copied().collect();
        members.sort_by_key(|loc| loc.unsigned_abs());
        write!(f, "{}: {:?}", self.id, members)?;
        for (i, sb) in self.superblocks.iter().enumerate() {
            write_blocks(f, &format!("sb{i}"), sb)?;
        }
        for (i, sb) in self.unique_superblocks.iter().enumerate() {
            write_blocks(f, &format!("Uniq{i}"), sb)?;
        }
        Ok(())
    }
}

/// Frozen output of the builder
#[derive(Debug, Clone)]
pub struct EqClasses {
    mode: MergeMode,
    annotator_count: usize,
    /// Ordered by id
    classes: Vec<EqClass>,
    location_to_class: FxHashMap<Location, ClassId>,
}

impl EqClasses {
    pub(crate) fn new(
        mode: MergeMode,
        annotator_count: usize,
        classes: Vec<EqClass>,
        location_to_class: FxHashMap<Location, ClassId>,
    ) -> Self {
        Self {
            mode,
            annotator_count,
            classes,
            location_to_class,
        }
    }

    /// The regime the classes were built under
    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Number of annotators merged
    pub fn annotator_count(&self) -> usize {
        self.annotator_count
    }

    /// All classes, ordered by id
    pub fn classes(&self) -> &[EqClass] {
        &self.classes
    }

    /// Look up a class by id
    pub fn get(&self, id: ClassId) -> Option<&EqClass> {
        self.classes
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|idx| &self.classes[idx])
    }

    /// The class a location was last assigned to
    pub fn class_of(&self, loc: Location) -> Option<&EqClass> {
        self.location_to_class
            .get(&loc)
            .and_then(|&id| self.get(id))
    }

    /// The location → class index
    pub fn location_index(&self) -> &FxHashMap<Location, ClassId> {
        &self.location_to_class
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if there are no classes
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The partition as a set of member sets, independent of class ids
    pub fn partition(&self) -> BTreeSet<BTreeSet<Location>> {
        self.classes.iter().map(|c| c.members.clone()).collect()
    }

    /// Every admissible global grouping: one distinct superblock per class,
    /// unioned. Empty unless the classes were built in trusted mode.
    pub fn all_combinations(&self) -> AllCombinations<'_> {
        if self.mode.supports_enumeration() {
            AllCombinations::new(&self.classes)
        } else {
            AllCombinations::empty()
        }
    }

    /// Pair each class's `reference` superblock with its `candidate`
    /// superblock, blocks ordered by smallest absolute location.
    pub fn segments(&self, reference: usize, candidate: usize) -> Result<Vec<Segment<Block>>> {
        for idx in [reference, candidate] {
            if idx >= self.annotator_count {
                return Err(EqBleuError::precondition(format!(
                    "annotator {idx} out of range, {} annotators merged",
                    self.annotator_count
                )));
            }
        }

        Ok(self
            .classes
            .iter()
            .map(|class| {
                let collect = |idx: usize| -> Vec<Block> {
                    sorted_blocks(&class.superblocks[idx])
                        .into_iter()
                        .cloned()
                        .collect()
                };
                Segment::new(collect(reference), collect(candidate))
            })
            .collect())
    }
}

impl fmt::Display for EqClasses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{class}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::builder::build_equivalence_classes;
    use super::*;
    use crate::types::AnnotatorMapping;

    fn uncertain_pair() -> EqClasses {
        let a = AnnotatorMapping::from_blocks([vec![1, 2, -3, 4, -5], vec![6, 7]]);
        let b = AnnotatorMapping::from_blocks([vec![1, 2, 4, 7], vec![6], vec![-8, -9]]);
        build_equivalence_classes(&[a, b], MergeMode::Uncertain).unwrap()
    }

    #[test]
    fn test_segments_pair_reference_and_candidate() {
        let classes = uncertain_pair();
        let segments = classes.segments(0, 1).unwrap();
        assert_eq!(segments.len(), 2);

        assert_eq!(
            segments[0].references,
            vec![Block::from([1, 2, -3, 4, -5]), Block::from([6, 7])]
        );
        assert_eq!(
            segments[0].candidates,
            vec![Block::from([1, 2, 4, 7]), Block::from([6])]
        );
        assert!(segments[1].references.is_empty());
        assert_eq!(segments[1].candidates, vec![Block::from([-8, -9])]);
    }

    #[test]
    fn test_segments_reject_unknown_annotator() {
        let classes = uncertain_pair();
        assert!(classes.segments(0, 2).unwrap_err().is_precondition());
    }

    #[test]
    fn test_uncertain_mode_has_no_combinations() {
        let classes = uncertain_pair();
        assert_eq!(classes.all_combinations().count(), 0);
    }

    #[test]
    fn test_get_and_class_of_agree() {
        let classes = uncertain_pair();
        for class in classes.classes() {
            assert_eq!(classes.get(class.id()), Some(class));
            for loc in class.confirmed_members() {
                assert_eq!(classes.class_of(loc).map(|c| c.id()), Some(class.id()));
            }
        }
    }

    #[test]
    fn test_display_lists_members_and_superblocks() {
        let classes = uncertain_pair();
        let text = classes.to_string();
        assert!(text.contains("[1, 2, -3, 4, -5, 6, 7]"));
        assert!(text.contains("sb0: [(1, 2, -3, 4, -5), (6, 7)]"));
        assert!(text.contains("sb1: [(1, 2, 4, 7), (6)]"));
        assert!(text.contains("Uniq1: [(-8, -9)]"));
    }
}
