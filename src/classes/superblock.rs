//! Superblock resolution
//!
//! Once the classes are frozen, each annotator covers each class with a set of
//! its own blocks: the superblock. Annotators that agree on a class produce the
//! same superblock, so the per-annotator list is deduplicated into the distinct
//! ways the class can be segmented.

use crate::types::{is_confirmed, AnnotatorMapping, Location, Superblock};
use std::collections::BTreeSet;

/// Computes per-annotator superblocks for finalized classes
#[derive(Debug, Clone, Copy)]
pub struct SuperblockResolver<'a> {
    annotators: &'a [AnnotatorMapping],
}

impl<'a> SuperblockResolver<'a> {
    /// Create a resolver over the annotators used to build the classes
    pub fn new(annotators: &'a [AnnotatorMapping]) -> Self {
        Self { annotators }
    }

    /// One superblock per annotator, in annotator order
    pub fn superblocks(&self, members: &BTreeSet<Location>) -> Vec<Superblock> {
        self.annotators
            .iter()
            .map(|annotator| find_superblock(members, annotator))
            .collect()
    }

    /// Per-annotator superblocks and their deduplicated list
    pub fn resolve(&self, members: &BTreeSet<Location>) -> (Vec<Superblock>, Vec<Superblock>) {
        let superblocks = self.superblocks(members);
        let unique = unique_superblocks(&superblocks);
        (superblocks, unique)
    }
}

/// The set of `annotator`'s blocks containing any confirmed member.
///
/// A class made only of tentative locations falls back to every member, so a
/// prediction block that no ground-truth block confirms still shows up on the
/// annotator that produced it.
pub fn find_superblock(members: &BTreeSet<Location>, annotator: &AnnotatorMapping) -> Superblock {
    let has_confirmed = members.iter().any(|&loc| is_confirmed(loc));
    members
        .iter()
        .copied()
        .filter(|&loc| !has_confirmed || is_confirmed(loc))
        .filter_map(|loc| annotator.block_of(loc).cloned())
        .collect()
}

/// Remove exact duplicate superblocks, keeping first-seen order.
///
/// Only identical sets collapse; a superblock that is a subset of another is
/// kept.
pub fn unique_superblocks(superblocks: &[Superblock]) -> Vec<Superblock> {
    let mut unique: Vec<Superblock> = Vec::with_capacity(superblocks.len());
    for sb in superblocks {
        if !unique.contains(sb) {
            unique.push(sb.clone());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Block;

    fn sb(blocks: &[&[Location]]) -> Superblock {
        blocks.iter().map(|b| Block::from(*b)).collect()
    }

    #[test]
    fn test_find_superblock_collects_covering_blocks() {
        let annotator = AnnotatorMapping::from_blocks([vec![1], vec![2, 3], vec![4, 5]]);
        let members = BTreeSet::from([1, 2, 3]);
        assert_eq!(
            find_superblock(&members, &annotator),
            sb(&[&[1], &[2, 3]])
        );
    }

    #[test]
    fn test_find_superblock_ignores_tentative_members() {
        // -3 belongs to a block of its own on this annotator; it must not pull
        // that block in while confirmed members exist.
        let annotator = AnnotatorMapping::from_blocks([vec![1, 2], vec![-3]]);
        let members = BTreeSet::from([1, 2, -3]);
        assert_eq!(find_superblock(&members, &annotator), sb(&[&[1, 2]]));
    }

    #[test]
    fn test_find_superblock_tentative_only_class() {
        let annotator = AnnotatorMapping::from_blocks([vec![-8, -9]]);
        let members = BTreeSet::from([-9, -8]);
        assert_eq!(find_superblock(&members, &annotator), sb(&[&[-8, -9]]));

        let other = AnnotatorMapping::from_blocks([vec![1]]);
        assert!(find_superblock(&members, &other).is_empty());
    }

    #[test]
    fn test_unique_preserves_first_seen_order() {
        let a = sb(&[&[1], &[2, 3]]);
        let b = sb(&[&[1, 2, 3]]);
        let unique = unique_superblocks(&[a.clone(), b.clone(), b.clone(), a.clone()]);
        assert_eq!(unique, vec![a, b]);
    }

    #[test]
    fn test_unique_keeps_subsets() {
        let small = sb(&[&[1]]);
        let large = sb(&[&[1], &[2]]);
        let unique = unique_superblocks(&[large.clone(), small.clone()]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique, vec![large, small]);
    }

    #[test]
    fn test_resolver_over_three_annotators() {
        let annotators = vec![
            AnnotatorMapping::from_blocks([vec![4, 5]]),
            AnnotatorMapping::from_blocks([vec![5, 4]]),
            AnnotatorMapping::from_blocks([vec![4, 5]]),
        ];
        let (all, unique) = SuperblockResolver::new(&annotators).resolve(&BTreeSet::from([4, 5]));
        assert_eq!(all.len(), 3);
        assert_eq!(unique, vec![sb(&[&[4, 5]]), sb(&[&[5, 4]])]);
    }
}
