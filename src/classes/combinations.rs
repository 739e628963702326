//! Enumeration of admissible global groupings
//!
//! Each class can be segmented in as many ways as it has distinct
//! superblocks. A global grouping picks one superblock per class and takes
//! the union of their blocks, so there are `∏ L_i` groupings for `L_i`
//! distinct superblocks in class `i`.

use super::EqClass;
use crate::product::CartesianProduct;
use crate::types::{Block, Superblock};
use std::collections::BTreeSet;

/// Lazy iterator over every global grouping, classes visited in order.
///
/// Built fresh by [`EqClasses::all_combinations`](super::EqClasses::all_combinations);
/// every call walks the same sequence independently.
#[derive(Debug, Clone)]
pub struct AllCombinations<'a> {
    inner: Option<CartesianProduct<'a, Superblock>>,
}

impl<'a> AllCombinations<'a> {
    pub(crate) fn new(classes: &'a [EqClass]) -> Self {
        let choices = classes.iter().map(|c| c.unique_superblocks()).collect();
        Self {
            inner: Some(CartesianProduct::from_slices(choices)),
        }
    }

    pub(crate) fn empty() -> Self {
        Self { inner: None }
    }

    /// Number of groupings, or `None` if it overflows `usize`
    pub fn checked_total(&self) -> Option<usize> {
        match &self.inner {
            Some(product) => product.checked_total(),
            None => Some(0),
        }
    }
}

impl<'a> Iterator for AllCombinations<'a> {
    type Item = BTreeSet<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let selection = self.inner.as_mut()?.next()?;
        Some(
            selection
                .into_iter()
                .flat_map(|sb| sb.iter().cloned())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::classes::builder::build_equivalence_classes;
    use crate::types::{AnnotatorMapping, Block, MergeMode};
    use std::collections::BTreeSet;

    fn three_annotators() -> Vec<AnnotatorMapping> {
        vec![
            AnnotatorMapping::from_blocks([vec![1], vec![2, 3], vec![4, 5]]),
            AnnotatorMapping::from_blocks([vec![1, 2, 3], vec![5, 4]]),
            AnnotatorMapping::from_blocks([vec![1, 2, 3], vec![4, 5]]),
        ]
    }

    #[test]
    fn test_cardinality_is_product_of_unique_counts() {
        let classes = build_equivalence_classes(&three_annotators(), MergeMode::Trusted).unwrap();
        let expected: usize = classes
            .classes()
            .iter()
            .map(|c| c.unique_superblocks().len())
            .product();
        assert_eq!(expected, 4);
        assert_eq!(classes.all_combinations().checked_total(), Some(4));
        assert_eq!(classes.all_combinations().count(), 4);
    }

    #[test]
    fn test_each_combination_covers_every_location_once() {
        let classes = build_equivalence_classes(&three_annotators(), MergeMode::Trusted).unwrap();
        for combo in classes.all_combinations() {
            let mut covered: Vec<i64> = combo
                .iter()
                .flat_map(|b| b.locations().iter().copied())
                .collect();
            covered.sort_unstable();
            assert_eq!(covered, vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn test_combinations_are_distinct_and_reiterable() {
        let classes = build_equivalence_classes(&three_annotators(), MergeMode::Trusted).unwrap();
        let first: Vec<BTreeSet<Block>> = classes.all_combinations().collect();
        let second: Vec<BTreeSet<Block>> = classes.all_combinations().collect();
        assert_eq!(first, second);

        let distinct: BTreeSet<&BTreeSet<Block>> = first.iter().collect();
        assert_eq!(distinct.len(), first.len());
        assert!(first.contains(&BTreeSet::from([
            Block::from([1]),
            Block::from([2, 3]),
            Block::from([5, 4]),
        ])));
    }
}
