//! Equivalence-class builder
//!
//! Merges the block assignments of K annotators into maximal agreement
//! classes. The first annotator seeds one class per block; every later
//! annotator is folded in by closing each live class over that annotator's
//! blocks and over the classes those blocks reach.
//!
//! Only confirmed (positive) locations drive the closure. Tentative locations
//! discovered along the way are carried into the class but never pull in
//! further blocks or classes.

use super::observer::{ClassObserver, NoopObserver};
use super::superblock::SuperblockResolver;
use super::table::ClassTable;
use super::{EqClass, EqClasses};
use crate::errors::Result;
use crate::types::{is_confirmed, AnnotatorMapping, ClassId, Location, MergeMode};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Builds [`EqClasses`] from a list of annotator mappings
#[derive(Debug, Clone, Copy, Default)]
pub struct EquivalenceClassBuilder {
    mode: MergeMode,
}

/// Result of closing one class over one annotator
#[derive(Debug)]
struct Closure {
    members: BTreeSet<Location>,
    /// The starting class first, then every class pulled in
    participants: Vec<ClassId>,
}

impl EquivalenceClassBuilder {
    /// Create a builder for the given regime
    pub fn new(mode: MergeMode) -> Self {
        Self { mode }
    }

    /// The regime this builder enforces
    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Build the classes
    pub fn build(&self, annotators: &[AnnotatorMapping]) -> Result<EqClasses> {
        self.build_with_observer(annotators, &mut NoopObserver)
    }

    /// Build the classes, reporting every creation and round to `observer`
    pub fn build_with_observer<O: ClassObserver>(
        &self,
        annotators: &[AnnotatorMapping],
        observer: &mut O,
    ) -> Result<EqClasses> {
        trace_stage!("build_classes");
        self.mode.validate(annotators)?;

        let mut table = ClassTable::new();
        for (idx, annotator) in annotators.iter().enumerate() {
            if idx == 0 {
                self.seed(&mut table, annotator, observer);
            } else {
                self.expand(&mut table, annotator, observer);
            }
            trace_event!(annotator = idx, classes = table.len(), "annotator merged");
            observer.on_round_complete(idx, table.len());
        }

        Ok(self.finalize(table, annotators))
    }

    /// One class per distinct block of the first annotator
    fn seed<O: ClassObserver>(
        &self,
        table: &mut ClassTable,
        annotator: &AnnotatorMapping,
        observer: &mut O,
    ) {
        for block in annotator.distinct_blocks() {
            let id = table.create(block.locations().iter().copied());
            notify_created(table, observer, id, &[]);
        }
    }

    /// Fold one more annotator into the live classes
    fn expand<O: ClassObserver>(
        &self,
        table: &mut ClassTable,
        annotator: &AnnotatorMapping,
        observer: &mut O,
    ) {
        let mut done: FxHashSet<ClassId> = FxHashSet::default();

        for id in table.ids() {
            if done.contains(&id) {
                continue;
            }
            let Some(original) = table.members(id) else {
                continue;
            };
            let before_confirmed = original.iter().filter(|&&l| is_confirmed(l)).count();
            let before_total = original.len();

            let closure = close_over(table, id, annotator);
            done.extend(closure.participants.iter().copied());

            let after_confirmed = closure.members.iter().filter(|&&l| is_confirmed(l)).count();
            let grew_confirmed = after_confirmed > before_confirmed;
            let grew_tentative =
                closure.members.len() - after_confirmed > before_total - before_confirmed;

            if self
                .mode
                .replaces(closure.participants.len(), grew_confirmed, grew_tentative)
            {
                trace_event!(
                    participants = closure.participants.len(),
                    members = closure.members.len(),
                    "classes merged"
                );
                let new_id = table.replace(&closure.participants, closure.members);
                notify_created(table, observer, new_id, &closure.participants);
            }
        }

        // Blocks this annotator introduces that no live class reached.
        for block in annotator.distinct_blocks() {
            if block.locations().iter().any(|&loc| !table.is_indexed(loc)) {
                let id = table.create(block.locations().iter().copied());
                notify_created(table, observer, id, &[]);
            }
        }
    }

    /// Freeze the table and compute superblocks
    fn finalize(&self, table: ClassTable, annotators: &[AnnotatorMapping]) -> EqClasses {
        let resolver = SuperblockResolver::new(annotators);
        let (classes, index) = table.into_parts();
        let classes = classes
            .into_iter()
            .map(|(id, members)| {
                let (superblocks, unique) = resolver.resolve(&members);
                EqClass::new(id, members, superblocks, unique)
            })
            .collect();
        EqClasses::new(self.mode, annotators.len(), classes, index)
    }
}

/// Close class `id` over `annotator`'s blocks and the live classes they reach.
///
/// The member set only ever grows and is bounded by the locations of the
/// table plus the annotator, so the loop terminates.
fn close_over(table: &ClassTable, id: ClassId, annotator: &AnnotatorMapping) -> Closure {
    let mut members: BTreeSet<Location> = table.members(id).cloned().unwrap_or_default();
    let mut participants = vec![id];

    loop {
        let reached: BTreeSet<Location> = members
            .iter()
            .copied()
            .filter(|&loc| is_confirmed(loc))
            .filter_map(|loc| annotator.block_of(loc))
            .flat_map(|block| block.locations().iter().copied())
            .collect();

        let discovered: Vec<Location> = reached
            .iter()
            .copied()
            .filter(|&loc| is_confirmed(loc) && !members.contains(&loc))
            .collect();

        if discovered.is_empty() {
            // Fixed point: only tentative locations can still be new.
            members.extend(reached);
            break;
        }

        for loc in discovered {
            if members.contains(&loc) {
                continue;
            }
            // Locations this annotator introduces are not indexed yet; they
            // join through `reached` alone.
            if let Some(owner) = table.class_of(loc) {
                if !participants.contains(&owner) {
                    participants.push(owner);
                    if let Some(owned) = table.members(owner) {
                        members.extend(owned.iter().copied());
                    }
                }
            }
        }
        members.extend(reached);
    }

    Closure {
        members,
        participants,
    }
}

fn notify_created<O: ClassObserver>(
    table: &ClassTable,
    observer: &mut O,
    id: ClassId,
    replaced: &[ClassId],
) {
    if let Some(members) = table.members(id) {
        observer.on_class_created(id, members, replaced);
    }
}

/// Convenience function to build equivalence classes
pub fn build_equivalence_classes(
    annotators: &[AnnotatorMapping],
    mode: MergeMode,
) -> Result<EqClasses> {
    EquivalenceClassBuilder::new(mode).build(annotators)
}
