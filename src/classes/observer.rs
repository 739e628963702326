//! Build observers
//!
//! Hooks called while the equivalence-class builder runs. The default
//! [`NoopObserver`] ignores everything and costs nothing; tests and tooling
//! implement [`ClassObserver`] to watch merges happen.

use crate::types::{ClassId, Location};
use std::collections::BTreeSet;

/// Receives builder events in the order they happen.
pub trait ClassObserver {
    /// A class was created. `replaced` lists the classes it supersedes
    /// (empty for seeds and fresh blocks).
    fn on_class_created(
        &mut self,
        _id: ClassId,
        _members: &BTreeSet<Location>,
        _replaced: &[ClassId],
    ) {
    }

    /// Annotator `annotator` has been fully merged; `live_classes` classes
    /// remain.
    fn on_round_complete(&mut self, _annotator: usize, _live_classes: usize) {}
}

/// Observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ClassObserver for NoopObserver {}

/// Observer that records every event, for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// `(new id, members, replaced ids)` per creation
    pub created: Vec<(ClassId, BTreeSet<Location>, Vec<ClassId>)>,
    /// `(annotator, live classes)` per round
    pub rounds: Vec<(usize, usize)>,
}

impl ClassObserver for RecordingObserver {
    fn on_class_created(
        &mut self,
        id: ClassId,
        members: &BTreeSet<Location>,
        replaced: &[ClassId],
    ) {
        self.created.push((id, members.clone(), replaced.to_vec()));
    }

    fn on_round_complete(&mut self, annotator: usize, live_classes: usize) {
        self.rounds.push((annotator, live_classes));
    }
}
