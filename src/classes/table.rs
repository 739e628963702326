//! Disjoint-set class table
//!
//! The table owns the live equivalence classes while the builder runs. Each
//! class is a member set keyed by its [`ClassId`]; a location index maps every
//! indexed location to the class currently holding it. Merging is a single
//! atomic replace: the participants are retired and one fresh class holding
//! the union takes their place, with every member re-indexed to it.

use crate::types::{ClassId, Location};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

/// Live equivalence classes plus the location → class index
#[derive(Debug, Default)]
pub struct ClassTable {
    /// Ordered by id, i.e. by creation order
    classes: BTreeMap<ClassId, BTreeSet<Location>>,
    index: FxHashMap<Location, ClassId>,
    next_id: u32,
}

impl ClassTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a class holding `members`, returning its fresh id
    pub fn create(&mut self, members: impl IntoIterator<Item = Location>) -> ClassId {
        let id = ClassId(self.next_id);
        self.next_id += 1;

        let members: BTreeSet<Location> = members.into_iter().collect();
        for &loc in &members {
            self.index.insert(loc, id);
        }
        self.classes.insert(id, members);
        id
    }

    /// Retire every class in `replaced` and create one class holding
    /// `members`, which must contain every retired member.
    pub fn replace(&mut self, replaced: &[ClassId], members: BTreeSet<Location>) -> ClassId {
        for id in replaced {
            if let Some(old) = self.classes.remove(id) {
                debug_assert!(old.is_subset(&members), "merge must not drop members");
            }
        }
        self.create(members)
    }

    /// The class currently holding `loc`
    pub fn class_of(&self, loc: Location) -> Option<ClassId> {
        self.index.get(&loc).copied()
    }

    /// Check if `loc` has been assigned to a class
    pub fn is_indexed(&self, loc: Location) -> bool {
        self.index.contains_key(&loc)
    }

    /// Members of a live class
    pub fn members(&self, id: ClassId) -> Option<&BTreeSet<Location>> {
        self.classes.get(&id)
    }

    /// Ids of the live classes in creation order
    pub fn ids(&self) -> Vec<ClassId> {
        self.classes.keys().copied().collect()
    }

    /// Number of live classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the table holds no class
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Freeze the table into its classes and location index
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<ClassId, BTreeSet<Location>>,
        FxHashMap<Location, ClassId>,
    ) {
        (self.classes, self.index)
    }
}
