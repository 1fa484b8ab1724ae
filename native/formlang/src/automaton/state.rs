//! Sets of states, stored as bit sets indexed by state id.

use fixedbitset::FixedBitSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dense index of a state in its automaton's name table.
pub type StateId = u32;

/// A set of state ids.
///
/// The bit set grows on demand, so two sets may hold the same members at
/// different capacities. Equality and hashing look at the members only,
/// which lets a `StateSet` key the subset table of a DFA conversion.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// An empty set with room for ids below `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    pub fn insert(&mut self, state: StateId) {
        let bit = state as usize;
        self.bits.grow(bit + 1);
        self.bits.insert(bit);
    }

    pub fn remove(&mut self, state: StateId) {
        let bit = state as usize;
        if bit < self.bits.len() {
            self.bits.set(bit, false);
        }
    }

    /// Ids past the current capacity are never members.
    pub fn contains(&self, state: StateId) -> bool {
        self.bits.contains(state as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|bit| bit as StateId)
    }

    pub fn union_with(&mut self, other: &StateSet) {
        self.bits.grow(other.bits.len());
        self.bits.union_with(&other.bits);
    }

    pub fn intersects(&self, other: &StateSet) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    pub fn intersection(&self, other: &StateSet) -> StateSet {
        let mut bits = self.bits.clone();
        bits.intersect_with(&other.bits);
        Self { bits }
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &StateSet) -> StateSet {
        let mut bits = self.bits.clone();
        bits.difference_with(&other.bits);
        Self { bits }
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for member in self.iter() {
            member.hash(state);
        }
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = Self::default();
        for state in iter {
            set.insert(state);
        }
        set
    }
}
