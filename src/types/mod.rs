//! # Learning Tables
//!
//! Keyed storage shared by the Actor and the tabular Critic.
//!
//! - [`ValueTable`]: learned estimates, persisted for the agent's lifetime
//! - [`EligibilityTrace`]: per-episode credit, discarded at every episode boundary
//! - [`Trajectory`]: insertion-ordered visits of the current episode
//!
//! Absent keys read as `0.0` through [`ValueTable::get_or_default`] and
//! [`EligibilityTrace::get_or_default`]; reading never inserts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Bound satisfied by every key type stored in the learning tables
pub trait TableKey: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> TableKey for T {}

/// A (state, action) pair used as the Actor's table key.
///
/// Two keys are equal iff both components are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateActionKey<S, A> {
    pub state: S,
    pub action: A,
}

impl<S, A> StateActionKey<S, A> {
    pub fn new(state: S, action: A) -> Self {
        StateActionKey { state, action }
    }
}

/// Real-valued estimates with lazy default-zero lookups
#[derive(Clone, Debug)]
pub struct ValueTable<K: TableKey> {
    values: HashMap<K, f32>,
}

impl<K: TableKey> Default for ValueTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey> ValueTable<K> {
    pub fn new() -> Self {
        ValueTable {
            values: HashMap::new(),
        }
    }

    /// Stored value, or `0.0` for keys never written
    #[inline]
    pub fn get_or_default(&self, key: &K) -> f32 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn get(&self, key: &K) -> Option<f32> {
        self.values.get(key).copied()
    }

    #[inline]
    pub fn set(&mut self, key: K, value: f32) {
        self.values.insert(key, value);
    }

    /// `value(key) += delta`, creating the entry at zero first
    pub fn add(&mut self, key: K, delta: f32) {
        *self.values.entry(key).or_insert(0.0) += delta;
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &f32)> {
        self.values.iter()
    }

    /// Flatten into (key, value) pairs for persistence
    pub fn to_entries(&self) -> Vec<(K, f32)> {
        self.values.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    pub fn from_entries(entries: Vec<(K, f32)>) -> Self {
        ValueTable {
            values: entries.into_iter().collect(),
        }
    }
}

/// Sparse eligibility storage, reset to empty at the start of every episode
#[derive(Clone, Debug)]
pub struct EligibilityTrace<K: TableKey> {
    traces: HashMap<K, f32>,
}

impl<K: TableKey> Default for EligibilityTrace<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey> EligibilityTrace<K> {
    pub fn new() -> Self {
        EligibilityTrace {
            traces: HashMap::new(),
        }
    }

    #[inline]
    pub fn get_or_default(&self, key: &K) -> f32 {
        self.traces.get(key).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn set(&mut self, key: K, value: f32) {
        self.traces.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn clear(&mut self) {
        self.traces.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &f32)> {
        self.traces.iter()
    }
}

/// Visits of the current episode, most recent last
#[derive(Clone, Debug)]
pub struct Trajectory<T> {
    entries: Vec<T>,
}

impl<T> Default for Trajectory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Trajectory<T> {
    pub fn new() -> Self {
        Trajectory { entries: Vec::new() }
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Most recent entry first
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().rev()
    }
}

/// One TD(λ) replacing-trace sweep over a trajectory.
///
/// Walking backward from the most recent visit: the newest key's trace is
/// forced to 1, `value(k) += learning_rate * td_error * e(k)`, then
/// `e(k) *= discount * decay`. Shared by the Actor and the tabular Critic.
pub(crate) fn replacing_trace_sweep<K: TableKey>(
    trajectory: &[K],
    values: &mut ValueTable<K>,
    eligibility: &mut EligibilityTrace<K>,
    learning_rate: f32,
    td_error: f32,
    discount: f32,
    decay: f32,
) {
    let Some(newest) = trajectory.last() else {
        return;
    };
    eligibility.set(newest.clone(), 1.0);

    for key in trajectory.iter().rev() {
        let e = eligibility.get_or_default(key);
        values.add(key.clone(), learning_rate * td_error * e);
        eligibility.set(key.clone(), discount * decay * e);
    }
}
