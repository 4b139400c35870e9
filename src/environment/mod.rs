//! # Environment Contract
//!
//! The learning engine never inspects states or actions. Everything it needs
//! from a game goes through [`Environment`]:
//!
//! - `legal_moves` in a stable order (an empty list marks a terminal state)
//! - `apply_move`, a pure transition that never mutates its input
//! - optionally `encode`, a fixed-length numeric view for the network critic
//!
//! [`LinearBoard`] is a small one-dimensional peg-jumping game implementing
//! the contract; it backs the tests and benchmarks.

pub mod linear;

pub use linear::{solitaire_reward, Jump, LinearBoard, PegRow};

use ndarray::Array1;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;

/// A single-player game the agent can learn
pub trait Environment {
    /// Board configuration with value semantics
    type State: Clone + Eq + Hash + Debug;

    /// Move identifier, meaningful relative to a state
    type Action: Clone + Eq + Hash + Debug;

    /// Legal moves from `state` in a deterministic order
    fn legal_moves(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Successor of `state` after `action`.
    ///
    /// Must fail with `LearnerError::InvalidMove` when `action` is not in
    /// `legal_moves(state)`.
    fn apply_move(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State>;

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.legal_moves(state).is_empty()
    }

    /// Fixed-length encoding consumed by the network critic
    fn encode(&self, _state: &Self::State) -> Option<Array1<f32>> {
        None
    }

    /// Whether a terminal state counts as a win; statistics only
    fn is_success(&self, _state: &Self::State) -> bool {
        false
    }

    /// Per-episode figure reported for a final state, e.g. pegs left
    fn score(&self, _state: &Self::State) -> Option<f32> {
        None
    }
}

/// Successors of `state` index-aligned with `actions`
pub fn child_states<E: Environment>(
    env: &E,
    state: &E::State,
    actions: &[E::Action],
) -> Result<Vec<E::State>> {
    actions
        .iter()
        .map(|action| env.apply_move(state, action))
        .collect()
}
