//! # Actor
//!
//! The policy half of the agent: a table of state-action preferences, an
//! epsilon-greedy selection rule over them, and a replacing eligibility trace
//! that spreads each TD error back over the episode's earlier choices.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::critic::Critic;
use crate::environment::Environment;
use crate::error::{LearnerError, Result};
use crate::types::{replacing_trace_sweep, EligibilityTrace, StateActionKey, Trajectory, ValueTable};

/// Reward of arriving in a state, supplied by the caller
pub type RewardFn<S> = Box<dyn Fn(&S) -> f32>;

pub type ActorKey<E> = StateActionKey<<E as Environment>::State, <E as Environment>::Action>;

pub struct Actor<E: Environment> {
    pub decay: f32,
    pub discount: f32,
    pub learning_rate: f32,
    epsilon: f32,
    reward: RewardFn<E::State>,
    state_action_values: ValueTable<ActorKey<E>>,
    eligibility: EligibilityTrace<ActorKey<E>>,
    trajectory: Trajectory<ActorKey<E>>,
    rng: StdRng,
}

impl<E: Environment> Actor<E> {
    pub fn new(
        decay: f32,
        discount: f32,
        learning_rate: f32,
        epsilon: f32,
        reward: RewardFn<E::State>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Actor {
            decay,
            discount,
            learning_rate,
            epsilon,
            reward,
            state_action_values: ValueTable::new(),
            eligibility: EligibilityTrace::new(),
            trajectory: Trajectory::new(),
            rng,
        }
    }

    /// Choose an action for `state`, then learn from the resulting transition.
    ///
    /// `child_states[i]` must be the successor reached by `legal_actions[i]`.
    /// With `is_greedy` exploration is disabled for this call only.
    pub fn get_action(
        &mut self,
        critic: &mut Critic<E>,
        env: &E,
        state: &E::State,
        legal_actions: &[E::Action],
        child_states: &[E::State],
        is_greedy: bool,
    ) -> Result<E::Action> {
        if child_states.len() != legal_actions.len() {
            return Err(LearnerError::MisalignedChildStates {
                actions: legal_actions.len(),
                child_states: child_states.len(),
            });
        }

        let epsilon = if is_greedy { 0.0 } else { self.epsilon };
        let index = self.select_index(state, legal_actions, epsilon)?;
        let action = legal_actions[index].clone();
        let next_state = &child_states[index];

        let reward = (self.reward)(next_state);
        // The actor discounts the critic's TD error once more.
        let td_error = self.discount * critic.get_td_error(env, state, next_state, reward)?;

        self.trajectory.push(StateActionKey::new(state.clone(), action.clone()));
        self.update(td_error);

        debug!(index, reward, td_error, epsilon, "actor step");
        Ok(action)
    }

    /// Index of the epsilon-greedy choice among `legal_actions`.
    ///
    /// The greedy scan keeps the first maximum it meets; unseen pairs count
    /// as 0. A draw in [0, 1) below `epsilon` replaces it with a uniform pick.
    pub fn select_index(&mut self, state: &E::State, legal_actions: &[E::Action], epsilon: f32) -> Result<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, action) in legal_actions.iter().enumerate() {
            let value = self.value(state, action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((index, value)),
            }
        }

        let Some((greedy, _)) = best else {
            return Err(LearnerError::EmptyActionSet);
        };
        if self.rng.gen::<f32>() < epsilon {
            return Ok(self.rng.gen_range(0..legal_actions.len()));
        }
        Ok(greedy)
    }

    /// Replacing-trace sweep over the episode's (state, action) pairs.
    pub fn update(&mut self, td_error: f32) {
        replacing_trace_sweep(
            self.trajectory.as_slice(),
            &mut self.state_action_values,
            &mut self.eligibility,
            self.learning_rate,
            td_error,
            self.discount,
            self.decay,
        );
    }

    /// Clear per-episode state and set the exploration rate for the next episode.
    pub fn reset(&mut self, epsilon: f32) {
        self.eligibility.clear();
        self.trajectory.clear();
        self.epsilon = epsilon;
    }

    /// Stored preference for `(state, action)`, 0 when never updated
    pub fn value(&self, state: &E::State, action: &E::Action) -> f32 {
        self.state_action_values
            .get_or_default(&StateActionKey::new(state.clone(), action.clone()))
    }

    pub fn reward(&self, state: &E::State) -> f32 {
        (self.reward)(state)
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn state_action_values(&self) -> &ValueTable<ActorKey<E>> {
        &self.state_action_values
    }

    pub fn state_action_values_mut(&mut self) -> &mut ValueTable<ActorKey<E>> {
        &mut self.state_action_values
    }

    pub fn eligibility(&self) -> &EligibilityTrace<ActorKey<E>> {
        &self.eligibility
    }

    pub fn trajectory(&self) -> &Trajectory<ActorKey<E>> {
        &self.trajectory
    }
}
