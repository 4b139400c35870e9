//! # Actor-Critic Agent
//!
//! An [`Agent`] owns one [`Actor`] and one [`Critic`] and is the only entry
//! point a training loop needs:
//!
//! - `get_action` selects a move and performs all TD(λ) learning for it
//! - `end_of_episode` decays exploration linearly and resets per-episode traces
//!
//! The critic backend is chosen from [`AgentConfig::critic_kind`] when the
//! agent is built and never changes afterwards.
//!
//! ## Episode lifecycle
//!
//! ```text
//! Idle --get_action--> Acting --(successor is terminal)--> Terminal
//!   ^                                                          |
//!   +-------------------- end_of_episode ----------------------+
//! ```
//!
//! Acting again from `Terminal` without `end_of_episode` fails with
//! `LearnerError::EpisodeTerminated`; ending an episode from `Idle` fails with
//! `LearnerError::NoEpisodeInProgress`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use peg_learner::agent::Agent;
//! use peg_learner::config::AgentConfig;
//! use peg_learner::environment::{child_states, solitaire_reward, Environment, LinearBoard};
//!
//! let board = LinearBoard::new(5);
//! let mut agent = Agent::<LinearBoard>::new(AgentConfig::default(), Box::new(solitaire_reward(board))).unwrap();
//!
//! let mut state = board.initial_state(&[1]).unwrap();
//! while !board.is_terminal(&state) {
//!     let moves = board.legal_moves(&state);
//!     let children = child_states(&board, &state, &moves).unwrap();
//!     let action = agent.get_action(&board, &state, &moves, &children, false).unwrap();
//!     state = board.apply_move(&state, &action).unwrap();
//! }
//! agent.end_of_episode(1000).unwrap();
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::actor::{Actor, RewardFn};
use crate::config::{AgentConfig, CriticKind};
use crate::critic::Critic;
use crate::environment::Environment;
use crate::error::{LearnerError, Result};

/// Where the agent is within an episode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    Idle,
    Acting,
    Terminal,
}

pub struct Agent<E: Environment> {
    pub config: AgentConfig,
    initial_epsilon: f32,
    epsilon: f32,
    pub(crate) actor: Actor<E>,
    pub(crate) critic: Critic<E>,
    phase: EpisodePhase,
    episodes_completed: usize,
    exploration_exhausted: bool,
}

impl<E: Environment> Agent<E> {
    /// Validate `config` and build the actor and the configured critic.
    pub fn new(config: AgentConfig, reward: RewardFn<E::State>) -> Result<Self> {
        config.validate()?;

        let critic = Critic::from_config(&config);
        let actor = Actor::new(
            config.actor_decay,
            config.actor_discount,
            config.actor_learning_rate,
            config.epsilon,
            reward,
            config.seed,
        );

        Ok(Agent {
            initial_epsilon: config.epsilon,
            epsilon: config.epsilon,
            actor,
            critic,
            phase: EpisodePhase::Idle,
            episodes_completed: 0,
            exploration_exhausted: config.epsilon == 0.0,
            config,
        })
    }

    /// Open an episode starting from `initial_state`.
    ///
    /// The network critic establishes its parameters here on first use.
    pub fn begin_episode(&mut self, env: &E, initial_state: &E::State) -> Result<()> {
        match self.phase {
            EpisodePhase::Idle => {}
            EpisodePhase::Acting => return Err(LearnerError::EpisodeInProgress),
            EpisodePhase::Terminal => return Err(LearnerError::EpisodeTerminated),
        }
        self.critic.begin_episode(env, initial_state)?;
        self.phase = EpisodePhase::Acting;
        Ok(())
    }

    /// Select an action for `state` and learn from the transition it causes.
    ///
    /// `child_states` must be index-aligned with `legal_actions`. Opens the
    /// episode implicitly when called from `Idle`.
    pub fn get_action(
        &mut self,
        env: &E,
        state: &E::State,
        legal_actions: &[E::Action],
        child_states: &[E::State],
        is_greedy: bool,
    ) -> Result<E::Action> {
        match self.phase {
            EpisodePhase::Terminal => return Err(LearnerError::EpisodeTerminated),
            EpisodePhase::Idle => self.begin_episode(env, state)?,
            EpisodePhase::Acting => {}
        }

        let action = self
            .actor
            .get_action(&mut self.critic, env, state, legal_actions, child_states, is_greedy)?;

        let reached_terminal = legal_actions
            .iter()
            .position(|candidate| candidate == &action)
            .map_or(false, |index| env.is_terminal(&child_states[index]));
        if reached_terminal {
            self.phase = EpisodePhase::Terminal;
        }
        Ok(action)
    }

    /// Close the episode: decay exploration by
    /// `initial_epsilon / (total_episodes * epsilon_decay_param)` (floored at
    /// 0), reset the actor with the new rate and finish the critic's episode.
    ///
    /// Fails with `NoEpisodeInProgress` from `Idle`.
    pub fn end_of_episode(&mut self, total_episodes: usize) -> Result<()> {
        if total_episodes == 0 {
            return Err(LearnerError::invalid_parameter(
                "total_episodes",
                "must be at least 1",
            ));
        }
        self.require_open_episode()?;

        let step = self.initial_epsilon / (total_episodes as f32 * self.config.epsilon_decay_param);
        self.epsilon = (self.epsilon - step).max(0.0);
        self.actor.reset(self.epsilon);

        self.phase = EpisodePhase::Idle;
        self.episodes_completed += 1;

        if self.epsilon == 0.0 && !self.exploration_exhausted {
            self.exploration_exhausted = true;
            warn!(episode = self.episodes_completed, "exploration rate reached zero");
        }
        debug!(episode = self.episodes_completed, epsilon = self.epsilon, "episode closed");

        self.critic.end_of_episode()
    }

    /// Close a greedy evaluation episode: traces are reset but exploration
    /// is not decayed and the episode is not counted.
    pub fn end_evaluation_episode(&mut self) -> Result<()> {
        self.require_open_episode()?;
        self.actor.reset(self.epsilon);
        self.phase = EpisodePhase::Idle;
        self.critic.end_of_episode()
    }

    fn require_open_episode(&self) -> Result<()> {
        if self.phase == EpisodePhase::Idle {
            return Err(LearnerError::NoEpisodeInProgress);
        }
        Ok(())
    }

    /// Drop the open episode after a contract violation. Nothing recorded in
    /// it is learned from beyond the updates already applied.
    pub fn abort_episode(&mut self) {
        self.actor.reset(self.epsilon);
        self.critic.abandon_trajectory();
        self.phase = EpisodePhase::Idle;
    }

    /// Reward the actor would receive for arriving in `state`
    pub fn reward(&self, state: &E::State) -> f32 {
        self.actor.reward(state)
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn initial_epsilon(&self) -> f32 {
        self.initial_epsilon
    }

    pub(crate) fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
        self.exploration_exhausted = epsilon == 0.0;
        self.actor.reset(epsilon);
    }

    pub(crate) fn set_episodes_completed(&mut self, episodes: usize) {
        self.episodes_completed = episodes;
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    pub fn critic_kind(&self) -> CriticKind {
        self.critic.backend().kind()
    }

    pub fn actor(&self) -> &Actor<E> {
        &self.actor
    }

    pub fn critic(&self) -> &Critic<E> {
        &self.critic
    }
}
