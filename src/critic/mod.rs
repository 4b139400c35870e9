//! # Critic
//!
//! The critic estimates state values and turns each observed transition into
//! a TD error, `reward + discount * V(s') - V(s)`, which both it and the
//! Actor learn from.
//!
//! The value estimate comes from one of two backends, fixed when the critic
//! is built:
//!
//! - [`TabularEstimator`]: one entry per state, updated on every step with a
//!   replacing eligibility trace
//! - [`NetworkEstimator`]: a small value network over encoded states, trained
//!   once per episode from the recorded TD errors

pub mod network;
pub mod tabular;

pub use network::NetworkEstimator;
pub use tabular::TabularEstimator;

use tracing::trace;

use crate::config::{AgentConfig, CriticKind};
use crate::environment::Environment;
use crate::error::Result;
use crate::types::Trajectory;

/// Scalar value estimate of a state, with episode lifecycle hooks
pub trait ValueEstimator<E: Environment> {
    fn estimate(&self, env: &E, state: &E::State) -> Result<f32>;

    /// Learn from `td_error`; `trajectory` holds the episode's states so far,
    /// most recent last.
    fn update(&mut self, env: &E, trajectory: &[E::State], td_error: f32) -> Result<()>;

    fn begin_episode(&mut self, env: &E, initial_state: &E::State) -> Result<()>;

    fn end_episode(&mut self) -> Result<()>;
}

/// The two value backends a critic can be built on
#[derive(Debug)]
pub enum CriticBackend<E: Environment> {
    Tabular(TabularEstimator<E::State>),
    Network(NetworkEstimator),
}

impl<E: Environment> CriticBackend<E> {
    pub fn kind(&self) -> CriticKind {
        match self {
            CriticBackend::Tabular(_) => CriticKind::Table,
            CriticBackend::Network(_) => CriticKind::Network,
        }
    }
}

impl<E: Environment> ValueEstimator<E> for CriticBackend<E> {
    fn estimate(&self, env: &E, state: &E::State) -> Result<f32> {
        match self {
            CriticBackend::Tabular(estimator) => estimator.estimate(env, state),
            CriticBackend::Network(estimator) => estimator.estimate(env, state),
        }
    }

    fn update(&mut self, env: &E, trajectory: &[E::State], td_error: f32) -> Result<()> {
        match self {
            CriticBackend::Tabular(estimator) => estimator.update(env, trajectory, td_error),
            CriticBackend::Network(estimator) => estimator.update(env, trajectory, td_error),
        }
    }

    fn begin_episode(&mut self, env: &E, initial_state: &E::State) -> Result<()> {
        match self {
            CriticBackend::Tabular(estimator) => estimator.begin_episode(env, initial_state),
            CriticBackend::Network(estimator) => estimator.begin_episode(env, initial_state),
        }
    }

    fn end_episode(&mut self) -> Result<()> {
        match self {
            CriticBackend::Tabular(estimator) => {
                ValueEstimator::<E>::end_episode(estimator)
            }
            CriticBackend::Network(estimator) => {
                ValueEstimator::<E>::end_episode(estimator)
            }
        }
    }
}

/// State-value critic over a fixed backend
#[derive(Debug)]
pub struct Critic<E: Environment> {
    pub discount: f32,
    backend: CriticBackend<E>,
    trajectory: Trajectory<E::State>,
}

impl<E: Environment> Critic<E> {
    pub fn new(discount: f32, backend: CriticBackend<E>) -> Self {
        Critic {
            discount,
            backend,
            trajectory: Trajectory::new(),
        }
    }

    /// Build the backend `config.critic_kind` selects.
    pub fn from_config(config: &AgentConfig) -> Self {
        let backend = match config.critic_kind {
            CriticKind::Table => CriticBackend::Tabular(TabularEstimator::new(
                config.critic_learning_rate,
                config.critic_discount,
                config.critic_decay,
            )),
            CriticKind::Network => CriticBackend::Network(NetworkEstimator::new(
                config.network.clone(),
                config.critic_decay,
                config.seed.map(|seed| seed.wrapping_add(1)),
            )),
        };
        Critic::new(config.critic_discount, backend)
    }

    /// TD error of the transition `state_0 -> state_1`, applied immediately.
    ///
    /// Appends `state_0` to the trajectory and updates the estimator, so each
    /// logical step must call this exactly once.
    pub fn get_td_error(&mut self, env: &E, state_0: &E::State, state_1: &E::State, reward: f32) -> Result<f32> {
        let td_error = reward + self.discount * self.backend.estimate(env, state_1)?
            - self.backend.estimate(env, state_0)?;

        self.trajectory.push(state_0.clone());
        self.backend.update(env, self.trajectory.as_slice(), td_error)?;
        trace!(td_error, visited = self.trajectory.len(), "critic update");
        Ok(td_error)
    }

    /// Value of `state` under the current estimator
    pub fn value(&self, env: &E, state: &E::State) -> Result<f32> {
        self.backend.estimate(env, state)
    }

    pub fn begin_episode(&mut self, env: &E, initial_state: &E::State) -> Result<()> {
        self.trajectory.clear();
        self.backend.begin_episode(env, initial_state)
    }

    /// Clear the trajectory and run the backend's episode-end pass.
    pub fn end_of_episode(&mut self) -> Result<()> {
        self.trajectory.clear();
        self.backend.end_episode()
    }

    /// Forget the open episode's visits; the backend discards its own
    /// per-episode state on the next `begin_episode`.
    pub fn abandon_trajectory(&mut self) {
        self.trajectory.clear();
    }

    pub fn trajectory(&self) -> &Trajectory<E::State> {
        &self.trajectory
    }

    pub fn backend(&self) -> &CriticBackend<E> {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut CriticBackend<E> {
        &mut self.backend
    }
}
