//! Saving and restoring a learned policy.
//!
//! Tables are written as lists of (key, value) pairs; the network critic is
//! written whole, optimizer state included. Eligibility traces and
//! trajectories are per-episode and never persisted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::agent::{Agent, EpisodePhase};
use crate::config::check_unit;
use crate::critic::CriticBackend;
use crate::environment::Environment;
use crate::error::{LearnerError, Result};
use crate::network::ValueNetwork;
use crate::types::{StateActionKey, ValueTable};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CriticSnapshot<S> {
    Table(Vec<(S, f32)>),
    /// `None` until the network has been built by a first episode
    Network(Option<ValueNetwork>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicySnapshot<S, A> {
    pub epsilon: f32,
    pub episodes_completed: usize,
    pub actor_values: Vec<(StateActionKey<S, A>, f32)>,
    pub critic: CriticSnapshot<S>,
}

impl<S, A> PolicySnapshot<S, A>
where
    S: Serialize + DeserializeOwned,
    A: Serialize + DeserializeOwned,
{
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl<E: Environment> Agent<E> {
    /// Capture the learned tables and exploration rate.
    pub fn snapshot(&self) -> PolicySnapshot<E::State, E::Action> {
        let critic = match self.critic.backend() {
            CriticBackend::Tabular(estimator) => CriticSnapshot::Table(estimator.values().to_entries()),
            CriticBackend::Network(estimator) => CriticSnapshot::Network(estimator.network().cloned()),
        };
        PolicySnapshot {
            epsilon: self.epsilon(),
            episodes_completed: self.episodes_completed(),
            actor_values: self.actor.state_action_values().to_entries(),
            critic,
        }
    }

    /// Replace the learned state with `snapshot`.
    ///
    /// Only allowed between episodes, and the snapshot's critic kind must
    /// match this agent's backend. A snapshot whose exploration rate lies
    /// outside [0, 1] is rejected before anything is replaced.
    pub fn restore(&mut self, snapshot: PolicySnapshot<E::State, E::Action>) -> Result<()> {
        if self.phase() != EpisodePhase::Idle {
            return Err(LearnerError::EpisodeInProgress);
        }
        check_unit("epsilon", snapshot.epsilon)?;

        match (self.critic.backend_mut(), snapshot.critic) {
            (CriticBackend::Tabular(estimator), CriticSnapshot::Table(entries)) => {
                *estimator.values_mut() = ValueTable::from_entries(entries);
            }
            (CriticBackend::Network(estimator), CriticSnapshot::Network(network)) => {
                if let Some(network) = network {
                    estimator.install(network);
                }
            }
            (backend, _) => {
                return Err(LearnerError::invalid_parameter(
                    "snapshot".to_string(),
                    format!("critic kind does not match the agent's {:?} critic", backend.kind()),
                ));
            }
        }

        *self.actor.state_action_values_mut() = ValueTable::from_entries(snapshot.actor_values);
        self.set_epsilon(snapshot.epsilon);
        self.set_episodes_completed(snapshot.episodes_completed);
        Ok(())
    }
}
