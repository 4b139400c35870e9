//! Agent hyperparameters.
//!
//! Defaults reproduce the settings the peg solitaire agent was tuned with.

use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{LearnerError, Result};
use crate::optimizer::OptimizerKind;

/// Which value backend the critic is built on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CriticKind {
    #[default]
    Table,
    Network,
}

/// Shape and training settings of the network critic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Hidden layer sizes; a single linear output unit is always appended
    pub hidden_layers: Vec<usize>,
    pub activation: Activation,
    pub optimizer: OptimizerKind,
    pub learning_rate: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            hidden_layers: vec![15],
            activation: Activation::Relu,
            optimizer: OptimizerKind::Sgd,
            learning_rate: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub critic_kind: CriticKind,
    /// Exploration rate of the first episode
    pub epsilon: f32,
    /// Fraction of the training run after which exploration reaches zero
    pub epsilon_decay_param: f32,
    pub actor_learning_rate: f32,
    pub critic_learning_rate: f32,
    pub actor_discount: f32,
    pub critic_discount: f32,
    /// Eligibility trace decay (λ) of the actor
    pub actor_decay: f32,
    /// Eligibility trace decay (λ) of the critic
    pub critic_decay: f32,
    pub network: NetworkConfig,
    /// Seed for action sampling and network initialization
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            critic_kind: CriticKind::Table,
            epsilon: 0.99,
            epsilon_decay_param: 0.9,
            actor_learning_rate: 0.1,
            critic_learning_rate: 0.1,
            actor_discount: 0.9,
            critic_discount: 0.9,
            actor_decay: 0.9,
            critic_decay: 0.9,
            network: NetworkConfig::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_critic(mut self, kind: CriticKind) -> Self {
        self.critic_kind = kind;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay_param(mut self, decay_param: f32) -> Self {
        self.epsilon_decay_param = decay_param;
        self
    }

    pub fn with_learning_rates(mut self, actor: f32, critic: f32) -> Self {
        self.actor_learning_rate = actor;
        self.critic_learning_rate = critic;
        self
    }

    pub fn with_discounts(mut self, actor: f32, critic: f32) -> Self {
        self.actor_discount = actor;
        self.critic_discount = critic;
        self
    }

    pub fn with_trace_decays(mut self, actor: f32, critic: f32) -> Self {
        self.actor_decay = actor;
        self.critic_decay = critic;
        self
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_unit("epsilon", self.epsilon)?;
        check_unit("actor_discount", self.actor_discount)?;
        check_unit("critic_discount", self.critic_discount)?;
        check_unit("actor_decay", self.actor_decay)?;
        check_unit("critic_decay", self.critic_decay)?;
        check_positive("epsilon_decay_param", self.epsilon_decay_param)?;
        check_positive("actor_learning_rate", self.actor_learning_rate)?;
        check_positive("critic_learning_rate", self.critic_learning_rate)?;

        if self.critic_kind == CriticKind::Network {
            check_positive("network.learning_rate", self.network.learning_rate)?;
            if self.network.hidden_layers.iter().any(|&size| size == 0) {
                return Err(LearnerError::invalid_parameter(
                    "network.hidden_layers",
                    "layer sizes must be positive",
                ));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AgentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn check_unit(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(LearnerError::invalid_parameter(
            name.to_string(),
            format!("must lie in [0, 1], got {}", value),
        ));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(LearnerError::invalid_parameter(
            name.to_string(),
            format!("must be positive and finite, got {}", value),
        ));
    }
    Ok(())
}
