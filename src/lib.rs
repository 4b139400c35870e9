//! # Peg Learner - Actor-Critic TD(λ) for Peg Solitaire
//!
//! peg-learner is a small reinforcement learning engine that learns to solve
//! single-player board puzzles such as peg solitaire. An Actor keeps
//! state-action preferences and chooses moves epsilon-greedily; a Critic
//! estimates state values and produces the TD error both learn from. Credit
//! is spread over each episode with replacing eligibility traces.
//!
//! ## Key Features
//!
//! - **Actor-Critic**: tabular actor with epsilon-greedy selection and linear exploration decay
//! - **Two critics**: a value table, or a small value network trained once per episode
//! - **Environment contract**: any game with legal moves and pure transitions
//! - **Persistence**: learned policies saved with bincode or JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use peg_learner::agent::Agent;
//! use peg_learner::config::AgentConfig;
//! use peg_learner::environment::{solitaire_reward, LinearBoard};
//! use peg_learner::trainer::Trainer;
//!
//! let board = LinearBoard::new(6);
//! let config = AgentConfig::default().with_seed(7);
//! let agent = Agent::<LinearBoard>::new(config, Box::new(solitaire_reward(board))).unwrap();
//!
//! let start = board.initial_state(&[1]).unwrap();
//! let mut trainer = Trainer::new(agent, board, start);
//! let report = trainer.train(500).unwrap();
//! println!("solved {} of 500 episodes", report.victories);
//! ```
//!
//! ## Module Organization
//!
//! - [`actor`] - Policy table and epsilon-greedy move selection
//! - [`activations`] - Activation functions for the network critic
//! - [`agent`] - The Actor-Critic pair and its episode lifecycle
//! - [`config`] - Hyperparameters with defaults and validation
//! - [`critic`] - TD errors and the two value backends
//! - [`debug`] - Gradient checking for the value network
//! - [`environment`] - The game contract and a one-dimensional peg board
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`metrics`] - Training metrics and tracking
//! - [`network`] - Scalar value network
//! - [`optimizer`] - SGD and Adam
//! - [`persistence`] - Policy snapshots
//! - [`trainer`] - Episode loop, training and greedy evaluation
//! - [`types`] - Value tables, eligibility traces and trajectories

pub mod activations;
pub mod actor;
pub mod agent;
pub mod config;
pub mod critic;
pub mod debug;
pub mod environment;
pub mod error;
pub mod layers;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod persistence;
pub mod trainer;
pub mod types;

#[cfg(test)]
mod tests;
