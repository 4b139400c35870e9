//! # Episode Controller
//!
//! Drives an [`Agent`] through complete episodes of an [`Environment`]:
//! legal moves and child states are computed per step, the agent picks and
//! learns, and the chosen successor becomes the next state until no legal
//! move remains.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::agent::Agent;
use crate::environment::{child_states, Environment};
use crate::error::{LearnerError, Result};
use crate::metrics::{MetricsSummary, MetricsTracker};

/// Result of one played episode
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeOutcome<S> {
    pub steps: usize,
    pub total_reward: f32,
    pub final_state: S,
    pub success: bool,
    /// `Environment::score` of the final state
    pub score: Option<f32>,
    /// Every state visited, the initial one first
    pub path: Vec<S>,
}

/// Per-episode line of a training report
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f32,
    /// Exploration rate the episode was played with
    pub epsilon: f32,
    pub success: bool,
    pub score: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeSummary>,
    pub victories: usize,
    pub summary: MetricsSummary,
}

/// Play one episode from `initial_state` until the environment reports no
/// legal moves.
///
/// The episode is left open (`Terminal`) so the caller decides how to close
/// it. On error the episode is aborted before the error is returned.
pub fn play_episode<E: Environment>(
    agent: &mut Agent<E>,
    env: &E,
    initial_state: &E::State,
    is_greedy: bool,
) -> Result<EpisodeOutcome<E::State>> {
    agent.begin_episode(env, initial_state)?;
    let result = run_steps(agent, env, initial_state, is_greedy);
    if let Err(err) = &result {
        warn!(error = %err, contract_violation = err.aborts_episode(), "episode aborted");
        agent.abort_episode();
    }
    result
}

fn run_steps<E: Environment>(
    agent: &mut Agent<E>,
    env: &E,
    initial_state: &E::State,
    is_greedy: bool,
) -> Result<EpisodeOutcome<E::State>> {
    let mut state = initial_state.clone();
    let mut path = vec![state.clone()];
    let mut total_reward = 0.0;

    loop {
        let moves = env.legal_moves(&state);
        if moves.is_empty() {
            break;
        }
        let children = child_states(env, &state, &moves)?;
        let action = agent.get_action(env, &state, &moves, &children, is_greedy)?;

        let index = moves
            .iter()
            .position(|candidate| candidate == &action)
            .ok_or_else(|| LearnerError::invalid_move(format!("{:?} was not offered", action)))?;
        state = children
            .into_iter()
            .nth(index)
            .ok_or_else(|| LearnerError::invalid_move(format!("no successor for {:?}", action)))?;

        total_reward += agent.reward(&state);
        path.push(state.clone());
    }

    Ok(EpisodeOutcome {
        steps: path.len() - 1,
        total_reward,
        success: env.is_success(&state),
        score: env.score(&state),
        final_state: state,
        path,
    })
}

/// Repeated training episodes from a fixed start state
pub struct Trainer<E: Environment> {
    pub agent: Agent<E>,
    pub env: E,
    pub initial_state: E::State,
    metrics: MetricsTracker,
    log_every: usize,
}

impl<E: Environment> Trainer<E> {
    pub fn new(agent: Agent<E>, env: E, initial_state: E::State) -> Self {
        Trainer {
            agent,
            env,
            initial_state,
            metrics: MetricsTracker::default(),
            log_every: 1,
        }
    }

    /// Emit the per-episode `info` event only every `every` episodes.
    pub fn with_log_every(mut self, every: usize) -> Self {
        self.log_every = every.max(1);
        self
    }

    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.metrics = MetricsTracker::new(history_size);
        self
    }

    /// Play `episodes` exploring episodes, closing each with
    /// `end_of_episode(episodes)`.
    pub fn train(&mut self, episodes: usize) -> Result<TrainingReport> {
        let span = info_span!("train", episodes);
        let _guard = span.enter();

        let mut summaries = Vec::with_capacity(episodes);
        let start_victories = self.metrics.success_count();

        for episode in 1..=episodes {
            let epsilon = self.agent.epsilon();
            self.metrics.start_episode();

            let outcome = play_episode(&mut self.agent, &self.env, &self.initial_state, false)?;
            self.agent.end_of_episode(episodes)?;

            for state in outcome.path.iter().skip(1) {
                self.metrics.step(self.agent.reward(state));
            }
            self.metrics.end_episode(epsilon, outcome.success);

            if episode % self.log_every == 0 || episode == episodes {
                info!(
                    episode,
                    steps = outcome.steps,
                    reward = outcome.total_reward,
                    epsilon,
                    success = outcome.success,
                    score = ?outcome.score,
                    "episode finished"
                );
            }

            summaries.push(EpisodeSummary {
                episode,
                steps: outcome.steps,
                total_reward: outcome.total_reward,
                epsilon,
                success: outcome.success,
                score: outcome.score,
            });
        }

        let victories = self.metrics.success_count() - start_victories;
        let summary = self.metrics.summary();
        info!(victories, success_rate = summary.success_rate, "training finished");
        Ok(TrainingReport {
            episodes: summaries,
            victories,
            summary,
        })
    }

    /// One greedy episode with the learned policy; exploration is not decayed.
    pub fn evaluate(&mut self) -> Result<EpisodeOutcome<E::State>> {
        let outcome = play_episode(&mut self.agent, &self.env, &self.initial_state, true)?;
        self.agent.end_evaluation_episode()?;
        if !outcome.success {
            warn!(steps = outcome.steps, final_state = ?outcome.final_state, "greedy policy did not solve the board");
        }
        Ok(outcome)
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn into_agent(self) -> Agent<E> {
        self.agent
    }
}
