use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded per-episode training histories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Summed reward per episode
    pub episode_rewards: VecDeque<f32>,

    /// Steps per episode
    pub episode_lengths: VecDeque<usize>,

    /// Exploration rate each episode was played with
    pub epsilons: VecDeque<f32>,

    /// Whether each episode ended in a win
    pub successes: VecDeque<bool>,
}

impl TrainingMetrics {
    pub fn new(history_size: usize) -> Self {
        TrainingMetrics {
            episode_rewards: VecDeque::with_capacity(history_size),
            episode_lengths: VecDeque::with_capacity(history_size),
            epsilons: VecDeque::with_capacity(history_size),
            successes: VecDeque::with_capacity(history_size),
        }
    }
}

/// Aggregates over the retained window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub mean_reward: f32,
    pub mean_length: f32,
    pub success_rate: f32,
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T, capacity: usize) {
    if queue.len() >= capacity {
        queue.pop_front();
    }
    queue.push_back(value);
}

/// Tracks metrics during training
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,

    current_episode_reward: f32,
    current_episode_length: usize,
    episode_count: usize,
    success_count: usize,
    total_steps: usize,
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        let history_size = history_size.max(1);
        MetricsTracker {
            metrics: TrainingMetrics::new(history_size),
            history_size,
            current_episode_reward: 0.0,
            current_episode_length: 0,
            episode_count: 0,
            success_count: 0,
            total_steps: 0,
        }
    }

    /// Start a new episode
    pub fn start_episode(&mut self) {
        self.current_episode_reward = 0.0;
        self.current_episode_length = 0;
    }

    /// Record a step within an episode
    pub fn step(&mut self, reward: f32) {
        self.current_episode_reward += reward;
        self.current_episode_length += 1;
        self.total_steps += 1;
    }

    /// End the current episode
    pub fn end_episode(&mut self, epsilon: f32, success: bool) {
        let capacity = self.history_size;
        push_bounded(&mut self.metrics.episode_rewards, self.current_episode_reward, capacity);
        push_bounded(&mut self.metrics.episode_lengths, self.current_episode_length, capacity);
        push_bounded(&mut self.metrics.epsilons, epsilon, capacity);
        push_bounded(&mut self.metrics.successes, success, capacity);

        self.episode_count += 1;
        if success {
            self.success_count += 1;
        }
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Wins over the whole run, not just the retained window
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Get recent average episode reward
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        if self.metrics.episode_rewards.is_empty() || window == 0 {
            return None;
        }

        let n = window.min(self.metrics.episode_rewards.len());
        let sum: f32 = self.metrics.episode_rewards.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    pub fn summary(&self) -> MetricsSummary {
        let episodes = self.metrics.episode_rewards.len();
        if episodes == 0 {
            return MetricsSummary {
                episodes: 0,
                mean_reward: 0.0,
                mean_length: 0.0,
                success_rate: 0.0,
            };
        }

        let n = episodes as f32;
        MetricsSummary {
            episodes,
            mean_reward: self.metrics.episode_rewards.iter().sum::<f32>() / n,
            mean_length: self.metrics.episode_lengths.iter().sum::<usize>() as f32 / n,
            success_rate: self.metrics.successes.iter().filter(|&&s| s).count() as f32 / n,
        }
    }

    /// Save metrics to file
    pub fn save(&self, path: &str) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from file
    pub fn load(&mut self, path: &str) -> crate::error::Result<()> {
        let data = std::fs::read_to_string(path)?;
        self.metrics = serde_json::from_str(&data)?;
        Ok(())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}
