pub mod test_agent;
pub mod test_optimizer;

use crate::environment::Environment;
use crate::error::{LearnerError, Result};

/// Counts down from a starting number by 1 or 2; zero ends the game.
/// Provides no encoding, so it only works with the tabular critic.
#[derive(Clone, Copy, Debug)]
pub struct Countdown;

impl Environment for Countdown {
    type State = u32;
    type Action = u32;

    fn legal_moves(&self, state: &u32) -> Vec<u32> {
        match *state {
            0 => vec![],
            1 => vec![1],
            _ => vec![1, 2],
        }
    }

    fn apply_move(&self, state: &u32, action: &u32) -> Result<u32> {
        if !self.legal_moves(state).contains(action) {
            return Err(LearnerError::invalid_move(format!("cannot take {} from {}", action, state)));
        }
        Ok(state - action)
    }
}

pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}
