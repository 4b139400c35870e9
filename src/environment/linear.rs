use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Environment;
use crate::error::{LearnerError, Result};

/// Occupancy of each cell in a row, `true` meaning a peg is present
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PegRow {
    cells: Vec<bool>,
}

impl PegRow {
    pub fn new(cells: Vec<bool>) -> Self {
        PegRow { cells }
    }

    /// Parse a row from `1`/`0` characters, e.g. `"110"`
    pub fn parse(pattern: &str) -> Result<Self> {
        let cells = pattern
            .chars()
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                other => Err(LearnerError::invalid_parameter(
                    "pattern".to_string(),
                    format!("unexpected cell character '{}'", other),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PegRow { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_populated(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    pub fn remaining_pegs(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }
}

impl fmt::Display for PegRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &cell in &self.cells {
            write!(f, "{}", if cell { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// A peg at `from` jumps over `over` into the empty cell `to`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jump {
    pub from: usize,
    pub over: usize,
    pub to: usize,
}

/// One-dimensional peg solitaire.
///
/// A move removes the jumped peg. No moves are legal once a single peg
/// remains, even where a jump would fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearBoard {
    pub cells: usize,
}

impl LinearBoard {
    pub fn new(cells: usize) -> Self {
        LinearBoard { cells }
    }

    /// Full row with the given cells emptied
    pub fn initial_state(&self, empty: &[usize]) -> Result<PegRow> {
        let mut cells = vec![true; self.cells];
        for &index in empty {
            let cell = cells.get_mut(index).ok_or_else(|| {
                LearnerError::invalid_parameter(
                    "empty".to_string(),
                    format!("cell {} outside a board of {}", index, self.cells),
                )
            })?;
            *cell = false;
        }
        Ok(PegRow { cells })
    }

    fn check_width(&self, state: &PegRow) -> Result<()> {
        if state.len() != self.cells {
            return Err(LearnerError::dimension_mismatch(
                format!("{} cells", self.cells),
                format!("{} cells", state.len()),
            ));
        }
        Ok(())
    }
}

impl Environment for LinearBoard {
    type State = PegRow;
    type Action = Jump;

    fn legal_moves(&self, state: &PegRow) -> Vec<Jump> {
        if state.remaining_pegs() <= 1 {
            return Vec::new();
        }

        let mut moves = Vec::new();
        for from in 0..state.len() {
            if !state.is_populated(from) {
                continue;
            }
            // east before west
            if from + 2 < state.len() && state.is_populated(from + 1) && !state.is_populated(from + 2) {
                moves.push(Jump { from, over: from + 1, to: from + 2 });
            }
            if from >= 2 && state.is_populated(from - 1) && !state.is_populated(from - 2) {
                moves.push(Jump { from, over: from - 1, to: from - 2 });
            }
        }
        moves
    }

    fn apply_move(&self, state: &PegRow, action: &Jump) -> Result<PegRow> {
        self.check_width(state)?;
        if !self.legal_moves(state).contains(action) {
            return Err(LearnerError::invalid_move(format!(
                "{:?} is not legal on {}",
                action, state
            )));
        }

        let mut next = state.clone();
        next.cells[action.from] = false;
        next.cells[action.over] = false;
        next.cells[action.to] = true;
        Ok(next)
    }

    fn encode(&self, state: &PegRow) -> Option<Array1<f32>> {
        Some(state.cells.iter().map(|&c| if c { 1.0 } else { 0.0 }).collect())
    }

    fn is_success(&self, state: &PegRow) -> bool {
        state.remaining_pegs() == 1
    }

    /// Pegs left on the board
    fn score(&self, state: &PegRow) -> Option<f32> {
        Some(state.remaining_pegs() as f32)
    }
}

/// Reward shaping used for peg solitaire: 1000 for a single remaining peg,
/// -100 for a dead end, 1 for any intermediate move.
pub fn solitaire_reward(board: LinearBoard) -> impl Fn(&PegRow) -> f32 {
    move |state: &PegRow| {
        if state.remaining_pegs() == 1 {
            1000.0
        } else if board.is_terminal(state) {
            -100.0
        } else {
            1.0
        }
    }
}
