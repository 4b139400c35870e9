use super::ValueEstimator;
use crate::environment::Environment;
use crate::error::Result;
use crate::types::{replacing_trace_sweep, EligibilityTrace, TableKey, ValueTable};

/// State-value table with a replacing eligibility trace
#[derive(Clone, Debug)]
pub struct TabularEstimator<S: TableKey> {
    pub learning_rate: f32,
    pub discount: f32,
    pub decay: f32,
    values: ValueTable<S>,
    eligibility: EligibilityTrace<S>,
}

impl<S: TableKey> TabularEstimator<S> {
    pub fn new(learning_rate: f32, discount: f32, decay: f32) -> Self {
        TabularEstimator {
            learning_rate,
            discount,
            decay,
            values: ValueTable::new(),
            eligibility: EligibilityTrace::new(),
        }
    }

    pub fn values(&self) -> &ValueTable<S> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ValueTable<S> {
        &mut self.values
    }

    pub fn eligibility(&self) -> &EligibilityTrace<S> {
        &self.eligibility
    }
}

impl<E> ValueEstimator<E> for TabularEstimator<E::State>
where
    E: Environment,
{
    /// Terminal states are worth 0 whatever the table holds.
    fn estimate(&self, env: &E, state: &E::State) -> Result<f32> {
        if env.is_terminal(state) {
            return Ok(0.0);
        }
        Ok(self.values.get_or_default(state))
    }

    fn update(&mut self, _env: &E, trajectory: &[E::State], td_error: f32) -> Result<()> {
        replacing_trace_sweep(
            trajectory,
            &mut self.values,
            &mut self.eligibility,
            self.learning_rate,
            td_error,
            self.discount,
            self.decay,
        );
        Ok(())
    }

    fn begin_episode(&mut self, _env: &E, _initial_state: &E::State) -> Result<()> {
        self.eligibility.clear();
        Ok(())
    }

    fn end_episode(&mut self) -> Result<()> {
        self.eligibility.clear();
        Ok(())
    }
}
