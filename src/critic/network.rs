use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::ValueEstimator;
use crate::config::NetworkConfig;
use crate::environment::Environment;
use crate::error::{LearnerError, Result};
use crate::network::ValueNetwork;
use crate::optimizer::OptimizerWrapper;

/// Value function approximated by a [`ValueNetwork`] over encoded states.
///
/// TD errors observed during an episode are only recorded; the network is
/// trained once, in `end_episode`, replaying them in the order they arrived.
/// The eligibility trace holds one entry per trainable parameter.
#[derive(Debug)]
pub struct NetworkEstimator {
    pub config: NetworkConfig,
    pub decay: f32,
    network: Option<ValueNetwork>,
    eligibility: Array1<f32>,
    recorded: Vec<(Array1<f32>, f32)>,
    rng: StdRng,
}

impl NetworkEstimator {
    pub fn new(config: NetworkConfig, decay: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        NetworkEstimator {
            config,
            decay,
            network: None,
            eligibility: Array1::zeros(0),
            recorded: Vec::new(),
            rng,
        }
    }

    /// Build a fresh network for `input_size` inputs and zero the trace.
    pub fn initialize(&mut self, input_size: usize) -> Result<()> {
        let network = ValueNetwork::new(
            input_size,
            &self.config.hidden_layers,
            self.config.activation,
            OptimizerWrapper::from_kind(self.config.optimizer),
            self.config.learning_rate,
            &mut self.rng,
        )?;
        self.install(network);
        Ok(())
    }

    /// Adopt an existing network, e.g. one restored from disk.
    pub fn install(&mut self, network: ValueNetwork) {
        self.eligibility = Array1::zeros(network.parameter_count());
        self.network = Some(network);
    }

    pub fn network(&self) -> Option<&ValueNetwork> {
        self.network.as_ref()
    }

    pub fn eligibility(&self) -> &Array1<f32> {
        &self.eligibility
    }

    /// (encoded state, td error) pairs awaiting the end-of-episode pass
    pub fn recorded(&self) -> &[(Array1<f32>, f32)] {
        &self.recorded
    }

    fn encode<E: Environment>(env: &E, state: &E::State) -> Result<Array1<f32>> {
        env.encode(state).ok_or(LearnerError::EncodingUnavailable)
    }

    /// Replay the episode through the network: per recorded step,
    /// `e += dV/dw`, `w += lr * td_error * e`, `e *= decay`.
    fn train_on_episode(&mut self) -> Result<()> {
        let network = self.network.as_mut().ok_or(LearnerError::EstimatorUninitialized)?;
        let decay = self.decay;
        self.eligibility = Array1::zeros(network.parameter_count());

        for &(ref state, td_error) in &self.recorded {
            let (_, gradients) = network.value_gradients(state.view())?;
            self.eligibility += &ValueNetwork::flatten(&gradients);

            // The optimizer descends, so hand it the negated ascent direction.
            let step = self.eligibility.mapv(|e| -e * td_error);
            let step = network.unflatten(step.view())?;
            network.apply_gradients(&step)?;

            self.eligibility.mapv_inplace(|e| e * decay);
        }
        Ok(())
    }
}

impl<E: Environment> ValueEstimator<E> for NetworkEstimator {
    fn estimate(&self, env: &E, state: &E::State) -> Result<f32> {
        let network = self.network.as_ref().ok_or(LearnerError::EstimatorUninitialized)?;
        let encoded = Self::encode(env, state)?;
        network.predict(encoded.view())
    }

    /// Records the newest trajectory state with its TD error.
    fn update(&mut self, env: &E, trajectory: &[E::State], td_error: f32) -> Result<()> {
        if let Some(state) = trajectory.last() {
            let encoded = Self::encode(env, state)?;
            self.recorded.push((encoded, td_error));
        }
        Ok(())
    }

    fn begin_episode(&mut self, env: &E, initial_state: &E::State) -> Result<()> {
        let input_size = Self::encode(env, initial_state)?.len();
        let needs_init = self
            .network
            .as_ref()
            .map_or(true, |network| network.input_size() != input_size);
        if needs_init {
            debug!(input_size, "initializing critic network");
            self.initialize(input_size)?;
        }
        self.recorded.clear();
        Ok(())
    }

    fn end_episode(&mut self) -> Result<()> {
        let steps = self.recorded.len();
        let result = if steps > 0 { self.train_on_episode() } else { Ok(()) };
        debug!(steps, "critic network episode pass complete");
        self.recorded.clear();
        self.eligibility.fill(0.0);
        result
    }
}
