use ndarray::{s, Array1, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

use crate::activations::Activation;
use crate::error::{LearnerError, Result};
use crate::layers::{DenseLayer, LayerGradients};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Parameter gradients for every layer, input layer first
pub type NetworkGradients = Vec<LayerGradients>;

/// A feed-forward network producing one scalar: the value of an encoded state.
///
/// Hidden layers share one activation; the output unit is always linear.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ValueNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
}

impl ValueNetwork {
    /// Build a network `input_size -> hidden_layers... -> 1`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        hidden_layers: &[usize],
        activation: Activation,
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 {
            return Err(LearnerError::invalid_parameter(
                "input_size",
                "state encoding must not be empty",
            ));
        }
        if hidden_layers.iter().any(|&size| size == 0) {
            return Err(LearnerError::invalid_parameter(
                "hidden_layers",
                "layer sizes must be positive",
            ));
        }

        let mut sizes = Vec::with_capacity(hidden_layers.len() + 2);
        sizes.push(input_size);
        sizes.extend_from_slice(hidden_layers);
        sizes.push(1);

        let last = sizes.len() - 2;
        let layers = sizes
            .windows(2)
            .enumerate()
            .map(|(i, window)| {
                let act = if i == last { Activation::Linear } else { activation };
                DenseLayer::new(window[0], window[1], act, rng)
            })
            .collect();

        Ok(ValueNetwork {
            layers,
            optimizer,
            learning_rate,
        })
    }

    pub fn with_layers(mut self, layers: Vec<DenseLayer>) -> Self {
        self.layers = layers;
        self
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(DenseLayer::input_size).unwrap_or(0)
    }

    /// Total number of trainable weights and biases
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(DenseLayer::parameter_count).sum()
    }

    fn check_input(&self, input: &ArrayView1<f32>) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(LearnerError::dimension_mismatch(
                format!("{} inputs", self.input_size()),
                format!("{} inputs", input.len()),
            ));
        }
        Ok(())
    }

    /// Value of an encoded state
    pub fn predict(&self, input: ArrayView1<f32>) -> Result<f32> {
        self.check_input(&input)?;
        let mut current = input.to_owned();
        for layer in &self.layers {
            current = layer.predict(current.view());
        }
        Ok(current[0])
    }

    /// Gradient of the scalar output with respect to every parameter.
    pub fn value_gradients(&mut self, input: ArrayView1<f32>) -> Result<(f32, NetworkGradients)> {
        self.check_input(&input)?;
        let mut current = input.to_owned();
        for layer in &mut self.layers {
            current = layer.forward(current.view());
        }
        let value = current[0];

        let mut gradients = Vec::with_capacity(self.layers.len());
        // d(out)/d(out) = 1
        let mut upstream = Array1::ones(1);
        for layer in self.layers.iter().rev() {
            let (layer_gradients, input_grad) = layer.backward(upstream.view())?;
            gradients.push(layer_gradients);
            upstream = input_grad;
        }
        gradients.reverse();
        Ok((value, gradients))
    }

    /// All-zero gradients shaped like this network's parameters
    pub fn zero_gradients(&self) -> NetworkGradients {
        self.layers.iter().map(LayerGradients::zeros_like).collect()
    }

    /// Concatenate per-layer gradients into one vector: each layer's weights
    /// in row-major order, then its biases.
    pub fn flatten(gradients: &NetworkGradients) -> Array1<f32> {
        gradients
            .iter()
            .flat_map(|g| g.weights.iter().chain(g.biases.iter()).copied())
            .collect()
    }

    /// Inverse of [`ValueNetwork::flatten`] for this network's shapes
    pub fn unflatten(&self, flat: ArrayView1<f32>) -> Result<NetworkGradients> {
        if flat.len() != self.parameter_count() {
            return Err(LearnerError::dimension_mismatch(
                format!("{} parameters", self.parameter_count()),
                format!("{} parameters", flat.len()),
            ));
        }

        let mut offset = 0;
        let mut gradients = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let (rows, cols) = layer.weights.dim();
            let weight_count = rows * cols;
            let weights = flat
                .slice(s![offset..offset + weight_count])
                .to_owned()
                .into_shape((rows, cols))
                .map_err(|e| LearnerError::dimension_mismatch(format!("{}x{}", rows, cols), e.to_string()))?;
            offset += weight_count;
            let biases = flat.slice(s![offset..offset + cols]).to_owned();
            offset += cols;
            gradients.push(LayerGradients { weights, biases });
        }
        Ok(gradients)
    }

    /// Hand per-layer gradients to the optimizer.
    pub fn apply_gradients(&mut self, gradients: &NetworkGradients) -> Result<()> {
        if gradients.len() != self.layers.len() {
            return Err(LearnerError::dimension_mismatch(
                format!("{} layers", self.layers.len()),
                format!("{} layers", gradients.len()),
            ));
        }
        for (index, (layer, grads)) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer
                .update_weights(index, &mut layer.weights, &grads.weights, self.learning_rate);
            self.optimizer
                .update_biases(index, &mut layer.biases, &grads.biases, self.learning_rate);
        }
        Ok(())
    }

    /// Save the network, including optimizer state, with bincode.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(bincode::deserialize(&buffer)?)
    }
}
