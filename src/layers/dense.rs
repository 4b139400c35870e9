use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{LearnerError, Result};

/// Gradients of a scalar output with respect to one layer's parameters
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl LayerGradients {
    pub fn zeros_like(layer: &DenseLayer) -> Self {
        LayerGradients {
            weights: Array2::zeros(layer.weights.dim()),
            biases: Array1::zeros(layer.biases.len()),
        }
    }
}

/// A fully connected (dense) layer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation_output: Option<Array1<f32>>,
    #[serde(skip)]
    inputs: Option<Array1<f32>>,
}

impl DenseLayer {
    /// Create a layer whose weights follow the activation's recommended
    /// initialization. Biases start at zero.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, activation: Activation, rng: &mut R) -> Self {
        let init = WeightInit::for_activation(&activation);
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: init.initialize_biases(output_size),
            activation,
            pre_activation_output: None,
            inputs: None,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(LearnerError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(LearnerError::dimension_mismatch(
                format!("{:?}", self.biases.dim()),
                format!("{:?}", biases.dim()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Forward pass for one input vector, caching what `backward` needs.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let mut outputs = input.dot(&self.weights) + &self.biases;
        self.inputs = Some(input.to_owned());
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply(&mut outputs);
        outputs
    }

    /// Forward pass without touching the cache.
    pub fn predict(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let mut outputs = input.dot(&self.weights) + &self.biases;
        self.activation.apply(&mut outputs);
        outputs
    }

    /// Chain rule through this layer.
    ///
    /// `output_grad` is d(out)/d(layer output). Returns the parameter
    /// gradients and d(out)/d(layer input).
    pub fn backward(&self, output_grad: ArrayView1<f32>) -> Result<(LayerGradients, Array1<f32>)> {
        let (pre_activation, inputs) = match (&self.pre_activation_output, &self.inputs) {
            (Some(pre), Some(inputs)) => (pre, inputs),
            _ => return Err(LearnerError::EstimatorUninitialized),
        };

        let adjusted = &output_grad * &self.activation.derivative(pre_activation);
        let weights = inputs
            .view()
            .insert_axis(Axis(1))
            .dot(&adjusted.view().insert_axis(Axis(0)));
        let input_grad = self.weights.dot(&adjusted);

        Ok((
            LayerGradients {
                weights,
                biases: adjusted,
            },
            input_grad,
        ))
    }
}
