//! Gradient-descent optimizers for the value network.
//!
//! Both optimizers minimize: a parameter moves against the gradient it is
//! given. State is kept per layer index.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub trait Optimizer {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
}

/// Selects the optimizer from configuration
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    #[default]
    Sgd,
    Adam,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl OptimizerWrapper {
    pub fn from_kind(kind: OptimizerKind) -> Self {
        match kind {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::default()),
        }
    }
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam with moment estimates allocated lazily per layer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Option<Array2<f32>>>,
    v_weights: Vec<Option<Array2<f32>>>,
    m_biases: Vec<Option<Array1<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
    steps: Vec<i32>,
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            steps: Vec::new(),
        }
    }

    fn ensure_layer(&mut self, layer: usize) {
        if self.steps.len() <= layer {
            let len = layer + 1;
            self.m_weights.resize(len, None);
            self.v_weights.resize(len, None);
            self.m_biases.resize(len, None);
            self.v_biases.resize(len, None);
            self.steps.resize(len, 0);
        }
    }

    /// Completed update steps for a layer
    pub fn steps(&self, layer: usize) -> i32 {
        self.steps.get(layer).copied().unwrap_or(0)
    }
}

impl Optimizer for Adam {
    // Weights advance the step counter; biases of the same layer reuse it.
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        self.ensure_layer(layer);
        self.steps[layer] += 1;
        let t = self.steps[layer];
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        let m = self.m_weights[layer].get_or_insert_with(|| Array2::zeros(weights.dim()));
        let v = self.v_weights[layer].get_or_insert_with(|| Array2::zeros(weights.dim()));
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m_correction = 1.0 - beta1.powi(t);
        let v_correction = 1.0 - beta2.powi(t);
        ndarray::Zip::from(weights).and(&*m).and(&*v).for_each(|w, &m, &v| {
            let m_hat = m / m_correction;
            let v_hat = v / v_correction;
            *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        });
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        self.ensure_layer(layer);
        let t = self.steps[layer].max(1);
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        let m = self.m_biases[layer].get_or_insert_with(|| Array1::zeros(biases.len()));
        let v = self.v_biases[layer].get_or_insert_with(|| Array1::zeros(biases.len()));
        m.zip_mut_with(gradients, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v.zip_mut_with(gradients, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let m_correction = 1.0 - beta1.powi(t);
        let v_correction = 1.0 - beta2.powi(t);
        ndarray::Zip::from(biases).and(&*m).and(&*v).for_each(|b, &m, &v| {
            let m_hat = m / m_correction;
            let v_hat = v / v_correction;
            *b -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        });
    }
}
