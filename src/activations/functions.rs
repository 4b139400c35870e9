use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// An enumeration of the activation functions a dense layer can apply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Sigmoid,
    Tanh,
    LeakyRelu { alpha: f32 },
}

impl Activation {
    /// Apply the activation function to an input array in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        match self {
            Activation::Relu => {
                input.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Sigmoid => {
                input.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
            }
            Activation::Tanh => {
                input.mapv_inplace(|v| v.tanh());
            }
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                input.mapv_inplace(|v| if v > 0.0 { v } else { a * v });
            }
        }
    }

    /// Derivative with respect to the pre-activation input.
    pub fn derivative(&self, input: &Array1<f32>) -> Array1<f32> {
        match self {
            Activation::Relu => input.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array1::ones(input.len()),
            Activation::Sigmoid => input.mapv(|v| {
                let sigmoid = 1.0 / (1.0 + (-v).exp());
                sigmoid * (1.0 - sigmoid)
            }),
            Activation::Tanh => input.mapv(|v| {
                let tanh_v = v.tanh();
                1.0 - tanh_v * tanh_v
            }),
            Activation::LeakyRelu { alpha } => {
                let a = *alpha;
                input.mapv(|v| if v > 0.0 { 1.0 } else { a })
            }
        }
    }
}
