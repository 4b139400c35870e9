use ndarray::ArrayView1;

use crate::error::Result;
use crate::network::{NetworkGradients, ValueNetwork};

/// Compare analytical value gradients against central finite differences.
///
/// Returns the largest absolute difference over every weight and bias.
pub fn gradient_check(network: &mut ValueNetwork, input: ArrayView1<f32>, epsilon: f32) -> Result<f32> {
    let (_, analytical) = network.value_gradients(input)?;
    let mut worst = 0.0f32;

    for layer_idx in 0..network.layers.len() {
        let (rows, cols) = network.layers[layer_idx].weights.dim();
        for i in 0..rows {
            for j in 0..cols {
                let original = network.layers[layer_idx].weights[[i, j]];
                network.layers[layer_idx].weights[[i, j]] = original + epsilon;
                let plus = network.predict(input)?;
                network.layers[layer_idx].weights[[i, j]] = original - epsilon;
                let minus = network.predict(input)?;
                network.layers[layer_idx].weights[[i, j]] = original;

                let numerical = (plus - minus) / (2.0 * epsilon);
                worst = worst.max((numerical - analytical[layer_idx].weights[[i, j]]).abs());
            }
        }

        for k in 0..cols {
            let original = network.layers[layer_idx].biases[k];
            network.layers[layer_idx].biases[k] = original + epsilon;
            let plus = network.predict(input)?;
            network.layers[layer_idx].biases[k] = original - epsilon;
            let minus = network.predict(input)?;
            network.layers[layer_idx].biases[k] = original;

            let numerical = (plus - minus) / (2.0 * epsilon);
            worst = worst.max((numerical - analytical[layer_idx].biases[k]).abs());
        }
    }

    Ok(worst)
}

/// L2 norm over all layers' gradients
pub fn gradient_norm(gradients: &NetworkGradients) -> f32 {
    gradients
        .iter()
        .map(|g| g.weights.iter().chain(g.biases.iter()).map(|&x| x * x).sum::<f32>())
        .sum::<f32>()
        .sqrt()
}
