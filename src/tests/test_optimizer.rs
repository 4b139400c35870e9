use ndarray::array;

use crate::optimizer::{Adam, Optimizer, OptimizerKind, OptimizerWrapper, SGD};

use super::approx_eq;

#[test]
fn test_sgd_update_weights() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, 0.2], [0.3, 0.4]];

    sgd.update_weights(0, &mut weights, &gradients, 0.01);

    let expected = array![[0.999, 0.998], [0.997, 0.996]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!(approx_eq(*w, *e, 1e-6));
    }
}

#[test]
fn test_sgd_update_biases() {
    let mut sgd = SGD::new();
    let mut biases = array![1.0, 1.0];
    sgd.update_biases(0, &mut biases, &array![0.1, 0.2], 0.01);

    assert!(approx_eq(biases[0], 0.999, 1e-6));
    assert!(approx_eq(biases[1], 0.998, 1e-6));
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut adam = Adam::default();
    let mut weights = array![[1.0, 1.0]];
    adam.update_weights(0, &mut weights, &array![[0.5, -2.0]], 0.01);

    assert_eq!(adam.steps(0), 1);
    assert!(approx_eq(weights[[0, 0]], 0.99, 1e-4));
    assert!(approx_eq(weights[[0, 1]], 1.01, 1e-4));
}

#[test]
fn test_adam_tracks_layers_separately() {
    let mut adam = Adam::default();
    let mut first = array![[0.0]];
    let mut second = array![[0.0]];

    adam.update_weights(0, &mut first, &array![[1.0]], 0.1);
    adam.update_weights(0, &mut first, &array![[1.0]], 0.1);
    adam.update_weights(2, &mut second, &array![[1.0]], 0.1);

    assert_eq!(adam.steps(0), 2);
    assert_eq!(adam.steps(1), 0);
    assert_eq!(adam.steps(2), 1);
}

#[test]
fn test_wrapper_from_kind() {
    assert!(matches!(OptimizerWrapper::from_kind(OptimizerKind::Sgd), OptimizerWrapper::SGD(_)));
    assert!(matches!(OptimizerWrapper::from_kind(OptimizerKind::Adam), OptimizerWrapper::Adam(_)));
}
