//! # Activation Functions Module
//!
//! Element-wise non-linearities for the critic's value network.
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Linear**: identity, always used on the scalar output unit
//! - **Sigmoid**, **Tanh**, **LeakyReLU**
//!
//! ```rust,no_run
//! use peg_learner::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![1.0, -0.5, 0.0, 2.0];
//! Activation::Relu.apply(&mut data);
//! ```

pub mod functions;

pub use functions::Activation;
