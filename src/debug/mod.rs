pub mod gradient_check;

pub use gradient_check::{gradient_check, gradient_norm};
