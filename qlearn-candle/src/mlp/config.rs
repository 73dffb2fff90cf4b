use serde::{Deserialize, Serialize};

/// Activation function of hidden layers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum Activation {
    /// Rectified linear unit.
    ReLU,

    /// Exponential linear unit with `alpha = 1`.
    Elu,
}

/// Configuration of [`Mlp`](super::Mlp).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation: Activation,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `units` - widths of the hidden layers.
    /// * `activation` - activation function after each hidden layer. The output layer is linear.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize, activation: Activation) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation,
        }
    }

    /// Input dimension.
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Output dimension.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}
