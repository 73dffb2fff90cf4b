//! Adam optimizer of the online network.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::Optimizer as _;
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of [`Optimizer`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OptimizerConfig {
    lr: f64,
    #[serde(default)]
    amsgrad: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lr: 0.001,
            amsgrad: false,
        }
    }
}

impl OptimizerConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.lr = v;
        self
    }

    /// Uses the AMSGrad variant.
    pub fn amsgrad(mut self, v: bool) -> Self {
        self.amsgrad = v;
        self
    }

    /// Returns the learning rate.
    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Constructs the optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let params = ParamsAdam {
            lr: self.lr,
            amsgrad: self.amsgrad,
            ..ParamsAdam::default()
        };
        Ok(Optimizer {
            adam: Adam::new(vars, params)?,
        })
    }
}

/// Adam over the variables of one network.
pub struct Optimizer {
    adam: Adam,
}

impl Optimizer {
    /// Computes gradients of `loss` and updates the variables.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        Ok(self.adam.backward_step(loss)?)
    }
}
