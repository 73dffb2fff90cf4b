use crate::{mlp::Activation, opt::OptimizerConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`CandleQFunction`](super::CandleQFunction).
///
/// Input and output dimensions are given at build time by the learning module.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CandleQFunctionConfig {
    pub(super) units: Vec<usize>,
    pub(super) activation: Activation,
    pub(super) opt_config: OptimizerConfig,
}

impl Default for CandleQFunctionConfig {
    fn default() -> Self {
        Self {
            units: vec![64, 16],
            activation: Activation::Elu,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl CandleQFunctionConfig {
    /// Sets the widths of the hidden layers.
    pub fn units(mut self, v: Vec<usize>) -> Self {
        self.units = v;
        self
    }

    /// Sets the activation function of the hidden layers.
    pub fn activation(mut self, v: Activation) -> Self {
        self.activation = v;
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the learning rate of the optimizer.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.opt_config = self.opt_config.learning_rate(v);
        self
    }

    /// Constructs [`CandleQFunctionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CandleQFunctionConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
