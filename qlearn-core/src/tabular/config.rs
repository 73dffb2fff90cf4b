//! Configuration of [`TabularQModule`](super::TabularQModule).
use crate::explorer::EpsilonGreedyConfig;
use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`TabularQModule`](super::TabularQModule).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TabularQConfig {
    pub(super) discount_factor: f32,
    pub(super) learning_rate: f32,
    pub(super) table_in_file: Option<PathBuf>,
    pub(super) seed: u64,
    pub(super) explorer: EpsilonGreedyConfig,
}

impl Default for TabularQConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.9,
            learning_rate: 0.1,
            table_in_file: None,
            seed: 42,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl TabularQConfig {
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets a file from which the table is loaded in `setup_module()` instead of
    /// being initialized randomly.
    pub fn table_in_file(mut self, v: impl Into<PathBuf>) -> Self {
        self.table_in_file = Some(v.into());
        self
    }

    /// Sets the seed used to initialize the table.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the configuration of the epsilon-greedy explorer.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Replaces out-of-range hyperparameters with defaults, logging a warning for each.
    pub(super) fn sanitized(mut self) -> Self {
        let default = Self::default();

        if !(0.0..=1.0).contains(&self.discount_factor) {
            warn!(
                "Discount factor {} is out of [0, 1], using {}",
                self.discount_factor, default.discount_factor
            );
            self.discount_factor = default.discount_factor;
        }

        if !(self.learning_rate > 0.0) {
            warn!(
                "Learning rate {} is not positive, using {}",
                self.learning_rate, default.learning_rate
            );
            self.learning_rate = default.learning_rate;
        }

        self
    }

    /// Constructs [`TabularQConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TabularQConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_tabular_config() -> Result<()> {
        let config = TabularQConfig::default()
            .discount_factor(0.95)
            .learning_rate(0.5)
            .table_in_file("q_table.bin");

        let dir = TempDir::new("tabular_config")?;
        let path = dir.path().join("tabular.yaml");
        config.save(&path)?;
        assert_eq!(TabularQConfig::load(&path)?, config);

        Ok(())
    }

    #[test]
    fn test_sanitized() {
        let config = TabularQConfig::default()
            .discount_factor(1.5)
            .learning_rate(-0.1)
            .sanitized();
        assert_eq!(config.discount_factor, 0.9);
        assert_eq!(config.learning_rate, 0.1);
    }
}
