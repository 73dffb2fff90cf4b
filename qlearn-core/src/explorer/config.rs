//! Configuration of [`EpsilonGreedy`](super::EpsilonGreedy).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    str::FromStr,
};

/// How epsilon shrinks at the end of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayMode {
    /// `epsilon = max(epsilon * decay_rate, min_epsilon)`
    Multiplication,

    /// `epsilon = max(epsilon - decay_rate, min_epsilon)`
    Linear,
}

impl DecayMode {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multiplication => "multiplication",
            Self::Linear => "linear",
        }
    }
}

impl Default for DecayMode {
    fn default() -> Self {
        Self::Multiplication
    }
}

impl FromStr for DecayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiplication" => Ok(Self::Multiplication),
            "linear" => Ok(Self::Linear),
            _ => Err(s.to_string()),
        }
    }
}

/// Configuration of [`EpsilonGreedy`](super::EpsilonGreedy).
///
/// `decay_mode` is kept as a string so that a typo in a configuration file ends
/// up as a warning at build time instead of a deserialization failure.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedyConfig {
    /// Initial exploration rate.
    pub epsilon: f32,

    /// Factor (multiplication) or step (linear) applied per episode.
    pub decay_rate: f32,

    /// Lower bound of epsilon.
    pub min_epsilon: f32,

    /// `"multiplication"` or `"linear"`.
    pub decay_mode: String,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            decay_rate: 0.999,
            min_epsilon: 0.01,
            decay_mode: DecayMode::Multiplication.as_str().to_string(),
            seed: 42,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Sets the initial epsilon.
    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the decay rate, a factor or a step depending on the decay mode.
    pub fn decay_rate(mut self, v: f32) -> Self {
        self.decay_rate = v;
        self
    }

    /// Sets the lower bound of epsilon.
    pub fn min_epsilon(mut self, v: f32) -> Self {
        self.min_epsilon = v;
        self
    }

    /// Sets the decay mode by name, `"multiplication"` or `"linear"`.
    pub fn decay_mode(mut self, v: impl Into<String>) -> Self {
        self.decay_mode = v.into();
        self
    }

    /// Sets the seed of the random number generator.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`EpsilonGreedyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EpsilonGreedyConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
