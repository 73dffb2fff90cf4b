//! Configuration of [`NeuralQModule`](super::NeuralQModule).
use crate::{encoder::EncodingMode, explorer::EpsilonGreedyConfig};
use anyhow::Result;
use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`NeuralQModule`](super::NeuralQModule).
///
/// `Q` is the configuration of the [`QFunction`](crate::QFunction).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NeuralQConfig<Q> {
    pub(super) discount_factor: f32,
    pub(super) replay_memory_size: usize,
    pub(super) min_replay_memory_size: usize,
    pub(super) minibatch_size: usize,
    pub(super) update_target_every: usize,
    pub(super) encoding: EncodingMode,
    pub(super) replay_seed: u64,
    pub(super) explorer: EpsilonGreedyConfig,
    pub(super) q_config: Q,
}

impl<Q: Default> Default for NeuralQConfig<Q> {
    fn default() -> Self {
        Self {
            discount_factor: 0.9,
            replay_memory_size: 50_000,
            min_replay_memory_size: 1_000,
            minibatch_size: 256,
            update_target_every: 1_000,
            encoding: EncodingMode::OneHot,
            replay_seed: 1,
            explorer: EpsilonGreedyConfig::default(),
            q_config: Q::default(),
        }
    }
}

impl<Q> NeuralQConfig<Q>
where
    Q: Default + Clone,
{
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the capacity of the replay buffer.
    pub fn replay_memory_size(mut self, v: usize) -> Self {
        self.replay_memory_size = v;
        self
    }

    /// Sets the number of stored transitions required before fitting starts.
    pub fn min_replay_memory_size(mut self, v: usize) -> Self {
        self.min_replay_memory_size = v;
        self
    }

    /// Sets the number of transitions per fit.
    pub fn minibatch_size(mut self, v: usize) -> Self {
        self.minibatch_size = v;
        self
    }

    /// Sets the number of terminal fits after which the target model is synchronized.
    pub fn update_target_every(mut self, v: usize) -> Self {
        self.update_target_every = v;
        self
    }

    /// Sets the state encoding.
    pub fn encoding(mut self, v: EncodingMode) -> Self {
        self.encoding = v;
        self
    }

    /// Sets the seed of minibatch sampling.
    pub fn replay_seed(mut self, v: u64) -> Self {
        self.replay_seed = v;
        self
    }

    /// Sets the configuration of the epsilon-greedy explorer.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the configuration of the value-function approximator.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = v;
        self
    }

    /// Replaces out-of-range hyperparameters, logging a warning for each.
    pub(super) fn sanitized(mut self) -> Self {
        let default = Self::default();

        if !(0.0..=1.0).contains(&self.discount_factor) {
            warn!(
                "Discount factor {} is out of [0, 1], using {}",
                self.discount_factor, default.discount_factor
            );
            self.discount_factor = default.discount_factor;
        }

        if self.replay_memory_size == 0 {
            warn!(
                "Replay memory size must be positive, using {}",
                default.replay_memory_size
            );
            self.replay_memory_size = default.replay_memory_size;
        }

        if self.minibatch_size == 0 {
            warn!(
                "Minibatch size must be positive, using {}",
                default.minibatch_size
            );
            self.minibatch_size = default.minibatch_size;
        }

        if self.minibatch_size > self.replay_memory_size {
            warn!(
                "Minibatch size {} exceeds the replay memory size, using {}",
                self.minibatch_size, self.replay_memory_size
            );
            self.minibatch_size = self.replay_memory_size;
        }

        if self.min_replay_memory_size < self.minibatch_size {
            warn!(
                "Minimum replay memory size {} is smaller than the minibatch size, using {}",
                self.min_replay_memory_size, self.minibatch_size
            );
            self.min_replay_memory_size = self.minibatch_size;
        }

        if self.min_replay_memory_size > self.replay_memory_size {
            warn!(
                "Minimum replay memory size {} exceeds the replay memory size, using {}",
                self.min_replay_memory_size, self.replay_memory_size
            );
            self.min_replay_memory_size = self.replay_memory_size;
        }

        self
    }
}

impl<Q> NeuralQConfig<Q>
where
    Q: DeserializeOwned + Serialize,
{
    /// Constructs [`NeuralQConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`NeuralQConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
