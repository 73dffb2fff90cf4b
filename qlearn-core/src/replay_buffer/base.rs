//! FIFO replay buffer with uniform sampling.
use super::{config::DEFAULT_CAPACITY, ReplayBufferConfig};
use crate::{error::QlError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use log::warn;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use std::collections::{vec_deque::Iter, VecDeque};

/// A bounded buffer of experiences.
///
/// When full, pushing evicts the oldest item. Batches are drawn uniformly at
/// random without replacement.
pub struct ReplayBuffer<T> {
    capacity: usize,
    buf: VecDeque<T>,
    rng: StdRng,
}

impl<T> ReplayBuffer<T> {
    /// Maximum number of stored items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the stored items, oldest first.
    pub fn iter(&self) -> Iter<'_, T> {
        self.buf.iter()
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl<T> ExperienceBufferBase for ReplayBuffer<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn push(&mut self, tr: T) -> Result<()> {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(tr);
        Ok(())
    }
}

impl<T: Clone> ReplayBufferBase for ReplayBuffer<T> {
    type Config = ReplayBufferConfig;
    type Batch = Vec<T>;

    fn build(config: &Self::Config) -> Self {
        let capacity = if config.capacity == 0 {
            warn!(
                "Replay buffer capacity must be positive, using {}",
                DEFAULT_CAPACITY
            );
            DEFAULT_CAPACITY
        } else {
            config.capacity
        };

        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples `size` distinct items.
    ///
    /// Fails with [`QlError::InsufficientData`] if fewer than `size` items are stored.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if self.buf.len() < size {
            return Err(QlError::InsufficientData {
                requested: size,
                available: self.buf.len(),
            }
            .into());
        }

        Ok(index::sample(&mut self.rng, self.buf.len(), size)
            .into_iter()
            .map(|ix| self.buf[ix].clone())
            .collect())
    }
}
