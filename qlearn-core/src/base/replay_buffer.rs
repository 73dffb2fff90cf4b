//! Replay buffer interface.
use anyhow::Result;

/// Interface of buffers storing experiences.
pub trait ExperienceBufferBase {
    /// Items stored in the buffer.
    type Item;

    /// Pushes an experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the number of stored experiences.
    fn len(&self) -> usize;
}

/// Interface of replay buffers generating batches for training.
pub trait ReplayBufferBase {
    /// Configuration of the replay buffer.
    type Config: Clone;

    /// Batch generated for training.
    type Batch;

    /// Builds a replay buffer from its configuration.
    fn build(config: &Self::Config) -> Self;

    /// Samples a batch of `size` experiences.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
