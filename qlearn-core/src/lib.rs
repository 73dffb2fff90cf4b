#![warn(missing_docs)]
//! A library for tabular and deep Q-learning.
//!
//! The engine is driven step by step by an external episode loop through the
//! [`LearningModule`] trait, implemented by [`TabularQModule`] and
//! [`NeuralQModule`]. The neural module is generic over a [`QFunction`], a pair of
//! online and target models provided by a backend crate.
pub mod encoder;
pub mod error;
pub mod explorer;
pub mod q_table;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{ExperienceBufferBase, LearningModule, ModelKind, QFunction, ReplayBufferBase};

mod neural;
pub use neural::{NeuralQConfig, NeuralQModule};

mod tabular;
pub use tabular::{TabularQConfig, TabularQModule};
