//! Core interfaces.
mod learning_module;
mod q_function;
mod replay_buffer;
pub(crate) use learning_module::validate_setup;
pub use learning_module::LearningModule;
pub use q_function::{ModelKind, QFunction};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
