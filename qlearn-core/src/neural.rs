//! Deep Q-learning with experience replay and a target network.
mod base;
mod config;
pub use base::NeuralQModule;
pub use config::NeuralQConfig;
