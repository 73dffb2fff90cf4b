//! Tabular Q-learning.
mod base;
mod config;
pub use base::TabularQModule;
pub use config::TabularQConfig;
