//! Online/target pair of MLP value functions.
mod base;
mod config;
mod network;
pub use base::CandleQFunction;
pub use config::CandleQFunctionConfig;
pub use network::QNetwork;
