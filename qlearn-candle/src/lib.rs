//! Value-function approximator for [`qlearn_core`] implemented with
//! [candle](https://crates.io/crates/candle-core).
pub mod mlp;
pub mod opt;
mod q_function;
pub mod util;
pub use q_function::{CandleQFunction, CandleQFunctionConfig, QNetwork};
use qlearn_core::{NeuralQConfig, NeuralQModule};

/// Deep Q-learning module backed by [`CandleQFunction`].
pub type DqnModule = NeuralQModule<CandleQFunction>;

/// Configuration of [`DqnModule`].
pub type DqnConfig = NeuralQConfig<CandleQFunctionConfig>;
