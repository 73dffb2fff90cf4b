//! Interface of value-function approximators.
use anyhow::Result;
use std::path::Path;

/// Selects one of the two models of a [`QFunction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// The model being fitted.
    Online,

    /// The delayed copy of the online model.
    Target,
}

/// A pair of value-function models with identical architecture.
///
/// Both map an encoded state of length `in_dim` to `out_dim` action values. Only
/// the online model is fitted; the target model changes only through
/// [`sync_target_from_online`](QFunction::sync_target_from_online) or
/// [`set_weights`](QFunction::set_weights). The two never share parameters.
pub trait QFunction {
    /// Configuration of the models.
    type Config;

    /// Opaque, copyable snapshot of the parameters of one model.
    type Params: Clone;

    /// Builds online and target models, the target starting as a copy of the online one.
    fn build(config: &Self::Config, in_dim: usize, out_dim: usize) -> Result<Self>
    where
        Self: Sized;

    /// Evaluates a model on a batch of encoded states.
    fn predict_batch(&self, model: ModelKind, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>>;

    /// Fits the online model to `targets` with mean squared error and returns the
    /// mean loss over the processed chunks of `batch_size` samples.
    fn fit_batch(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        batch_size: usize,
    ) -> Result<f32>;

    /// Copies every parameter of the online model into the target model.
    fn sync_target_from_online(&mut self) -> Result<()>;

    /// Takes a snapshot of the parameters of a model.
    fn get_weights(&self, model: ModelKind) -> Result<Self::Params>;

    /// Overwrites the parameters of a model.
    fn set_weights(&mut self, model: ModelKind, params: &Self::Params) -> Result<()>;

    /// Saves both models into the directory `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Loads both models from the directory `path`.
    fn load(&mut self, path: &Path) -> Result<()>;
}
