//! Interface of learning modules.
use crate::{error::QlError, explorer::ExplorationPolicy, record::Record};
use anyhow::Result;
use std::path::Path;

/// A learner driven step by step by an external episode loop.
///
/// The driver calls [`setup_module`](LearningModule::setup_module) once, then per
/// step [`get_action`](LearningModule::get_action), applies the action to its
/// environment, and feeds the result to [`train`](LearningModule::train). At the
/// end of each episode it calls
/// [`end_simulation_update`](LearningModule::end_simulation_update).
pub trait LearningModule {
    /// Allocates the value estimator for states with the given cardinalities.
    ///
    /// On failure the module stays uninitialized.
    fn setup_module(&mut self, state_dims: &[usize], action_size: usize) -> Result<()>;

    /// Selects an action for `state`.
    fn get_action(&mut self, state: &[usize]) -> Result<usize>;

    /// Learns from a single transition.
    ///
    /// Returns a record of training metrics when an update produced any.
    fn train(
        &mut self,
        orig_state: &[usize],
        res_state: &[usize],
        action: usize,
        reward: f32,
        done: bool,
    ) -> Result<Option<Record>>;

    /// Decays the exploration rate. Call exactly once per finished episode.
    fn end_simulation_update(&mut self) -> Record;

    /// Returns the exploration policy.
    fn exploration_policy(&self) -> &dyn ExplorationPolicy;

    /// Returns the exploration policy as mutable.
    fn exploration_policy_mut(&mut self) -> &mut dyn ExplorationPolicy;

    /// Saves the learned values.
    fn save(&self, path: &Path) -> Result<()>;

    /// Loads learned values saved with [`save`](LearningModule::save).
    ///
    /// `setup_module` must have been called before.
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Checks the arguments of [`LearningModule::setup_module`].
pub(crate) fn validate_setup(state_dims: &[usize], action_size: usize) -> Result<(), QlError> {
    if state_dims.is_empty() || state_dims.contains(&0) {
        return Err(QlError::Configuration(format!(
            "state dimensions must be non-empty and positive, got {:?}",
            state_dims
        )));
    }

    if action_size == 0 {
        return Err(QlError::Configuration(
            "the number of actions must be positive".to_string(),
        ));
    }

    Ok(())
}
