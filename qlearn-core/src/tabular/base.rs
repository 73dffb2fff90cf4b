//! Tabular Q-learning module.
use super::TabularQConfig;
use crate::{
    base::validate_setup,
    encoder::validate_state,
    error::QlError,
    explorer::{EpsilonGreedy, ExplorationPolicy},
    q_table::QTable,
    record::Record,
    LearningModule,
};
use anyhow::Result;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::path::{Path, PathBuf};

/// Q-learning on a dense table indexed directly by raw states.
///
/// Transitions are applied immediately and never stored.
pub struct TabularQModule {
    discount_factor: f32,
    learning_rate: f32,
    table_in_file: Option<PathBuf>,
    seed: u64,
    explorer: Box<dyn ExplorationPolicy>,
    q_table: Option<QTable>,
}

impl TabularQModule {
    /// Constructs the module with an epsilon-greedy explorer built from `config`.
    pub fn build(config: TabularQConfig) -> Self {
        let explorer = Box::new(EpsilonGreedy::build(config.explorer.clone()));
        Self::build_with_explorer(config, explorer)
    }

    /// Constructs the module with the given exploration policy.
    ///
    /// The explorer configuration in `config` is ignored.
    pub fn build_with_explorer(
        config: TabularQConfig,
        explorer: Box<dyn ExplorationPolicy>,
    ) -> Self {
        let config = config.sanitized();
        info!(
            "Initialized Tabular Q-Learning with discount factor: {} and learning rate: {}",
            config.discount_factor, config.learning_rate
        );

        Self {
            discount_factor: config.discount_factor,
            learning_rate: config.learning_rate,
            table_in_file: config.table_in_file,
            seed: config.seed,
            explorer,
            q_table: None,
        }
    }

    /// Returns the table, `None` before `setup_module()`.
    pub fn q_table(&self) -> Option<&QTable> {
        self.q_table.as_ref()
    }

    fn q_table_ref(&self) -> Result<&QTable, QlError> {
        self.q_table.as_ref().ok_or(QlError::NotInitialized)
    }
}

impl LearningModule for TabularQModule {
    fn setup_module(&mut self, state_dims: &[usize], action_size: usize) -> Result<()> {
        self.q_table = None;
        validate_setup(state_dims, action_size)?;

        let q_table = match &self.table_in_file {
            None => {
                let mut shape = state_dims.to_vec();
                shape.push(action_size);
                info!("Setting up Q-table of size: {:?}", shape);
                QTable::new(state_dims, action_size, &mut StdRng::seed_from_u64(self.seed))
            }
            Some(path) => {
                info!("Loading table: {:?}", path);
                QTable::load(path, state_dims, action_size)?
            }
        };

        self.q_table = Some(q_table);
        Ok(())
    }

    fn get_action(&mut self, state: &[usize]) -> Result<usize> {
        let values = self.q_table_ref()?.lookup(state)?;
        Ok(self.explorer.decide(&values))
    }

    /// Applies the update rule of [`QTable::update`].
    ///
    /// The future value is the maximum action value of `res_state`, or 0 if
    /// `done`. Both states are validated before the table is touched.
    fn train(
        &mut self,
        orig_state: &[usize],
        res_state: &[usize],
        action: usize,
        reward: f32,
        done: bool,
    ) -> Result<Option<Record>> {
        let (discount_factor, learning_rate) = (self.discount_factor, self.learning_rate);
        let q_table = self.q_table.as_mut().ok_or(QlError::NotInitialized)?;
        validate_state(q_table.state_dims(), res_state)?;

        let max_future_value = if done {
            0.0
        } else {
            q_table.max_value(res_state)?
        };

        let q_value = q_table.update(
            orig_state,
            action,
            reward,
            max_future_value,
            discount_factor,
            learning_rate,
        )?;

        Ok(Some(Record::from_scalar("q_value", q_value)))
    }

    fn end_simulation_update(&mut self) -> Record {
        self.explorer.decay_epsilon();
        Record::from_scalar("epsilon", self.explorer.current_epsilon())
    }

    fn exploration_policy(&self) -> &dyn ExplorationPolicy {
        self.explorer.as_ref()
    }

    fn exploration_policy_mut(&mut self) -> &mut dyn ExplorationPolicy {
        self.explorer.as_mut()
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.q_table_ref()?.save(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let q_table = self.q_table_ref()?;
        let state_dims = q_table.state_dims().to_vec();
        let action_size = q_table.action_size();

        match QTable::load(path, &state_dims, action_size) {
            Ok(q_table) => {
                self.q_table = Some(q_table);
                Ok(())
            }
            Err(e) => {
                if let Some(QlError::ShapeMismatch { .. }) = e.downcast_ref::<QlError>() {
                    self.q_table = None;
                }
                Err(e)
            }
        }
    }
}
