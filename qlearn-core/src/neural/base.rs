//! Deep Q-learning module.
use super::NeuralQConfig;
use crate::{
    base::validate_setup,
    encoder::{EncodingMode, StateEncoder},
    error::QlError,
    explorer::{argmax, EpsilonGreedy, ExplorationPolicy},
    record::{Record, RecordValue},
    replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition},
    ExperienceBufferBase, LearningModule, ModelKind, QFunction, ReplayBufferBase,
};
use anyhow::Result;
use log::{debug, info};
use std::path::Path;

/// Components allocated by `setup_module()`.
struct Ready<F> {
    encoder: StateEncoder,
    action_size: usize,
    qf: F,
    buffer: ReplayBuffer<Transition<Vec<f32>>>,
}

/// Q-learning with a function approximator, experience replay and a target model.
///
/// Actions are selected with the target model while fitting updates the online
/// model, so the executed policy only changes when the target is synchronized.
pub struct NeuralQModule<F>
where
    F: QFunction,
{
    discount_factor: f32,
    replay_memory_size: usize,
    min_replay_memory_size: usize,
    minibatch_size: usize,
    update_target_every: usize,
    encoding: EncodingMode,
    replay_seed: u64,
    q_config: F::Config,
    explorer: Box<dyn ExplorationPolicy>,
    target_update_counter: usize,
    n_fits: usize,
    ready: Option<Ready<F>>,
}

impl<F> NeuralQModule<F>
where
    F: QFunction,
    F::Config: Default + Clone,
{
    /// Constructs the module with an epsilon-greedy explorer built from `config`.
    pub fn build(config: NeuralQConfig<F::Config>) -> Self {
        let explorer = Box::new(EpsilonGreedy::build(config.explorer.clone()));
        Self::build_with_explorer(config, explorer)
    }

    /// Constructs the module with the given exploration policy.
    ///
    /// The explorer configuration in `config` is ignored.
    pub fn build_with_explorer(
        config: NeuralQConfig<F::Config>,
        explorer: Box<dyn ExplorationPolicy>,
    ) -> Self {
        let config = config.sanitized();
        info!(
            "Initialized Neural Q-Learning with discount factor: {}, replay memory: {}, warmup: {}, minibatch: {}, target update every: {}",
            config.discount_factor,
            config.replay_memory_size,
            config.min_replay_memory_size,
            config.minibatch_size,
            config.update_target_every,
        );

        Self {
            discount_factor: config.discount_factor,
            replay_memory_size: config.replay_memory_size,
            min_replay_memory_size: config.min_replay_memory_size,
            minibatch_size: config.minibatch_size,
            update_target_every: config.update_target_every,
            encoding: config.encoding,
            replay_seed: config.replay_seed,
            q_config: config.q_config,
            explorer,
            target_update_counter: 0,
            n_fits: 0,
            ready: None,
        }
    }
}

impl<F> NeuralQModule<F>
where
    F: QFunction,
{
    /// Returns the online/target model pair, `None` before `setup_module()`.
    pub fn q_function(&self) -> Option<&F> {
        self.ready.as_ref().map(|r| &r.qf)
    }

    /// Returns the online/target model pair as mutable, e.g., to restore weights.
    pub fn q_function_mut(&mut self) -> Option<&mut F> {
        self.ready.as_mut().map(|r| &mut r.qf)
    }

    /// Returns the number of stored transitions.
    pub fn replay_memory_len(&self) -> usize {
        self.ready.as_ref().map_or(0, |r| r.buffer.len())
    }

    /// Returns the number of terminal fits since the last target synchronization.
    pub fn target_update_counter(&self) -> usize {
        self.target_update_counter
    }

    /// Returns the number of fits performed.
    pub fn n_fits(&self) -> usize {
        self.n_fits
    }

    fn ready(&self) -> Result<&Ready<F>, QlError> {
        self.ready.as_ref().ok_or(QlError::NotInitialized)
    }

    /// Samples a minibatch and fits the online model on it, returning the loss.
    fn fit_minibatch(&mut self) -> Result<Option<f32>> {
        let discount_factor = self.discount_factor;
        let minibatch_size = self.minibatch_size;
        let ready = self.ready.as_mut().ok_or(QlError::NotInitialized)?;

        let batch = match ready.buffer.batch(minibatch_size) {
            Ok(batch) => batch,
            Err(e) => match e.downcast_ref::<QlError>() {
                Some(QlError::InsufficientData { .. }) => return Ok(None),
                _ => return Err(e),
            },
        };

        let current_states: Vec<Vec<f32>> = batch.iter().map(|t| t.orig_state.clone()).collect();
        let res_states: Vec<Vec<f32>> = batch.iter().map(|t| t.res_state.clone()).collect();
        let mut current_qs = ready.qf.predict_batch(ModelKind::Online, &current_states)?;
        let future_qs = ready.qf.predict_batch(ModelKind::Target, &res_states)?;

        // Only the slot of the taken action gets a new target, the others keep
        // the online prediction and contribute no error.
        for ((tr, current_q), future_q) in batch.iter().zip(current_qs.iter_mut()).zip(future_qs.iter())
        {
            let new_q = if tr.is_done {
                tr.reward
            } else {
                tr.reward + discount_factor * future_q[argmax(future_q)]
            };
            current_q[tr.action] = new_q;
        }

        let loss = ready
            .qf
            .fit_batch(&current_states, &current_qs, minibatch_size)?;
        self.n_fits += 1;

        Ok(Some(loss))
    }
}

impl<F> LearningModule for NeuralQModule<F>
where
    F: QFunction,
{
    fn setup_module(&mut self, state_dims: &[usize], action_size: usize) -> Result<()> {
        self.ready = None;
        validate_setup(state_dims, action_size)?;

        let encoder = StateEncoder::new(state_dims, self.encoding);
        info!(
            "Creating online and target models with input size {} and output size {}",
            encoder.encoded_len(),
            action_size
        );
        let qf = F::build(&self.q_config, encoder.encoded_len(), action_size)?;
        let buffer = ReplayBuffer::build(
            &ReplayBufferConfig::default()
                .capacity(self.replay_memory_size)
                .seed(self.replay_seed),
        );

        self.target_update_counter = 0;
        self.n_fits = 0;
        self.ready = Some(Ready {
            encoder,
            action_size,
            qf,
            buffer,
        });
        Ok(())
    }

    fn get_action(&mut self, state: &[usize]) -> Result<usize> {
        let ready = self.ready()?;
        let encoded = ready.encoder.encode(state)?;
        let values = ready.qf.predict_batch(ModelKind::Target, &[encoded])?;
        let values = values
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty prediction for state {:?}", state))?;
        Ok(self.explorer.decide(&values))
    }

    /// Stores the transition and, once the replay memory holds enough
    /// transitions, fits the online model on a random minibatch.
    ///
    /// The target model is synchronized when the number of terminal fits
    /// exceeds `update_target_every`.
    fn train(
        &mut self,
        orig_state: &[usize],
        res_state: &[usize],
        action: usize,
        reward: f32,
        done: bool,
    ) -> Result<Option<Record>> {
        let ready = self.ready.as_mut().ok_or(QlError::NotInitialized)?;
        let orig_state = ready.encoder.encode(orig_state)?;
        let res_state = ready.encoder.encode(res_state)?;
        if action >= ready.action_size {
            return Err(QlError::InvalidAction {
                action,
                action_size: ready.action_size,
            }
            .into());
        }

        ready
            .buffer
            .push(Transition::new(orig_state, res_state, action, reward, done))?;

        if ready.buffer.len() < self.min_replay_memory_size {
            return Ok(None);
        }

        let loss = match self.fit_minibatch()? {
            Some(loss) => loss,
            None => return Ok(None),
        };
        let mut record = Record::from_scalar("loss", loss);

        if done {
            self.target_update_counter += 1;

            if self.target_update_counter > self.update_target_every {
                if let Some(ready) = self.ready.as_mut() {
                    ready.qf.sync_target_from_online()?;
                }
                debug!("Synchronized target model after {} fits", self.n_fits);
                self.target_update_counter = 0;
                record.insert("target_synced", RecordValue::Scalar(1.0));
            }
        }

        Ok(Some(record))
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

    /// Saves the online and target models into the directory `path`.
    fn save(&self, path: &Path) -> Result<()> {
        self.ready()?.qf.save(path)
    }

    /// Loads both models. On a shape mismatch the module becomes uninitialized.
    fn load(&mut self, path: &Path) -> Result<()> {
        let ready = self.ready.as_mut().ok_or(QlError::NotInitialized)?;

        match ready.qf.load(path) {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Some(QlError::ShapeMismatch { .. }) = e.downcast_ref::<QlError>() {
                    self.ready = None;
                }
                Err(e)
            }
        }
    }
}
