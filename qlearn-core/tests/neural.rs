//! Orchestration of the neural module against a small linear approximator.
use anyhow::Result;
use qlearn_core::{
    error::QlError,
    explorer::EpsilonGreedyConfig,
    LearningModule, ModelKind, NeuralQConfig, NeuralQModule, QFunction,
};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
struct LinearParams {
    w: Vec<f32>,
    b: Vec<f32>,
}

impl LinearParams {
    fn forward(&self, x: &[f32]) -> Vec<f32> {
        let in_dim = x.len();
        self.b
            .iter()
            .enumerate()
            .map(|(o, b)| b + (0..in_dim).map(|i| self.w[o * in_dim + i] * x[i]).sum::<f32>())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct LinearConfig {}

/// `y = W x + b` trained with plain gradient descent. Keeps the last fit around.
struct LinearQFunction {
    online: LinearParams,
    target: LinearParams,
    last_fit: Option<(Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<Vec<f32>>)>,
}

impl LinearQFunction {
    fn model(&self, model: ModelKind) -> &LinearParams {
        match model {
            ModelKind::Online => &self.online,
            ModelKind::Target => &self.target,
        }
    }
}

impl QFunction for LinearQFunction {
    type Config = LinearConfig;
    type Params = LinearParams;

    fn build(_config: &Self::Config, in_dim: usize, out_dim: usize) -> Result<Self> {
        let online = LinearParams {
            w: (0..in_dim * out_dim).map(|i| (i % 7) as f32 * 0.1 - 0.3).collect(),
            b: vec![0.0; out_dim],
        };
        Ok(Self {
            target: online.clone(),
            online,
            last_fit: None,
        })
    }

    fn predict_batch(&self, model: ModelKind, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        let params = self.model(model);
        Ok(inputs.iter().map(|x| params.forward(x)).collect())
    }

    fn fit_batch(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        _batch_size: usize,
    ) -> Result<f32> {
        let preds = self.predict_batch(ModelKind::Online, inputs)?;
        let n = inputs.len() as f32;
        let mut loss = 0.0;

        for ((x, y), t) in inputs.iter().zip(preds.iter()).zip(targets.iter()) {
            for o in 0..y.len() {
                let err = y[o] - t[o];
                loss += err * err / (n * y.len() as f32);
                self.online.b[o] -= 0.1 * err / n;
                for i in 0..x.len() {
                    self.online.w[o * x.len() + i] -= 0.1 * err * x[i] / n;
                }
            }
        }

        self.last_fit = Some((inputs.to_vec(), targets.to_vec(), preds));
        Ok(loss)
    }

    fn sync_target_from_online(&mut self) -> Result<()> {
        self.target = self.online.clone();
        Ok(())
    }

    fn get_weights(&self, model: ModelKind) -> Result<Self::Params> {
        Ok(self.model(model).clone())
    }

    fn set_weights(&mut self, model: ModelKind, params: &Self::Params) -> Result<()> {
        match model {
            ModelKind::Online => self.online = params.clone(),
            ModelKind::Target => self.target = params.clone(),
        }
        Ok(())
    }

    fn save(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

type Module = NeuralQModule<LinearQFunction>;

fn config() -> NeuralQConfig<LinearConfig> {
    NeuralQConfig::default()
        .replay_memory_size(100)
        .min_replay_memory_size(20)
        .minibatch_size(8)
        .update_target_every(1_000)
        .discount_factor(0.5)
        .explorer(EpsilonGreedyConfig::default().epsilon(0.0).min_epsilon(0.0))
}

fn weights(module: &Module, model: ModelKind) -> LinearParams {
    module.q_function().unwrap().get_weights(model).unwrap()
}

#[test]
fn test_no_fit_during_warmup() -> Result<()> {
    let mut module = Module::build(config());
    module.setup_module(&[3, 3], 2)?;
    let online = weights(&module, ModelKind::Online);

    for i in 0..19 {
        let record = module.train(&[i % 3, 0], &[0, i % 3], i % 2, 1.0, i % 4 == 0)?;
        assert!(record.is_none());
    }

    assert_eq!(module.replay_memory_len(), 19);
    assert_eq!(module.n_fits(), 0);
    assert_eq!(weights(&module, ModelKind::Online), online);

    let record = module.train(&[0, 0], &[1, 1], 0, 1.0, false)?;
    assert!(record.unwrap().get_scalar("loss").is_ok());
    assert_eq!(module.n_fits(), 1);
    assert_ne!(weights(&module, ModelKind::Online), online);
    Ok(())
}

#[test]
fn test_only_taken_action_is_retargeted() -> Result<()> {
    let mut module = Module::build(config());
    module.setup_module(&[4], 3)?;

    for i in 0..20 {
        module.train(&[i % 4], &[(i + 1) % 4], 1, 0.5, true)?;
    }

    let (inputs, targets, preds) = module.q_function().unwrap().last_fit.clone().unwrap();
    assert_eq!(inputs.len(), 8);
    for (t, p) in targets.iter().zip(preds.iter()) {
        assert_eq!(t[0], p[0]);
        assert_eq!(t[1], 0.5);
        assert_eq!(t[2], p[2]);
    }
    Ok(())
}

#[test]
fn test_bootstrap_from_target_model() -> Result<()> {
    let mut module = Module::build(config());
    module.setup_module(&[2, 2], 2)?;

    let constant = LinearParams {
        w: vec![0.0; 8],
        b: vec![2.0, 3.0],
    };
    module
        .q_function_mut()
        .unwrap()
        .set_weights(ModelKind::Target, &constant)?;

    for i in 0..20 {
        module.train(&[i % 2, 0], &[1, i % 2], 0, 1.0, false)?;
    }

    let (_, targets, preds) = module.q_function().unwrap().last_fit.clone().unwrap();
    for (t, p) in targets.iter().zip(preds.iter()) {
        assert_eq!(t[0], 1.0 + 0.5 * 3.0);
        assert_eq!(t[1], p[1]);
    }
    Ok(())
}

#[test]
fn test_actions_come_from_target_model() -> Result<()> {
    let mut module = Module::build(config());
    module.setup_module(&[2], 3)?;

    let prefer = |a: usize| LinearParams {
        w: vec![0.0; 6],
        b: (0..3).map(|i| if i == a { 1.0 } else { 0.0 }).collect(),
    };
    let qf = module.q_function_mut().unwrap();
    qf.set_weights(ModelKind::Online, &prefer(0))?;
    qf.set_weights(ModelKind::Target, &prefer(2))?;

    assert_eq!(module.get_action(&[0])?, 2);
    assert_eq!(module.get_action(&[1])?, 2);
    Ok(())
}

#[test]
fn test_target_sync_after_period() -> Result<()> {
    let mut module = Module::build(config().update_target_every(2));
    module.setup_module(&[3], 2)?;

    for i in 0..19 {
        module.train(&[i % 3], &[(i + 1) % 3], i % 2, 1.0, true)?;
    }
    assert_eq!(module.target_update_counter(), 0);

    // three terminal fits, the counter exceeds 2 on the third one
    for k in 1..=2 {
        module.train(&[0], &[1], 0, 1.0, true)?;
        assert_eq!(module.target_update_counter(), k);
        assert_ne!(
            weights(&module, ModelKind::Online),
            weights(&module, ModelKind::Target)
        );
    }

    // non-terminal fits do not count
    module.train(&[0], &[1], 0, 1.0, false)?;
    assert_eq!(module.target_update_counter(), 2);

    let record = module.train(&[2], &[0], 1, 1.0, true)?.unwrap();
    assert_eq!(record.get_scalar("target_synced")?, 1.0);
    assert_eq!(module.target_update_counter(), 0);
    assert_eq!(
        weights(&module, ModelKind::Online),
        weights(&module, ModelKind::Target)
    );
    Ok(())
}

#[test]
fn test_encoding_error_does_not_store() -> Result<()> {
    let mut module = Module::build(config());
    module.setup_module(&[2, 2], 2)?;

    let err = module.train(&[0, 2], &[0, 0], 0, 1.0, true).unwrap_err();
    assert!(matches!(err.downcast_ref::<QlError>(), Some(QlError::Encoding(_))));
    let err = module.train(&[0, 0], &[0, 0], 2, 1.0, true).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QlError>(),
        Some(QlError::InvalidAction { .. })
    ));
    assert_eq!(module.replay_memory_len(), 0);
    Ok(())
}

#[test]
fn test_setup_resets_counters() -> Result<()> {
    let mut module = Module::build(config());
    module.setup_module(&[3], 2)?;

    for i in 0..22 {
        module.train(&[i % 3], &[(i + 1) % 3], i % 2, 1.0, true)?;
    }
    assert_eq!(module.n_fits(), 3);
    assert_eq!(module.target_update_counter(), 3);

    module.setup_module(&[3], 2)?;
    assert_eq!(module.n_fits(), 0);
    assert_eq!(module.target_update_counter(), 0);
    assert_eq!(module.replay_memory_len(), 0);
    Ok(())
}
