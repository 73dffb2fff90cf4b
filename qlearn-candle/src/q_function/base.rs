use super::{CandleQFunctionConfig, QNetwork};
use crate::{
    mlp::MlpConfig,
    opt::Optimizer,
    util::{copy_varmap, NamedParams},
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use log::{debug, info};
use qlearn_core::{error::QlError, ModelKind, QFunction};
use std::{fs, path::Path};

const ONLINE_FILE: &str = "online.safetensors";
const TARGET_FILE: &str = "target.safetensors";

/// Online and target MLPs of identical architecture on the CPU.
///
/// Only the online network is attached to the optimizer.
pub struct CandleQFunction {
    online: QNetwork,
    target: QNetwork,
    opt: Optimizer,
    in_dim: usize,
    out_dim: usize,
    device: Device,
}

impl CandleQFunction {
    fn network(&self, model: ModelKind) -> &QNetwork {
        match model {
            ModelKind::Online => &self.online,
            ModelKind::Target => &self.target,
        }
    }

    /// Stacks rows of length `dim` into a `[n, dim]` tensor.
    fn to_tensor(&self, rows: &[Vec<f32>], dim: usize) -> Result<Tensor> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows.iter() {
            if row.len() != dim {
                return Err(QlError::ShapeMismatch {
                    expected: vec![dim],
                    found: vec![row.len()],
                }
                .into());
            }
            data.extend_from_slice(row);
        }
        Ok(Tensor::from_vec(data, (rows.len(), dim), &self.device)?)
    }

    /// Input dimension, the length of encoded states.
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Output dimension, the number of actions.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}

impl QFunction for CandleQFunction {
    type Config = CandleQFunctionConfig;
    type Params = NamedParams;

    fn build(config: &Self::Config, in_dim: usize, out_dim: usize) -> Result<Self> {
        let device = Device::Cpu;
        let mlp_config = MlpConfig::new(in_dim, config.units.clone(), out_dim, config.activation);
        let online = QNetwork::build(mlp_config.clone(), &device)?;
        let target = QNetwork::build(mlp_config, &device)?;
        copy_varmap(target.get_varmap(), online.get_varmap())?;
        let opt = config.opt_config.build(online.get_varmap().all_vars())?;
        info!(
            "Built q-networks with input {}, hidden {:?}, output {}",
            in_dim, config.units, out_dim
        );

        Ok(Self {
            online,
            target,
            opt,
            in_dim,
            out_dim,
            device,
        })
    }

    fn predict_batch(&self, model: ModelKind, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(vec![]);
        }
        let xs = self.to_tensor(inputs, self.in_dim)?;
        let ys = self.network(model).forward(&xs)?;
        Ok(ys.to_vec2::<f32>()?)
    }

    fn fit_batch(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        batch_size: usize,
    ) -> Result<f32> {
        if inputs.len() != targets.len() {
            return Err(QlError::ShapeMismatch {
                expected: vec![inputs.len()],
                found: vec![targets.len()],
            }
            .into());
        }
        if inputs.is_empty() {
            return Ok(0.0);
        }

        let batch_size = batch_size.max(1);
        let mut loss_sum = 0f32;
        let mut n_chunks = 0;

        for (xs, ys) in inputs.chunks(batch_size).zip(targets.chunks(batch_size)) {
            let xs = self.to_tensor(xs, self.in_dim)?;
            let ys = self.to_tensor(ys, self.out_dim)?;
            let preds = self.online.forward(&xs)?;
            let loss = candle_nn::loss::mse(&preds, &ys)?;
            self.opt.backward_step(&loss)?;
            loss_sum += loss.to_scalar::<f32>()?;
            n_chunks += 1;
        }

        let loss = loss_sum / n_chunks as f32;
        debug!("Fitted online network on {} samples, loss {}", inputs.len(), loss);
        Ok(loss)
    }

    fn sync_target_from_online(&mut self) -> Result<()> {
        copy_varmap(self.target.get_varmap(), self.online.get_varmap())
    }

    fn get_weights(&self, model: ModelKind) -> Result<Self::Params> {
        NamedParams::from_varmap(self.network(model).get_varmap())
    }

    fn set_weights(&mut self, model: ModelKind, params: &Self::Params) -> Result<()> {
        params.copy_to(self.network(model).get_varmap(), &self.device)
    }

    fn save(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.online.save(path.join(ONLINE_FILE))?;
        self.target.save(path.join(TARGET_FILE))?;
        Ok(())
    }

    /// Loads both models, writing nothing unless both files match the
    /// architecture of this function.
    fn load(&mut self, path: &Path) -> Result<()> {
        let online = NamedParams::from_safetensors(path.join(ONLINE_FILE))?;
        let target = NamedParams::from_safetensors(path.join(TARGET_FILE))?;
        online.check_shapes(&self.get_weights(ModelKind::Online)?)?;
        target.check_shapes(&self.get_weights(ModelKind::Target)?)?;

        self.set_weights(ModelKind::Online, &online)?;
        self.set_weights(ModelKind::Target, &target)?;
        info!("Load q-networks from {:?}", path);
        Ok(())
    }
}
