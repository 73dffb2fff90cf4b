use crate::mlp::{Mlp, MlpConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use std::path::Path;

/// An MLP together with the [`VarMap`] owning its variables.
pub struct QNetwork {
    varmap: VarMap,
    mlp: Mlp,
}

impl QNetwork {
    /// Constructs [`QNetwork`] with freshly initialized variables.
    pub fn build(config: MlpConfig, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let mlp = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
            Mlp::build(vb, config)?
        };
        Ok(Self { varmap, mlp })
    }

    /// Outputs action values for a batch of encoded states.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.mlp.forward(xs)
    }

    /// Returns the variables of the network.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the variables as a safetensors file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save q-network to {:?}", path.as_ref());
        Ok(())
    }
}
