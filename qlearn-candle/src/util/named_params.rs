use anyhow::{anyhow, Result};
use candle_core::{safetensors, Device, Tensor};
use candle_nn::VarMap;
use qlearn_core::error::QlError;
use std::{collections::BTreeMap, path::Path};

/// Values of a single variable, detached from any device.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTensor {
    /// Dimensions of the variable.
    pub shape: Vec<usize>,

    /// Elements in row-major order.
    pub data: Vec<f32>,
}

/// Snapshot of the variables of a [`VarMap`], keyed by variable name.
///
/// Two snapshots compare equal only if all names, shapes and elements are
/// bit-identical.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedParams {
    /// Variables by name.
    pub params: BTreeMap<String, ParamTensor>,
}

impl NamedParams {
    /// Copies the variables of [`VarMap`] to host memory.
    pub fn from_varmap(varmap: &VarMap) -> Result<Self> {
        let data = varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("Poisoned lock on the varmap"))?;

        let mut params = BTreeMap::new();
        for (name, var) in data.iter() {
            let t = var.as_tensor();
            params.insert(
                name.clone(),
                ParamTensor {
                    shape: t.dims().to_vec(),
                    data: t.flatten_all()?.to_vec1::<f32>()?,
                },
            );
        }

        Ok(Self { params })
    }

    /// Reads a safetensors file written by [`VarMap::save`].
    pub fn from_safetensors(path: impl AsRef<Path>) -> Result<Self> {
        let tensors = safetensors::load(path.as_ref(), &Device::Cpu)?;

        let mut params = BTreeMap::new();
        for (name, t) in tensors.into_iter() {
            params.insert(
                name,
                ParamTensor {
                    shape: t.dims().to_vec(),
                    data: t.flatten_all()?.to_vec1::<f32>()?,
                },
            );
        }

        Ok(Self { params })
    }

    /// Checks that every variable of `reference` exists here with the same shape.
    ///
    /// A missing variable is reported with an empty `found` shape.
    pub fn check_shapes(&self, reference: &NamedParams) -> Result<(), QlError> {
        for (name, p) in reference.params.iter() {
            match self.params.get(name) {
                Some(q) if q.shape == p.shape => {}
                other => {
                    return Err(QlError::ShapeMismatch {
                        expected: p.shape.clone(),
                        found: other.map_or(vec![], |q| q.shape.clone()),
                    })
                }
            }
        }
        Ok(())
    }

    /// Writes the snapshot into the variables of [`VarMap`].
    ///
    /// Every variable of `varmap` must have a counterpart with the same shape.
    pub fn copy_to(&self, varmap: &VarMap, device: &Device) -> Result<()> {
        let data = varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("Poisoned lock on the varmap"))?;

        let mut tensors = Vec::with_capacity(data.len());
        for (name, var) in data.iter() {
            let p = self
                .params
                .get(name)
                .ok_or_else(|| anyhow!("Parameter {} is missing", name))?;
            if p.shape.as_slice() != var.dims() {
                return Err(anyhow!(
                    "Shape of {} differs: {:?} != {:?}",
                    name,
                    p.shape,
                    var.dims()
                ));
            }
            tensors.push((var, Tensor::from_vec(p.data.clone(), p.shape.clone(), device)?));
        }

        for (var, t) in tensors {
            var.set(&t)?;
        }

        Ok(())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if there are no variables.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
