use super::{Activation, MlpConfig};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let mut dims = vec![config.in_dim];
    dims.extend(config.units.iter().copied());
    dims.push(config.out_dim);
    let vs = vs.pp(prefix);

    let mut layers = vec![];
    for (i, w) in dims.windows(2).enumerate() {
        layers.push(linear(w[0], w[1], vs.pp(format!("ln{}", i)))?);
    }
    Ok(layers)
}

/// Multilayer perceptron with a linear output layer.
pub struct Mlp {
    config: MlpConfig,
    layers: Vec<Linear>,
}

impl Mlp {
    /// Builds the layers, registering their variables in `vs`.
    pub fn build(vs: VarBuilder, config: MlpConfig) -> Result<Self> {
        let layers = create_linear_layers("mlp", vs, &config)?;
        Ok(Self { config, layers })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Maps a batch of shape `[n, in_dim]` to `[n, out_dim]`.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let n_layers = self.layers.len();
        let mut xs = xs.clone();

        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i + 1 < n_layers {
                xs = match self.config.activation {
                    Activation::ReLU => xs.relu()?,
                    Activation::Elu => xs.elu(1.0)?,
                };
            }
        }

        Ok(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_mlp_shapes_and_variables() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb, MlpConfig::new(6, vec![64, 16], 2, Activation::Elu))?;

        let xs = Tensor::zeros((5, 6), DType::F32, &Device::Cpu)?;
        assert_eq!(mlp.forward(&xs)?.dims(), &[5, 2]);

        // weight and bias per layer
        assert_eq!(varmap.all_vars().len(), 6);
        Ok(())
    }
}
