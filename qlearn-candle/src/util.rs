//! Utilities.
use anyhow::{anyhow, Result};
use candle_nn::VarMap;
use log::trace;
mod named_params;
pub use named_params::{NamedParams, ParamTensor};

/// Overwrites every variable of `dest` with the variable of the same name in `src`.
///
/// Fails if a variable is missing in `src` or the shapes differ. `dest` is left
/// untouched in that case.
pub fn copy_varmap(dest: &VarMap, src: &VarMap) -> Result<()> {
    trace!("dest");
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("Poisoned lock on the destination varmap"))?;
    trace!("src");
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("Poisoned lock on the source varmap"))?;

    let mut pairs = Vec::with_capacity(dest.len());
    for (name, v_dest) in dest.iter() {
        let v_src = src
            .get(name)
            .ok_or_else(|| anyhow!("Variable {} is missing in the source varmap", name))?;
        if v_src.dims() != v_dest.dims() {
            return Err(anyhow!(
                "Shape of {} differs: {:?} != {:?}",
                name,
                v_src.dims(),
                v_dest.dims()
            ));
        }
        pairs.push((v_dest, v_src));
    }

    for (v_dest, v_src) in pairs {
        v_dest.set(&v_src.as_tensor().copy()?)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::Init;

    fn varmap_with(shape: (usize, usize), value: f64) -> Result<VarMap> {
        let varmap = VarMap::new();
        varmap.get(shape, "w", Init::Const(value), DType::F32, &Device::Cpu)?;
        Ok(varmap)
    }

    #[test]
    fn test_copy_varmap() -> Result<()> {
        let dest = varmap_with((2, 3), 0.0)?;
        let src = varmap_with((2, 3), 1.5)?;
        copy_varmap(&dest, &src)?;

        let t = dest.data().lock().unwrap()["w"].as_tensor().clone();
        assert_eq!(t.to_vec2::<f32>()?, vec![vec![1.5f32; 3]; 2]);

        // Later updates of the source do not leak into the copy.
        src.data().lock().unwrap()["w"].set(&Tensor::zeros((2, 3), DType::F32, &Device::Cpu)?)?;
        let t = dest.data().lock().unwrap()["w"].as_tensor().clone();
        assert_eq!(t.to_vec2::<f32>()?, vec![vec![1.5f32; 3]; 2]);
        Ok(())
    }

    #[test]
    fn test_copy_varmap_shape_mismatch() -> Result<()> {
        let dest = varmap_with((2, 3), 0.0)?;
        let src = varmap_with((3, 2), 1.0)?;
        assert!(copy_varmap(&dest, &src).is_err());

        let t = dest.data().lock().unwrap()["w"].as_tensor().clone();
        assert_eq!(t.to_vec2::<f32>()?, vec![vec![0f32; 3]; 2]);
        Ok(())
    }

    #[test]
    fn test_copy_varmap_missing_variable() -> Result<()> {
        let dest = varmap_with((2, 3), 0.0)?;
        let src = VarMap::new();
        src.get((2, 3), "other", Init::Const(1.0), DType::F32, &Device::Cpu)?;
        assert!(copy_varmap(&dest, &src).is_err());
        Ok(())
    }
}
