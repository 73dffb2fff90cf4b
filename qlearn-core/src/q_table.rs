//! Dense table of action values.
use crate::{encoder::validate_state, error::QlError, explorer::argmax};
use anyhow::{Context, Result};
use log::info;
use ndarray::{ArrayD, Axis, IxDyn};
use rand::Rng;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Lower bound of initial values. Initial values are drawn from `[-2, 0)`.
pub const INIT_LOW: f32 = -2.0;

/// Upper bound (exclusive) of initial values.
pub const INIT_HIGH: f32 = 0.0;

/// Action values of shape `state_dims ++ [action_size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    table: ArrayD<f32>,
    state_dims: Vec<usize>,
    action_size: usize,
}

fn table_shape(state_dims: &[usize], action_size: usize) -> Vec<usize> {
    let mut shape = state_dims.to_vec();
    shape.push(action_size);
    shape
}

impl QTable {
    /// Allocates a table with values drawn uniformly from `[-2, 0)`.
    pub fn new(state_dims: &[usize], action_size: usize, rng: &mut impl Rng) -> Self {
        let shape = table_shape(state_dims, action_size);
        let table = ArrayD::from_shape_fn(IxDyn(&shape), |_| rng.gen_range(INIT_LOW..INIT_HIGH));

        Self {
            table,
            state_dims: state_dims.to_vec(),
            action_size,
        }
    }

    /// Wraps an existing array, which must have exactly the configured shape.
    pub fn from_array(
        table: ArrayD<f32>,
        state_dims: &[usize],
        action_size: usize,
    ) -> Result<Self, QlError> {
        let expected = table_shape(state_dims, action_size);
        if table.shape() != expected.as_slice() {
            return Err(QlError::ShapeMismatch {
                expected,
                found: table.shape().to_vec(),
            });
        }

        Ok(Self {
            table,
            state_dims: state_dims.to_vec(),
            action_size,
        })
    }

    /// Shape of the table, `state_dims ++ [action_size]`.
    pub fn shape(&self) -> &[usize] {
        self.table.shape()
    }

    /// Per-dimension cardinalities of states.
    pub fn state_dims(&self) -> &[usize] {
        &self.state_dims
    }

    /// Number of actions.
    pub fn action_size(&self) -> usize {
        self.action_size
    }

    /// The underlying array.
    pub fn as_array(&self) -> &ArrayD<f32> {
        &self.table
    }

    /// Returns the values of all actions at `state`.
    pub fn lookup(&self, state: &[usize]) -> Result<Vec<f32>, QlError> {
        validate_state(&self.state_dims, state)?;

        let mut row = self.table.view();
        for &s in state {
            row = row.index_axis_move(Axis(0), s);
        }
        Ok(row.iter().copied().collect())
    }

    /// Returns the maximum action value at `state`.
    pub fn max_value(&self, state: &[usize]) -> Result<f32, QlError> {
        let row = self.lookup(state)?;
        Ok(row[argmax(&row)])
    }

    /// Returns the value of a single `(state, action)` cell.
    pub fn get(&self, state: &[usize], action: usize) -> Result<f32, QlError> {
        let ix = self.cell_index(state, action)?;
        Ok(self.table[ix.as_slice()])
    }

    /// Applies `Q = Q + learning_rate * (reward + discount_factor * max_future_value)`
    /// to the cell `(orig_state, action)` and returns the new value.
    ///
    /// Note that the current value is not subtracted inside the bracket, unlike
    /// the usual temporal-difference form. Values of frequently visited cells keep
    /// accumulating instead of converging to the return.
    pub fn update(
        &mut self,
        orig_state: &[usize],
        action: usize,
        reward: f32,
        max_future_value: f32,
        discount_factor: f32,
        learning_rate: f32,
    ) -> Result<f32, QlError> {
        let ix = self.cell_index(orig_state, action)?;
        let q = &mut self.table[ix.as_slice()];
        *q = *q + learning_rate * (reward + discount_factor * max_future_value);
        Ok(*q)
    }

    fn cell_index(&self, state: &[usize], action: usize) -> Result<Vec<usize>, QlError> {
        validate_state(&self.state_dims, state)?;
        if action >= self.action_size {
            return Err(QlError::InvalidAction {
                action,
                action_size: self.action_size,
            });
        }

        let mut ix = state.to_vec();
        ix.push(action);
        Ok(ix)
    }

    /// Saves the table as a binary blob (shape and values).
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {:?}", path.as_ref()))?;
        bincode::serialize_into(BufWriter::new(file), &self.table)?;
        info!("Saved Q-table of shape {:?} to {:?}", self.shape(), path.as_ref());
        Ok(())
    }

    /// Loads a table saved with [`QTable::save`].
    ///
    /// Fails with [`QlError::ShapeMismatch`] if the stored shape differs from
    /// `state_dims ++ [action_size]`.
    pub fn load<T: AsRef<Path>>(path: T, state_dims: &[usize], action_size: usize) -> Result<Self> {
        let file =
            File::open(&path).with_context(|| format!("Failed to open {:?}", path.as_ref()))?;
        let table: ArrayD<f32> = bincode::deserialize_from(BufReader::new(file))?;
        let table = Self::from_array(table, state_dims, action_size)?;
        info!("Loaded Q-table of shape {:?} from {:?}", table.shape(), path.as_ref());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use tempdir::TempDir;

    fn table() -> QTable {
        QTable::new(&[2, 2], 2, &mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_initial_values() {
        let q = QTable::new(&[3, 4, 2], 5, &mut StdRng::seed_from_u64(0));
        assert_eq!(q.shape(), &[3, 4, 2, 5]);
        assert!(q.as_array().iter().all(|&v| v >= INIT_LOW && v < INIT_HIGH));
    }

    #[test]
    fn test_lookup_returns_action_row() {
        let q = table();
        let row = q.lookup(&[1, 0]).unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row[0], q.as_array()[[1, 0, 0].as_slice()]);
        assert_eq!(row[1], q.as_array()[[1, 0, 1].as_slice()]);
    }

    #[test]
    fn test_literal_update_rule() {
        let mut q = table();
        let old = q.get(&[0, 0], 1).unwrap();
        let other = q.get(&[0, 0], 0).unwrap();

        let new = q.update(&[0, 0], 1, 1.0, 0.0, 0.9, 0.1).unwrap();

        assert_eq!(new, old + 0.1 * (1.0 + 0.9 * 0.0));
        assert_eq!(q.get(&[0, 0], 1).unwrap(), new);
        assert_eq!(q.get(&[0, 0], 0).unwrap(), other);
    }

    #[test]
    fn test_update_does_not_subtract_current_value() {
        let mut q = table();
        let old = q.get(&[1, 1], 0).unwrap();
        q.update(&[1, 1], 0, 0.5, -1.0, 0.5, 1.0).unwrap();
        // canonical TD would yield exactly 0.0 here
        assert_eq!(q.get(&[1, 1], 0).unwrap(), old + 1.0 * (0.5 + 0.5 * -1.0));
    }

    #[test]
    fn test_invalid_cells() {
        let mut q = table();
        assert!(matches!(q.lookup(&[2, 0]), Err(QlError::Encoding(_))));
        assert!(matches!(
            q.update(&[0, 0], 2, 1.0, 0.0, 0.9, 0.1),
            Err(QlError::InvalidAction { action: 2, action_size: 2 })
        ));
    }

    #[test]
    fn test_from_array_shape_mismatch() {
        let array = ArrayD::<f32>::zeros(IxDyn(&[2, 3, 2]));
        let err = QTable::from_array(array, &[2, 2], 2).unwrap_err();
        assert_eq!(
            err,
            QlError::ShapeMismatch {
                expected: vec![2, 2, 2],
                found: vec![2, 3, 2]
            }
        );
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new("q_table")?;
        let path = dir.path().join("q_table.bin");
        let q = table();
        q.save(&path)?;

        assert_eq!(QTable::load(&path, &[2, 2], 2)?, q);

        let err = QTable::load(&path, &[2, 2], 3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QlError>(),
            Some(QlError::ShapeMismatch { .. })
        ));
        Ok(())
    }
}
