//! Encoding of discrete states into network inputs.
use crate::error::QlError;
use serde::{Deserialize, Serialize};

/// How a discrete state is turned into a feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum EncodingMode {
    /// Concatenation of one one-hot segment per dimension.
    OneHot,

    /// One value per dimension, `state[i] / state_dims[i]`.
    Scalar,
}

impl Default for EncodingMode {
    fn default() -> Self {
        Self::OneHot
    }
}

/// Converts raw states into fixed-size `f32` vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEncoder {
    state_dims: Vec<usize>,
    offsets: Vec<usize>,
    mode: EncodingMode,
}

impl StateEncoder {
    /// Constructs an encoder for states with the given per-dimension cardinalities.
    pub fn new(state_dims: &[usize], mode: EncodingMode) -> Self {
        let offsets = state_dims
            .iter()
            .scan(0, |acc, &d| {
                let offset = *acc;
                *acc += d;
                Some(offset)
            })
            .collect();

        Self {
            state_dims: state_dims.to_vec(),
            offsets,
            mode,
        }
    }

    /// Returns the per-dimension cardinalities.
    pub fn state_dims(&self) -> &[usize] {
        &self.state_dims
    }

    /// Returns the encoding mode.
    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Length of encoded vectors.
    pub fn encoded_len(&self) -> usize {
        match self.mode {
            EncodingMode::OneHot => self.state_dims.iter().sum(),
            EncodingMode::Scalar => self.state_dims.len(),
        }
    }

    /// Checks a raw state against the declared cardinalities.
    pub fn validate(&self, state: &[usize]) -> Result<(), QlError> {
        validate_state(&self.state_dims, state)
    }

    /// Encodes a single state.
    pub fn encode(&self, state: &[usize]) -> Result<Vec<f32>, QlError> {
        self.validate(state)?;

        Ok(match self.mode {
            EncodingMode::OneHot => {
                let mut v = vec![0f32; self.encoded_len()];
                for (offset, &s) in self.offsets.iter().zip(state.iter()) {
                    v[offset + s] = 1.0;
                }
                v
            }
            EncodingMode::Scalar => state
                .iter()
                .zip(self.state_dims.iter())
                .map(|(&s, &d)| s as f32 / d as f32)
                .collect(),
        })
    }

    /// Encodes a batch of states, failing on the first malformed one.
    pub fn encode_batch<'a>(
        &self,
        states: impl IntoIterator<Item = &'a [usize]>,
    ) -> Result<Vec<Vec<f32>>, QlError> {
        states.into_iter().map(|s| self.encode(s)).collect()
    }
}

/// Fails with [`QlError::Encoding`] unless `state.len() == state_dims.len()` and
/// `state[i] < state_dims[i]` for all `i`.
pub fn validate_state(state_dims: &[usize], state: &[usize]) -> Result<(), QlError> {
    if state.len() != state_dims.len() {
        return Err(QlError::Encoding(format!(
            "state {:?} has {} dimensions, expected {}",
            state,
            state.len(),
            state_dims.len()
        )));
    }

    if let Some(i) = (0..state.len()).find(|&i| state[i] >= state_dims[i]) {
        return Err(QlError::Encoding(format!(
            "state[{}] = {} is out of range for cardinality {}",
            i, state[i], state_dims[i]
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot_segments() {
        let state_dims = [3, 1, 4, 2];
        let encoder = StateEncoder::new(&state_dims, EncodingMode::OneHot);
        assert_eq!(encoder.encoded_len(), 10);

        for a in 0..3 {
            for c in 0..4 {
                for d in 0..2 {
                    let state = [a, 0, c, d];
                    let v = encoder.encode(&state).unwrap();
                    assert_eq!(v.len(), 10);
                    assert_eq!(v.iter().filter(|&&x| x == 1.0).count(), 4);
                    assert_eq!(v.iter().filter(|&&x| x == 0.0).count(), 6);

                    // exactly one bit per segment, at the state index
                    let segments = [&v[0..3], &v[3..4], &v[4..8], &v[8..10]];
                    for (segment, &s) in segments.iter().zip(state.iter()) {
                        assert_eq!(segment.iter().sum::<f32>(), 1.0);
                        assert_eq!(segment[s], 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_scalar() {
        let encoder = StateEncoder::new(&[4, 2], EncodingMode::Scalar);
        assert_eq!(encoder.encoded_len(), 2);
        assert_eq!(encoder.encode(&[3, 1]).unwrap(), vec![0.75, 0.5]);
        assert_eq!(encoder.encode(&[0, 0]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_encoding_errors() {
        let encoder = StateEncoder::new(&[2, 2], EncodingMode::OneHot);
        assert!(matches!(encoder.encode(&[2, 0]), Err(QlError::Encoding(_))));
        assert!(matches!(encoder.encode(&[0]), Err(QlError::Encoding(_))));
        assert!(matches!(encoder.encode(&[0, 1, 1]), Err(QlError::Encoding(_))));
    }

    #[test]
    fn test_encode_batch() {
        let encoder = StateEncoder::new(&[2, 3], EncodingMode::OneHot);
        let states: Vec<Vec<usize>> = vec![vec![0, 2], vec![1, 0]];
        let vs = encoder
            .encode_batch(states.iter().map(|s| s.as_slice()))
            .unwrap();
        assert_eq!(
            vs,
            vec![vec![1.0, 0.0, 0.0, 0.0, 1.0], vec![0.0, 1.0, 1.0, 0.0, 0.0]]
        );
    }
}
