//! Exploration strategies.
mod config;
mod epsilon_greedy;
pub use config::{DecayMode, EpsilonGreedyConfig};
pub use epsilon_greedy::EpsilonGreedy;

/// Decides between exploring and exploiting given the action values of a state.
pub trait ExplorationPolicy {
    /// Takes an action based on action values.
    ///
    /// * `action_values` - values of all actions in the current state, must not be empty.
    fn decide(&mut self, action_values: &[f32]) -> usize;

    /// Decays the exploration rate.
    ///
    /// Called once at the end of each episode, never per step.
    fn decay_epsilon(&mut self);

    /// Returns the current exploration rate.
    fn current_epsilon(&self) -> f32;

    /// Overrides the current exploration rate.
    fn set_epsilon(&mut self, epsilon: f32);
}

/// Returns the index of the first maximum of `values`.
///
/// `NaN`s never win against a number. Returns 0 for an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] || values[best].is_nan() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::argmax;

    #[test]
    fn test_argmax_takes_first_maximum() {
        assert_eq!(argmax(&[0.5, 2.0, 2.0, -1.0]), 1);
        assert_eq!(argmax(&[3.0]), 0);
        assert_eq!(argmax(&[f32::NAN, -1.0]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
