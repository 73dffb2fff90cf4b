//! Epsilon-greedy action selection with per-episode decay.
use super::{argmax, DecayMode, EpsilonGreedyConfig, ExplorationPolicy};
use log::{info, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const DEFAULT_MULTIPLICATIVE_RATE: f32 = 0.999;
const DEFAULT_LINEAR_STEP: f32 = 0.001;

/// Epsilon-greedy explorer.
///
/// With probability `epsilon` a uniformly random action is taken, otherwise the
/// first action with the maximum value.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f32,
    decay_rate: f32,
    min_epsilon: f32,
    decay_mode: DecayMode,
    rng: SmallRng,
}

impl EpsilonGreedy {
    /// Constructs a multiplicatively decaying explorer.
    pub fn new(epsilon: f32, decay_rate: f32, min_epsilon: f32) -> Self {
        Self::build(
            EpsilonGreedyConfig::default()
                .epsilon(epsilon)
                .decay_rate(decay_rate)
                .min_epsilon(min_epsilon),
        )
    }

    /// Constructs an explorer from its configuration.
    ///
    /// Invalid values never abort: an unknown decay mode falls back to
    /// multiplication, out-of-range rates are clamped or replaced by defaults,
    /// each with a warning.
    pub fn build(config: EpsilonGreedyConfig) -> Self {
        let decay_mode = config.decay_mode.parse::<DecayMode>().unwrap_or_else(|mode| {
            warn!(
                "Provided invalid decay mode {}, defaulting to {}",
                mode,
                DecayMode::default().as_str()
            );
            DecayMode::default()
        });

        let epsilon = clamp_unit("epsilon", config.epsilon);
        let min_epsilon = clamp_unit("min_epsilon", config.min_epsilon);
        let decay_rate = match decay_mode {
            DecayMode::Multiplication if !(config.decay_rate > 0.0 && config.decay_rate < 1.0) => {
                warn!(
                    "Multiplicative decay rate {} is not in (0, 1), using {}",
                    config.decay_rate, DEFAULT_MULTIPLICATIVE_RATE
                );
                DEFAULT_MULTIPLICATIVE_RATE
            }
            DecayMode::Linear if !(config.decay_rate >= 0.0) => {
                warn!(
                    "Linear decay step {} is negative, using {}",
                    config.decay_rate, DEFAULT_LINEAR_STEP
                );
                DEFAULT_LINEAR_STEP
            }
            _ => config.decay_rate,
        };

        info!(
            "Initialized eps-greedy exploration policy with start eps: {}, min eps: {}, decay mode: {}, and decay rate: {}",
            epsilon,
            min_epsilon,
            decay_mode.as_str(),
            decay_rate
        );

        Self {
            epsilon,
            decay_rate,
            min_epsilon,
            decay_mode,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// Returns the decay mode in effect.
    pub fn decay_mode(&self) -> DecayMode {
        self.decay_mode
    }

    /// Returns `true` with probability `epsilon`.
    fn take_random(&mut self) -> bool {
        self.rng.gen::<f32>() < self.epsilon
    }
}

fn clamp_unit(name: &str, v: f32) -> f32 {
    if (0.0..=1.0).contains(&v) {
        v
    } else {
        let clamped = if v > 1.0 { 1.0 } else { 0.0 };
        warn!("{} = {} is out of [0, 1], clamped to {}", name, v, clamped);
        clamped
    }
}

impl ExplorationPolicy for EpsilonGreedy {
    fn decide(&mut self, action_values: &[f32]) -> usize {
        debug_assert!(!action_values.is_empty());
        if self.take_random() && !action_values.is_empty() {
            self.rng.gen_range(0..action_values.len())
        } else {
            argmax(action_values)
        }
    }

    fn decay_epsilon(&mut self) {
        if self.epsilon <= self.min_epsilon {
            return;
        }

        self.epsilon = match self.decay_mode {
            DecayMode::Multiplication => (self.epsilon * self.decay_rate).max(self.min_epsilon),
            DecayMode::Linear => (self.epsilon - self.decay_rate).max(self.min_epsilon),
        };
    }

    fn current_epsilon(&self) -> f32 {
        self.epsilon
    }

    fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = clamp_unit("epsilon", epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_decay_converges_to_min() {
        for &(eps0, rate, min) in &[(1.0, 0.9, 0.05), (0.5, 0.5, 0.1), (0.3, 0.99, 0.0)] {
            let mut explorer = EpsilonGreedy::new(eps0, rate, min);
            let mut prev = explorer.current_epsilon();

            for _ in 0..5000 {
                explorer.decay_epsilon();
                let eps = explorer.current_epsilon();
                assert!(eps <= prev);
                assert!(eps >= min);
                prev = eps;
            }
            assert!((prev - min).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_decay_clamps() {
        let config = EpsilonGreedyConfig::default()
            .epsilon(1.0)
            .decay_rate(0.3)
            .min_epsilon(0.2)
            .decay_mode("linear");
        let mut explorer = EpsilonGreedy::build(config);
        assert_eq!(explorer.decay_mode(), DecayMode::Linear);

        explorer.decay_epsilon();
        assert!((explorer.current_epsilon() - 0.7).abs() < 1e-6);
        explorer.decay_epsilon();
        explorer.decay_epsilon();
        assert_eq!(explorer.current_epsilon(), 0.2);
        explorer.decay_epsilon();
        assert_eq!(explorer.current_epsilon(), 0.2);
    }

    #[test]
    fn test_epsilon_below_min_is_left_alone() {
        let mut explorer = EpsilonGreedy::new(0.05, 0.5, 0.1);
        explorer.decay_epsilon();
        assert_eq!(explorer.current_epsilon(), 0.05);
    }

    #[test]
    fn test_invalid_decay_mode_falls_back() {
        let config = EpsilonGreedyConfig::default().decay_mode("exponential");
        let explorer = EpsilonGreedy::build(config);
        assert_eq!(explorer.decay_mode(), DecayMode::Multiplication);
    }

    #[test]
    fn test_out_of_range_rate_is_replaced() {
        let mut explorer = EpsilonGreedy::new(1.0, 1.5, 0.0);
        explorer.decay_epsilon();
        assert_eq!(explorer.current_epsilon(), DEFAULT_MULTIPLICATIVE_RATE);
    }

    #[test]
    fn test_greedy_when_epsilon_is_zero() {
        let mut explorer = EpsilonGreedy::new(0.0, 0.9, 0.0);
        for _ in 0..100 {
            assert_eq!(explorer.decide(&[-1.0, 3.0, 3.0, 0.0]), 1);
        }
    }

    #[test]
    fn test_random_when_epsilon_is_one() {
        let mut explorer = EpsilonGreedy::new(1.0, 0.9, 1.0);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            counts[explorer.decide(&[0.0, 10.0, 0.0])] += 1;
        }
        assert!(counts.iter().all(|&c| c > 800));
    }
}
