use anyhow::Result;
use qlearn_core::{
    explorer::EpsilonGreedyConfig,
    record::{Recorder, StatisticsCollector},
    LearningModule, TabularQConfig, TabularQModule,
};
use std::path::Path;

const GRID_SIZE: usize = 4;
const N_ACTIONS: usize = 4;
const N_EPISODES: usize = 500;
const MAX_STEPS: usize = 50;
const STEP_REWARD: f32 = -0.04;
const GOAL_REWARD: f32 = 1.0;
const STATS_DIR: &str = "./qlearn-core/examples/stats";

/// Walk on a square grid from the top-left corner to the bottom-right corner.
struct Grid {
    pos: [usize; 2],
}

impl Grid {
    fn reset(&mut self) -> [usize; 2] {
        self.pos = [0, 0];
        self.pos
    }

    /// Applies up, down, left or right and returns the next state, reward and done flag.
    fn step(&mut self, action: usize) -> ([usize; 2], f32, bool) {
        let [r, c] = self.pos;
        self.pos = match action {
            0 => [r.saturating_sub(1), c],
            1 => [(r + 1).min(GRID_SIZE - 1), c],
            2 => [r, c.saturating_sub(1)],
            _ => [r, (c + 1).min(GRID_SIZE - 1)],
        };

        if self.pos == [GRID_SIZE - 1, GRID_SIZE - 1] {
            (self.pos, GOAL_REWARD, true)
        } else {
            (self.pos, STEP_REWARD, false)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TabularQConfig::default()
        .discount_factor(0.9)
        .learning_rate(0.1)
        .explorer(EpsilonGreedyConfig::default().decay_rate(0.99));
    let mut module = TabularQModule::build(config);
    module.setup_module(&[GRID_SIZE, GRID_SIZE], N_ACTIONS)?;

    let mut recorder = StatisticsCollector::new("grid_tabular");
    recorder.add_statistic("return", "Return per episode");
    recorder.add_statistic("steps", "Steps per episode");
    recorder.add_statistic("epsilon", "Exploration rate");

    let mut env = Grid { pos: [0, 0] };
    for _ in 0..N_EPISODES {
        let mut state = env.reset();
        let mut ret = 0.0;
        let mut steps = 0;

        for _ in 0..MAX_STEPS {
            let action = module.get_action(&state)?;
            let (next_state, reward, done) = env.step(action);
            module.train(&state, &next_state, action, reward, done)?;
            ret += reward;
            steps += 1;
            state = next_state;
            if done {
                break;
            }
        }

        recorder.record("return", ret);
        recorder.record("steps", steps as f32);
        recorder.write(module.end_simulation_update());
    }

    if let Some(avg) = recorder.averaged("steps", 50) {
        log::info!("Average steps per 50 episodes: {:?}", avg);
    }
    recorder.save(Path::new(STATS_DIR))?;
    Ok(())
}
