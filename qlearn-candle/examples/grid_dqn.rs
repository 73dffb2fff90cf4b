use anyhow::Result;
use qlearn_candle::{CandleQFunctionConfig, DqnConfig, DqnModule};
use qlearn_core::{
    explorer::EpsilonGreedyConfig,
    record::{RecordValue, Recorder},
    LearningModule,
};
use qlearn_tensorboard::TensorboardRecorder;
use std::path::Path;

const GRID_SIZE: usize = 4;
const N_ACTIONS: usize = 4;
const N_EPISODES: usize = 300;
const MAX_STEPS: usize = 50;
const STEP_REWARD: f32 = -0.04;
const GOAL_REWARD: f32 = 1.0;
const LR: f64 = 0.001;
const REPLAY_MEMORY_SIZE: usize = 5_000;
const MIN_REPLAY_MEMORY_SIZE: usize = 200;
const MINIBATCH_SIZE: usize = 64;
const UPDATE_TARGET_EVERY: usize = 10;
const MODEL_DIR: &str = "./qlearn-candle/examples/model/grid_dqn";
const LOG_DIR: &str = "./qlearn-candle/examples/logs/grid_dqn";

/// Walk on a square grid from the top-left corner to the bottom-right corner.
struct Grid {
    pos: [usize; 2],
}

impl Grid {
    fn reset(&mut self) -> [usize; 2] {
        self.pos = [0, 0];
        self.pos
    }

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

fn config() -> DqnConfig {
    DqnConfig::default()
        .replay_memory_size(REPLAY_MEMORY_SIZE)
        .min_replay_memory_size(MIN_REPLAY_MEMORY_SIZE)
        .minibatch_size(MINIBATCH_SIZE)
        .update_target_every(UPDATE_TARGET_EVERY)
        .explorer(EpsilonGreedyConfig::default().decay_rate(0.98))
        .q_config(CandleQFunctionConfig::default().learning_rate(LR))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut module = DqnModule::build(config());
    module.setup_module(&[GRID_SIZE, GRID_SIZE], N_ACTIONS)?;
    let mut recorder = TensorboardRecorder::new(LOG_DIR);

    let mut env = Grid { pos: [0, 0] };
    let mut n_steps = 0;
    for episode in 0..N_EPISODES {
        let mut state = env.reset();
        let mut ret = 0.0;

        for _ in 0..MAX_STEPS {
            let action = module.get_action(&state)?;
            let (next_state, reward, done) = env.step(action);
            n_steps += 1;

            if let Some(mut record) = module.train(&state, &next_state, action, reward, done)? {
                record.insert("step", RecordValue::Scalar(n_steps as f32));
                recorder.write(record);
            }
            ret += reward;
            state = next_state;
            if done {
                break;
            }
        }

        let mut record = module.end_simulation_update();
        record.insert("return", RecordValue::Scalar(ret));
        record.insert("step", RecordValue::Scalar(n_steps as f32));
        recorder.write(record);
        log::info!("Episode {}: return {:.2}", episode, ret);
    }

    recorder.flush();
    module.save(Path::new(MODEL_DIR))?;
    Ok(())
}
