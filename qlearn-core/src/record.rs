//! Records of training metrics and the recorders consuming them.
//!
//! The learning modules never write statistics by themselves. [`LearningModule::train`]
//! and [`LearningModule::end_simulation_update`] return [`Record`]s, and the driver
//! forwards them to whatever [`Recorder`] it constructed:
//!
//! ```rust
//! use qlearn_core::record::{Record, RecordValue, Recorder, StatisticsCollector};
//!
//! let mut recorder = StatisticsCollector::new("tabular");
//! recorder.add_statistic("reward", "Reward per episode");
//!
//! let mut record = Record::empty();
//! record.insert("reward", RecordValue::Scalar(1.0));
//! recorder.write(record);
//! recorder.record("reward", 0.5);
//!
//! assert_eq!(recorder.data("reward"), Some(&[1.0, 0.5][..]));
//! ```
//!
//! [`LearningModule::train`]: crate::LearningModule::train
//! [`LearningModule::end_simulation_update`]: crate::LearningModule::end_simulation_update
mod base;
mod null_recorder;
mod recorder;
mod statistics;

pub use base::{Record, RecordValue};
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use statistics::{Statistic, StatisticsCollector};
