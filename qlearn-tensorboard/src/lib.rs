//! Recorder writing training records as TensorBoard event files.
use log::warn;
use qlearn_core::record::{Record, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// The step of a record is taken from the scalar under the step key if it is a
/// non-negative integer. Otherwise an internal counter, advanced on every such
/// write, is used.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    step: usize,
    warn_unsupported_value: bool,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "step".to_string(),
            step: 0,
            warn_unsupported_value: false,
        }
    }

    /// Sets the key of the scalar used as step.
    pub fn step_key(mut self, v: impl Into<String>) -> Self {
        self.step_key = v.into();
        self
    }

    /// Logs a warning for every value that cannot be written as a scalar.
    pub fn warn_unsupported_value(mut self, v: bool) -> Self {
        self.warn_unsupported_value = v;
        self
    }

    /// Returns the step used for the next record without a step key.
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Flushes pending events to disk.
    pub fn flush(&mut self) {
        self.writer.flush();
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Only [`RecordValue::Scalar`] is written, other variants are skipped.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) if *v >= 0.0 && v.fract() == 0.0 => *v as usize,
            other => {
                if let Some(v) = other {
                    warn!(
                        "Step {:?} under {} is not a non-negative integer, using the internal counter",
                        v, self.step_key
                    );
                }
                self.step += 1;
                self.step
            }
        };

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                _ => {
                    if self.warn_unsupported_value {
                        warn!("Skip non-scalar value of {}", k);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_tensorboard_recorder() {
        let dir = TempDir::new("tensorboard_recorder").unwrap();
        let logdir = dir.path().join("logs");
        let mut recorder = TensorboardRecorder::new(&logdir).warn_unsupported_value(true);

        recorder.record("loss", 0.5);
        recorder.record("loss", 0.25);
        assert_eq!(recorder.current_step(), 2);

        let mut record = Record::from_scalar("epsilon", 0.9);
        record.insert("step", RecordValue::Scalar(10.0));
        record.insert("name", RecordValue::String("grid".to_string()));
        recorder.write(record);
        assert_eq!(recorder.current_step(), 2);

        // A fractional or negative step falls back to the counter.
        recorder.write(Record::from_scalar("step", 2.5));
        recorder.write(Record::from_scalar("step", -1.0));
        assert_eq!(recorder.current_step(), 4);

        recorder.flush();
        assert!(std::fs::read_dir(&logdir).unwrap().count() > 0);
    }
}
