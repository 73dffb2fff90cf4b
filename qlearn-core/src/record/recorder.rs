use super::{Record, RecordValue};

/// Consumes [`Record`]s produced during training.
///
/// A recorder is constructed by the driver and handed the records returned by a
/// learning module. There is no process-wide collector.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);

    /// Writes a single named scalar.
    fn record(&mut self, name: &str, value: f32) {
        self.write(Record::from_slice(&[(name, RecordValue::Scalar(value))]));
    }
}
