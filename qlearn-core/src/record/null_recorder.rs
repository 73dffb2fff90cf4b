use super::{Record, Recorder};

/// A recorder that ignores any record.
#[derive(Debug, Default)]
pub struct NullRecorder {}

impl NullRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self {}
    }
}

impl Recorder for NullRecorder {
    /// Discards the given record.
    fn write(&mut self, _record: Record) {}
}
