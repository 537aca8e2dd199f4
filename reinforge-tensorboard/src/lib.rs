//! Recorder writing training records as TFRecord files for tensorboard.
use log::warn;
use reinforge_core::record::{Record, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// The scalar under the step key (`episode` by default) is used as the x-axis
/// of every other scalar in the record.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "episode".to_string(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// This method handles [RecordValue::Scalar]. [RecordValue::DateTime] and
    /// [RecordValue::String] are discarded. Records without a scalar step value are dropped.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => {
                warn!("Record without scalar {:?} is not written", self.step_key);
                return;
            }
        };

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::DateTime(_) | RecordValue::String(_) => {}
            };
        }
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}
