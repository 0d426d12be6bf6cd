use anyhow::Result;

use crate::frame::FrameEnergyVector;
use crate::record::EmitterStateRecord;

/// Consumes the ordered record sequence.
///
/// Implemented by : `CsvSink`, `Vec<EmitterStateRecord>`.
///
/// # Example
/// ```
/// use wl_core::layout::Side;
/// use wl_core::record::EmitterStateRecord;
/// use wl_core::traits::RecordSink;
///
/// let mut sink: Vec<EmitterStateRecord> = Vec::new();
/// sink.write_record(&EmitterStateRecord::new(0.0, Side::Left, 0, 0, 150)).unwrap();
/// assert_eq!(sink.len(), 1);
/// ```
pub trait RecordSink {
    /// Appends one record. Records arrive in emission order.
    ///
    /// # Errors
    /// Returns an error if the underlying storage rejects the write.
    fn write_record(&mut self, record: &EmitterStateRecord) -> Result<()>;

    /// Flushes and closes the sink.
    ///
    /// # Errors
    /// Returns an error if buffered data cannot be persisted.
    fn finish(self) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl RecordSink for Vec<EmitterStateRecord> {
    fn write_record(&mut self, record: &EmitterStateRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

/// Writes every record of `records`, in order, then finishes the sink.
///
/// # Errors
/// Propagates the first sink error unchanged.
pub fn write_sequence<S: RecordSink>(mut sink: S, records: &[EmitterStateRecord]) -> Result<()> {
    for record in records {
        sink.write_record(record)?;
    }
    sink.finish()
}

/// Random-access provider of per-frame energies.
///
/// Implemented by : `FrameEnergyExtractor`.
///
/// `Sync` so frames can be pulled from several rayon workers at once.
///
/// # Example
/// ```
/// use wl_core::frame::FrameEnergyVector;
/// use wl_core::traits::EnergySource;
///
/// struct Constant;
/// impl EnergySource for Constant {
///     fn frame_count(&self) -> usize { 1 }
///     fn channel_count(&self) -> usize { 2 }
///     fn energy_at(&self, index: usize) -> Option<FrameEnergyVector> {
///         (index == 0).then(|| FrameEnergyVector { index, energies: vec![1.0, 1.0] })
///     }
/// }
/// assert_eq!(Constant.frame_count(), 1);
/// ```
pub trait EnergySource: Sync {
    /// Number of complete frames.
    fn frame_count(&self) -> usize;

    /// Channels per frame (2K).
    fn channel_count(&self) -> usize;

    /// Energies of frame `index`; `None` when `index >= frame_count()`.
    fn energy_at(&self, index: usize) -> Option<FrameEnergyVector>;
}
