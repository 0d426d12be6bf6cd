use rayon::prelude::*;
use wl_core::error::CoreError;
use wl_core::record::EmitterStateRecord;
use wl_core::traits::EnergySource;

use crate::mapper::EmitterIntensityMapper;

/// Maps every frame of `source` and returns the records in
/// (frame, led_index, side) order.
///
/// With `parallel`, frames are mapped on the rayon pool; each frame fills a
/// private buffer and the indexed collect keeps frame order, so the result
/// is identical to the sequential path.
///
/// # Errors
/// Returns [`CoreError::ChannelCountMismatch`] before any frame is mapped if
/// the source does not provide one channel per microphone.
///
/// # Example
/// ```
/// use wl_audio::energy::FrameEnergyExtractor;
/// use wl_core::config::PipelineConfig;
/// use wl_map::{EmitterIntensityMapper, build_sequence};
///
/// let config = PipelineConfig { frame_size: 4, hop_size: 2, ..PipelineConfig::default() };
/// let channels = vec![vec![0.5f32; 8]; 10];
/// let extractor = FrameEnergyExtractor::new(&channels, 4, 2).unwrap();
/// let mapper = EmitterIntensityMapper::from_config(&config).unwrap();
/// let records = build_sequence(&extractor, &mapper, true).unwrap();
/// assert_eq!(records.len(), 3 * 100 * 2);
/// ```
pub fn build_sequence<S: EnergySource + ?Sized>(
    source: &S,
    mapper: &EmitterIntensityMapper,
    parallel: bool,
) -> Result<Vec<EmitterStateRecord>, CoreError> {
    if source.channel_count() != mapper.channel_count() {
        return Err(CoreError::ChannelCountMismatch {
            expected: mapper.channel_count(),
            found: source.channel_count(),
        });
    }

    let frames = source.frame_count();
    let per_frame = 2 * mapper.led_count();
    log::info!(
        "Mapping {frames} frames onto {} LEDs per strip ({})",
        mapper.led_count(),
        if parallel { "parallel" } else { "sequential" }
    );

    let records = if parallel {
        let chunks = (0..frames)
            .into_par_iter()
            .map(|f| map_one(source, mapper, f))
            .collect::<Result<Vec<_>, _>>()?;
        let mut records = Vec::with_capacity(frames * per_frame);
        for chunk in chunks {
            records.extend(chunk);
        }
        records
    } else {
        let mut records = Vec::with_capacity(frames * per_frame);
        for f in 0..frames {
            records.extend(map_one(source, mapper, f)?);
        }
        records
    };

    log::debug!("Built {} records", records.len());
    Ok(records)
}

fn map_one<S: EnergySource + ?Sized>(
    source: &S,
    mapper: &EmitterIntensityMapper,
    index: usize,
) -> Result<Vec<EmitterStateRecord>, CoreError> {
    let frame = source
        .energy_at(index)
        .ok_or_else(|| CoreError::config(format!("frame {index} out of range")))?;
    mapper.map_frame(&frame)
}
