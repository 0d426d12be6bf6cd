use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;
use wl_core::error::CoreError;

use crate::decode::decode_at_rate;

/// Truncates every channel to the shortest one and returns that length.
///
/// After this call all channels have identical length.
///
/// # Example
/// ```
/// use wl_audio::loader::truncate_to_common_length;
/// let mut channels = vec![vec![0.0; 5], vec![0.0; 3]];
/// assert_eq!(truncate_to_common_length(&mut channels), 3);
/// assert_eq!(channels[0].len(), 3);
/// ```
pub fn truncate_to_common_length(channels: &mut [Vec<f32>]) -> usize {
    let common = channels.iter().map(Vec::len).min().unwrap_or(0);
    for (i, ch) in channels.iter_mut().enumerate() {
        if ch.len() > common {
            log::debug!("Channel {i}: trimmed {} trailing samples", ch.len() - common);
            ch.truncate(common);
        }
    }
    common
}

/// Decodes every input at `sample_rate` and aligns them to a common length.
///
/// Files are decoded on the rayon pool; the returned channels keep the order
/// of `paths`.
///
/// # Errors
/// Returns [`CoreError::InvalidConfiguration`] for an empty path list, and
/// propagates the first decoding error unchanged. A channel that fails to
/// decode aborts the load; the others are never shortened to match it.
pub fn load_channels(paths: &[PathBuf], sample_rate: u32) -> Result<Vec<Vec<f32>>> {
    if paths.is_empty() {
        return Err(CoreError::config("no input files").into());
    }

    let mut channels = paths
        .par_iter()
        .map(|p| decode_at_rate(p, sample_rate))
        .collect::<Result<Vec<_>>>()?;

    let common = truncate_to_common_length(&mut channels);
    log::info!(
        "Loaded {} channels, common length {common} samples ({:.2}s @ {sample_rate}Hz)",
        channels.len(),
        common as f64 / f64::from(sample_rate)
    );
    Ok(channels)
}
