use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// Decode an audio file into mono f32 samples at its native rate.
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia. Multi-channel files are
/// downmixed by averaging.
///
/// # Errors
/// Returns an error if the file cannot be opened or probed, if it contains
/// no audio track, or if any packet fails to demux or decode. Partially
/// decoded audio is never returned.
///
/// # Example
/// ```no_run
/// use wl_audio::decode::decode_file;
/// let (samples, sample_rate) = decode_file("audios/mic1.wav").unwrap();
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<(Vec<f32>, u32)> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Cannot open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(format!("{}: {e}", path.display())))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::NoAudioTrack(path.to_path_buf()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeError(format!("{}: {e}", path.display())))?;

    let track_id = track.id;
    let mut all_samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(e) if is_end_of_stream(&e) => break,
            Err(e) => {
                return Err(AudioError::DecodeError(format!(
                    "{}: packet {} samples in: {e}",
                    path.display(),
                    all_samples.len()
                ))
                .into());
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        // A dropped packet would shift this channel against the others.
        let decoded = decoder.decode(&packet).map_err(|e| {
            AudioError::DecodeError(format!(
                "{}: frame {} samples in: {e}",
                path.display(),
                all_samples.len()
            ))
        })?;

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        for chunk in buf.samples().chunks(channels) {
            all_samples.push(chunk.iter().sum::<f32>() / channels as f32);
        }
    }

    log::info!(
        "Decoded {} samples @ {}Hz ({} ch) from {}",
        all_samples.len(),
        sample_rate,
        channels,
        path.display()
    );

    Ok((all_samples, sample_rate))
}

/// Whether a demuxer error marks the regular end of the stream.
///
/// Symphonia reports the end of a stream as an unexpected-EOF I/O error;
/// every other error is a real failure.
fn is_end_of_stream(err: &SymphoniaError) -> bool {
    matches!(err, SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

/// Resample `samples` from `from_rate` to `to_rate` by linear interpolation.
///
/// The output holds `ceil(len × to_rate / from_rate)` samples. Equal rates
/// return a copy of the input.
///
/// # Example
/// ```
/// use wl_audio::decode::resample_linear;
/// let up = resample_linear(&[0.0, 1.0], 1, 2);
/// assert_eq!(up, vec![0.0, 0.5, 1.0, 1.0]);
/// ```
#[must_use]
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = (samples.len() as u64 * u64::from(to_rate)).div_ceil(u64::from(from_rate));
    let step = f64::from(from_rate) / f64::from(to_rate);
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos.floor() as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples[(idx + 1).min(last)];
            a + (b - a) * frac
        })
        .collect()
}

/// Decode `path` and bring it to `sample_rate`.
///
/// # Errors
/// Propagates [`decode_file`] errors.
pub fn decode_at_rate(path: impl AsRef<Path>, sample_rate: u32) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let (samples, native_rate) = decode_file(path)?;
    if native_rate == sample_rate {
        return Ok(samples);
    }
    log::debug!(
        "Resampling {} from {native_rate}Hz to {sample_rate}Hz",
        path.display()
    );
    Ok(resample_linear(&samples, native_rate, sample_rate))
}
