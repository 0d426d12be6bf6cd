use anyhow::{Context, Result};
use wl_audio::energy::FrameEnergyExtractor;
use wl_audio::loader::load_channels;
use wl_core::config::{PipelineConfig, load_config};
use wl_core::error::CoreError;
use wl_core::record::EmitterStateRecord;
use wl_core::traits::write_sequence;
use wl_export::csv::CsvSink;
use wl_map::{EmitterIntensityMapper, build_sequence};

use crate::cli::Cli;

/// Loads `--config` if it exists, otherwise falls back to the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or is invalid.
pub fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        log::warn!(
            "Config not found: {}. Using defaults.",
            cli.config.display()
        );
        Ok(PipelineConfig::default())
    }
}

/// Maps already-loaded, equal-length channels to the ordered record sequence.
///
/// `mapper` carries the weight tables, built once by the caller.
///
/// # Errors
/// Returns a [`CoreError`] if the channel set does not match the layout.
pub fn render_sequence(
    channels: &[Vec<f32>],
    config: &PipelineConfig,
    mapper: &EmitterIntensityMapper,
) -> Result<Vec<EmitterStateRecord>, CoreError> {
    if channels.len() != config.channel_count() {
        return Err(CoreError::ChannelCountMismatch {
            expected: config.channel_count(),
            found: channels.len(),
        });
    }
    let extractor = FrameEnergyExtractor::new(channels, config.frame_size, config.hop_size)?;
    log::info!(
        "{} frames of {} samples (hop {}) over {} samples per channel",
        extractor.frame_count(),
        config.frame_size,
        config.hop_size,
        extractor.channel_len()
    );
    build_sequence(&extractor, mapper, config.parallel)
}

/// Runs the whole pipeline: decode, align, analyze, map, write CSV.
///
/// Returns the number of records written.
///
/// # Errors
/// Configuration errors are reported before any file is decoded; decoding
/// and write errors propagate unchanged. No partial output is kept on a
/// mapping error since the CSV is only created once all records exist.
pub fn run(config: &PipelineConfig) -> Result<usize> {
    // Fail on a bad layout before spending time decoding.
    let mapper = EmitterIntensityMapper::from_config(config)?;

    let paths = config.input_paths();
    log::info!("Loading {} recordings", paths.len());
    let channels = load_channels(&paths, config.sample_rate)?;

    let records = render_sequence(&channels, config, &mapper)?;
    let sink = CsvSink::create(&config.output_path)?;
    write_sequence(sink, &records)
        .with_context(|| format!("Cannot write {}", config.output_path.display()))?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) -> std::io::Result<()> {
        let data_size = (samples.len() * 2) as u32;
        let mut w = std::io::BufWriter::new(std::fs::File::create(path)?);
        w.write_all(b"RIFF")?;
        w.write_all(&(36 + data_size).to_le_bytes())?;
        w.write_all(b"WAVEfmt ")?;
        w.write_all(&16u32.to_le_bytes())?;
        w.write_all(&1u16.to_le_bytes())?;
        w.write_all(&1u16.to_le_bytes())?;
        w.write_all(&sample_rate.to_le_bytes())?;
        w.write_all(&(sample_rate * 2).to_le_bytes())?;
        w.write_all(&2u16.to_le_bytes())?;
        w.write_all(&16u16.to_le_bytes())?;
        w.write_all(b"data")?;
        w.write_all(&data_size.to_le_bytes())?;
        for s in samples {
            w.write_all(&s.to_le_bytes())?;
        }
        w.flush()
    }

    fn room_config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            sample_rate: 8000,
            input_dir: dir.to_path_buf(),
            frame_size: 256,
            hop_size: 128,
            mics_per_wall: 2,
            led_count: 10,
            output_path: dir.join("led_strip_data.csv"),
            ..PipelineConfig::default()
        }
    }

    fn write_room(dir: &Path) -> std::io::Result<()> {
        // mic1 loud, mic2 quiet, mic3 silent, mic4 medium, mic4 shorter.
        let tone = |amp: f64, len: usize| -> Vec<i16> {
            (0..len)
                .map(|i| (amp * (i as f64 * 0.3).sin() * 32000.0) as i16)
                .collect()
        };
        write_wav(&dir.join("mic1.wav"), 8000, &tone(0.9, 4000))?;
        write_wav(&dir.join("mic2.wav"), 8000, &tone(0.1, 4000))?;
        write_wav(&dir.join("mic3.wav"), 8000, &tone(0.0, 4000))?;
        write_wav(&dir.join("mic4.wav"), 8000, &tone(0.5, 3000))
    }

    #[test]
    fn end_to_end_writes_expected_table() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_room(dir.path())?;
        let config = room_config(dir.path());

        let written = run(&config)?;
        // common length 3000: min(3000/128 = 23, (3000-256)/128 + 1 = 22) frames
        assert_eq!(written, 22 * 10 * 2);

        let text = std::fs::read_to_string(&config.output_path)?;
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("time,strip,led_index,intensity,color_R,color_G,color_B")
        );
        let first: Vec<&str> = lines.next().unwrap_or_default().split(',').collect();
        assert_eq!(first[..3], ["0.0", "left", "0"]);
        for line in text.lines().skip(1) {
            let cols: Vec<u32> = line
                .split(',')
                .skip(3)
                .filter_map(|c| c.parse().ok())
                .collect();
            assert_eq!(cols.len(), 4, "row {line}");
            assert_eq!(cols[1] + cols[2], 255);
            assert_eq!(cols[3], 150);
        }
        Ok(())
    }

    #[test]
    fn rerun_is_byte_identical() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_room(dir.path())?;
        let mut config = room_config(dir.path());

        run(&config)?;
        let first = std::fs::read(&config.output_path)?;
        config.parallel = false;
        run(&config)?;
        let second = std::fs::read(&config.output_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn missing_recording_aborts_without_output() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_room(dir.path())?;
        std::fs::remove_file(dir.path().join("mic3.wav"))?;
        let config = room_config(dir.path());

        assert!(run(&config).is_err());
        assert!(!config.output_path.exists());
        Ok(())
    }

    #[test]
    fn invalid_config_fails_before_decoding() {
        let config = PipelineConfig {
            hop_size: 0,
            inputs: vec![PathBuf::from("does-not-exist.wav"); 10],
            ..PipelineConfig::default()
        };
        let err = run(&config).err();
        assert!(
            err.as_ref()
                .and_then(|e| e.downcast_ref::<CoreError>())
                .is_some(),
            "expected a configuration error, got {err:?}"
        );
    }

    #[test]
    fn render_rejects_wrong_channel_count() -> Result<()> {
        let config = PipelineConfig::default();
        let mapper = EmitterIntensityMapper::from_config(&config)?;
        let channels = vec![vec![0.0f32; 2048]; 4];
        assert_eq!(
            render_sequence(&channels, &config, &mapper),
            Err(CoreError::ChannelCountMismatch {
                expected: 10,
                found: 4
            })
        );
        Ok(())
    }
}
