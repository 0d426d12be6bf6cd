use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::color::DEFAULT_BLUE;
use crate::error::CoreError;
use crate::layout::{MicrophonePosition, Side, linspace};

/// Complete pipeline configuration.
///
/// Loaded from TOML by [`load_config`]. Every field has a sane default
/// matching the reference installation: 5 microphones per wall, 100 LEDs per strip.
///
/// # Example
/// ```
/// use wl_core::config::PipelineConfig;
/// let config = PipelineConfig::default();
/// assert_eq!(config.hop_size, 512);
/// assert_eq!(config.channel_count(), 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    // === Audio ===
    /// Rate every input is decoded (and resampled) to, in Hz.
    pub sample_rate: u32,
    /// Directory holding `mic1.wav … micN.wav` when `inputs` is empty.
    pub input_dir: PathBuf,
    /// Explicit input list, left wall first. Empty = default naming.
    pub inputs: Vec<PathBuf>,

    // === Analysis ===
    /// Window length W in samples.
    pub frame_size: usize,
    /// Hop H between consecutive windows, in samples.
    pub hop_size: usize,
    /// Map frames on the rayon pool instead of sequentially.
    pub parallel: bool,

    // === Layout ===
    /// Microphones per wall (K).
    pub mics_per_wall: usize,
    /// First microphone x when no per-wall override is given.
    pub wall_start: f64,
    /// Last microphone x when no per-wall override is given.
    pub wall_end: f64,
    /// y coordinate of the left wall.
    pub left_wall_y: f64,
    /// y coordinate of the right wall.
    pub right_wall_y: f64,
    /// Explicit x coordinates of the left-wall microphones.
    pub left_mic_x: Option<Vec<f64>>,
    /// Explicit x coordinates of the right-wall microphones.
    pub right_mic_x: Option<Vec<f64>>,
    /// LEDs per strip (M).
    pub led_count: usize,

    // === Output ===
    /// Destination of the CSV sequence.
    pub output_path: PathBuf,
    /// Constant blue component of every record.
    pub color_blue: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            input_dir: PathBuf::from("audios"),
            inputs: Vec::new(),
            frame_size: 1024,
            hop_size: 512,
            parallel: true,
            mics_per_wall: 5,
            wall_start: 0.0,
            wall_end: 10.0,
            left_wall_y: 0.0,
            right_wall_y: 8.0,
            left_mic_x: None,
            right_mic_x: None,
            led_count: 100,
            output_path: PathBuf::from("led_strip_data.csv"),
            color_blue: DEFAULT_BLUE,
        }
    }
}

impl PipelineConfig {
    /// Total number of input channels (2K).
    #[must_use]
    pub fn channel_count(&self) -> usize {
        2 * self.mics_per_wall
    }

    /// Along-wall microphone coordinates for `side`, in channel order.
    ///
    /// # Example
    /// ```
    /// use wl_core::config::PipelineConfig;
    /// use wl_core::layout::Side;
    /// let config = PipelineConfig::default();
    /// assert_eq!(config.mic_axis(Side::Right), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    /// ```
    #[must_use]
    pub fn mic_axis(&self, side: Side) -> Vec<f64> {
        let explicit = match side {
            Side::Left => self.left_mic_x.as_ref(),
            Side::Right => self.right_mic_x.as_ref(),
        };
        explicit.cloned().unwrap_or_else(|| {
            linspace(self.wall_start, self.wall_end, self.mics_per_wall)
        })
    }

    /// All 2K microphone positions, left wall first.
    ///
    /// Weight tables are built from these positions through
    /// [`wall_axis`](crate::layout::wall_axis).
    #[must_use]
    pub fn microphones(&self) -> Vec<MicrophonePosition> {
        Side::ALL
            .into_iter()
            .flat_map(|side| {
                let y = match side {
                    Side::Left => self.left_wall_y,
                    Side::Right => self.right_wall_y,
                };
                self.mic_axis(side)
                    .into_iter()
                    .map(move |x| MicrophonePosition { x, y, side })
            })
            .collect()
    }

    /// Input files in channel order.
    ///
    /// Falls back to `input_dir/mic{i}.wav` for i = 1 … 2K.
    ///
    /// # Example
    /// ```
    /// use wl_core::config::PipelineConfig;
    /// let paths = PipelineConfig::default().input_paths();
    /// assert_eq!(paths.len(), 10);
    /// assert!(paths[9].ends_with("mic10.wav"));
    /// ```
    #[must_use]
    pub fn input_paths(&self) -> Vec<PathBuf> {
        if self.inputs.is_empty() {
            (1..=self.channel_count())
                .map(|i| self.input_dir.join(format!("mic{i}.wav")))
                .collect()
        } else {
            self.inputs.clone()
        }
    }

    /// Checks every invariant the pipeline relies on.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfiguration`] for zero sizes, non-finite
    /// coordinates or per-wall overrides of the wrong length, and
    /// [`CoreError::ChannelCountMismatch`] when an explicit input list does
    /// not hold exactly 2K files.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sample_rate == 0 {
            return Err(CoreError::config("sample_rate must be > 0"));
        }
        if self.frame_size == 0 {
            return Err(CoreError::config("frame_size must be > 0"));
        }
        if self.hop_size == 0 {
            return Err(CoreError::config("hop_size must be > 0"));
        }
        if self.mics_per_wall == 0 {
            return Err(CoreError::config("mics_per_wall must be > 0"));
        }
        if self.led_count == 0 {
            return Err(CoreError::config("led_count must be > 0"));
        }
        for (name, v) in [
            ("wall_start", self.wall_start),
            ("wall_end", self.wall_end),
            ("left_wall_y", self.left_wall_y),
            ("right_wall_y", self.right_wall_y),
        ] {
            if !v.is_finite() {
                return Err(CoreError::config(format!("{name} is not finite: {v}")));
            }
        }
        for (name, axis) in [
            ("left_mic_x", &self.left_mic_x),
            ("right_mic_x", &self.right_mic_x),
        ] {
            if let Some(xs) = axis {
                if xs.len() != self.mics_per_wall {
                    return Err(CoreError::config(format!(
                        "{name} has {} entries, mics_per_wall is {}",
                        xs.len(),
                        self.mics_per_wall
                    )));
                }
                if let Some(bad) = xs.iter().find(|x| !x.is_finite()) {
                    return Err(CoreError::config(format!("{name} contains {bad}")));
                }
            }
        }
        if !self.inputs.is_empty() && self.inputs.len() != self.channel_count() {
            return Err(CoreError::ChannelCountMismatch {
                expected: self.channel_count(),
                found: self.inputs.len(),
            });
        }
        Ok(())
    }
}

/// Intermediate TOML structure, every section optional.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    audio: Option<AudioSection>,
    analysis: Option<AnalysisSection>,
    layout: Option<LayoutSection>,
    output: Option<OutputSection>,
}

/// Audio section of the TOML config, all fields optional.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AudioSection {
    sample_rate: Option<u32>,
    input_dir: Option<PathBuf>,
    inputs: Option<Vec<PathBuf>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisSection {
    frame_size: Option<usize>,
    hop_size: Option<usize>,
    parallel: Option<bool>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutSection {
    mics_per_wall: Option<usize>,
    wall_start: Option<f64>,
    wall_end: Option<f64>,
    left_wall_y: Option<f64>,
    right_wall_y: Option<f64>,
    left_mic_x: Option<Vec<f64>>,
    right_mic_x: Option<Vec<f64>>,
    led_count: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
    path: Option<PathBuf>,
    color_blue: Option<u8>,
}

/// Parses TOML text and merges it over the defaults.
///
/// Relative input and output paths are kept as written.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema or if the
/// merged configuration fails [`PipelineConfig::validate`].
///
/// # Example
/// ```
/// use wl_core::config::parse_config;
/// let config = parse_config("[analysis]\nhop_size = 256\n").unwrap();
/// assert_eq!(config.hop_size, 256);
/// assert_eq!(config.frame_size, 1024);
/// ```
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let file: ConfigFile = toml::from_str(content).context("TOML parse error")?;
    let mut config = PipelineConfig::default();

    if let Some(a) = file.audio {
        if let Some(v) = a.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = a.input_dir {
            config.input_dir = v;
        }
        if let Some(v) = a.inputs {
            config.inputs = v;
        }
    }

    if let Some(a) = file.analysis {
        if let Some(v) = a.frame_size {
            config.frame_size = v;
        }
        if let Some(v) = a.hop_size {
            config.hop_size = v;
        }
        if let Some(v) = a.parallel {
            config.parallel = v;
        }
    }

    if let Some(l) = file.layout {
        if let Some(v) = l.mics_per_wall {
            config.mics_per_wall = v;
        }
        if let Some(v) = l.wall_start {
            config.wall_start = v;
        }
        if let Some(v) = l.wall_end {
            config.wall_end = v;
        }
        if let Some(v) = l.left_wall_y {
            config.left_wall_y = v;
        }
        if let Some(v) = l.right_wall_y {
            config.right_wall_y = v;
        }
        if l.left_mic_x.is_some() {
            config.left_mic_x = l.left_mic_x;
        }
        if l.right_mic_x.is_some() {
            config.right_mic_x = l.right_mic_x;
        }
        if let Some(v) = l.led_count {
            config.led_count = v;
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.path {
            config.output_path = v;
        }
        if let Some(v) = o.color_blue {
            config.color_blue = v;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Loads a TOML file and merges it with the default values.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if the result
/// is not a valid configuration.
///
/// # Example
/// ```no_run
/// use wl_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Invalid config {}", path.display()))?;
    log::debug!("Loaded config from {}: {config:?}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_reference_room() {
        let mics = PipelineConfig::default().microphones();
        assert_eq!(mics.len(), 10);
        assert!(mics[..5].iter().all(|m| m.side == Side::Left && m.y.abs() < f64::EPSILON));
        assert!(mics[5..].iter().all(|m| m.side == Side::Right && (m.y - 8.0).abs() < f64::EPSILON));
        assert!((mics[4].x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("room.toml");
        std::fs::write(
            &path,
            "[layout]\nmics_per_wall = 2\nright_mic_x = [1.0, 4.0]\nled_count = 8\n\
             [output]\ncolor_blue = 10\n",
        )?;
        let config = load_config(&path)?;
        assert_eq!(config.mics_per_wall, 2);
        assert_eq!(config.led_count, 8);
        assert_eq!(config.color_blue, 10);
        assert_eq!(config.mic_axis(Side::Left), vec![0.0, 10.0]);
        assert_eq!(config.mic_axis(Side::Right), vec![1.0, 4.0]);
        assert_eq!(config.sample_rate, 44100);
        Ok(())
    }

    #[test]
    fn zero_hop_is_rejected() {
        let config = PipelineConfig {
            hop_size: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let config = PipelineConfig {
            left_mic_x: Some(vec![0.0, 1.0, f64::NAN, 3.0, 4.0]),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn override_length_must_match_mics_per_wall() {
        let config = PipelineConfig {
            right_mic_x: Some(vec![0.0, 1.0]),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_inputs_must_cover_every_channel() {
        let config = PipelineConfig {
            inputs: vec![PathBuf::from("a.wav"); 3],
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(CoreError::ChannelCountMismatch {
                expected: 10,
                found: 3
            })
        );
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        assert!(parse_config("[analysis]\nwindow = 3\n").is_err());
    }
}
