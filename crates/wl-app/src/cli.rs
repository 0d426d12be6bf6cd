use std::path::PathBuf;

use clap::Parser;
use wl_core::config::PipelineConfig;

/// wallights — map microphone energy onto wall-mounted LED strips.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input recordings, left wall first (2 × mics per wall files).
    /// Default: mic1.wav … micN.wav in the input directory.
    pub inputs: Vec<PathBuf>,

    /// TOML configuration file. Default: config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Directory searched for mic1.wav … micN.wav.
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output CSV path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rate every input is resampled to, in Hz.
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Analysis window in samples.
    #[arg(long)]
    pub frame_size: Option<usize>,

    /// Hop between windows in samples.
    #[arg(long)]
    pub hop_size: Option<usize>,

    /// LEDs per strip.
    #[arg(long)]
    pub leds: Option<usize>,

    /// Map frames on a single thread.
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Applies command-line overrides on top of `config`.
    ///
    /// # Example
    /// ```
    /// use clap::Parser;
    /// use wl_app::cli::Cli;
    /// use wl_core::config::PipelineConfig;
    ///
    /// let cli = Cli::parse_from(["wallights", "--hop-size", "256", "--sequential"]);
    /// let mut config = PipelineConfig::default();
    /// cli.apply_overrides(&mut config);
    /// assert_eq!(config.hop_size, 256);
    /// assert!(!config.parallel);
    /// ```
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if !self.inputs.is_empty() {
            config.inputs.clone_from(&self.inputs);
        }
        if let Some(ref dir) = self.input_dir {
            config.input_dir.clone_from(dir);
        }
        if let Some(ref out) = self.output {
            config.output_path.clone_from(out);
        }
        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.frame_size {
            config.frame_size = v;
        }
        if let Some(v) = self.hop_size {
            config.hop_size = v;
        }
        if let Some(v) = self.leds {
            config.led_count = v;
        }
        if self.sequential {
            config.parallel = false;
        }
    }
}
