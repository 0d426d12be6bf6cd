use wl_core::color::{FULL_SCALE, quantize_intensity};
use wl_core::config::PipelineConfig;
use wl_core::error::CoreError;
use wl_core::frame::FrameEnergyVector;
use wl_core::layout::{Side, wall_axis};
use wl_core::record::{EmitterStateRecord, frame_time};

use crate::weights::SpatialWeightTable;

/// Reference level of a frame, used to scale its energies to [0, 255].
///
/// A frame whose energies are all zero is `Silent`: it is scaled by 1
/// instead of by its (zero) maximum, so every LED of that frame goes dark
/// instead of dividing by zero.
///
/// # Example
/// ```
/// use wl_map::mapper::FramePeak;
/// assert_eq!(FramePeak::of(&[0.0, 0.0]), FramePeak::Silent);
/// assert_eq!(FramePeak::of(&[1.0, 4.0]).divisor(), 4.0);
/// assert_eq!(FramePeak::Silent.divisor(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FramePeak {
    /// Largest channel energy, strictly positive.
    Active(f64),
    /// No positive energy in the frame.
    Silent,
}

impl FramePeak {
    /// Classifies a frame by its largest energy.
    #[must_use]
    pub fn of(energies: &[f64]) -> Self {
        let max = energies.iter().copied().fold(0.0, f64::max);
        if max > 0.0 {
            FramePeak::Active(max)
        } else {
            FramePeak::Silent
        }
    }

    /// Value energies are divided by before scaling to full scale.
    #[must_use]
    pub fn divisor(self) -> f64 {
        match self {
            FramePeak::Active(max) => max,
            FramePeak::Silent => 1.0,
        }
    }
}

/// Scales energies against the frame's peak: `e / peak × 255`.
///
/// `peak` must come from [`FramePeak::of`] on the same energies. The loudest
/// channel then maps to exactly 255; a silent frame maps to zeros.
///
/// # Example
/// ```
/// use wl_map::mapper::{FramePeak, normalize_energies};
/// let energies = [4.0, 0.0, 2.0];
/// let peak = FramePeak::of(&energies);
/// assert_eq!(normalize_energies(&energies, peak), vec![255.0, 0.0, 127.5]);
/// assert_eq!(normalize_energies(&[0.0, 0.0], FramePeak::Silent), vec![0.0, 0.0]);
/// ```
#[must_use]
pub fn normalize_energies(energies: &[f64], peak: FramePeak) -> Vec<f64> {
    let divisor = peak.divisor();
    let scale = f64::from(FULL_SCALE);
    energies.iter().map(|e| e / divisor * scale).collect()
}

/// Converts frame energies into LED records for both strips.
///
/// Stateless across frames: each call to [`map_frame`](Self::map_frame)
/// depends only on its input and the immutable weight tables, so frames can
/// be mapped in any order or in parallel.
#[derive(Clone, Debug)]
pub struct EmitterIntensityMapper {
    left: SpatialWeightTable,
    right: SpatialWeightTable,
    hop_size: usize,
    sample_rate: u32,
    color_blue: u8,
}

impl EmitterIntensityMapper {
    /// Builds a mapper from one weight table per wall.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfiguration`] if the two tables differ
    /// in LED or microphone count, or if `hop_size` or `sample_rate` is zero.
    pub fn new(
        left: SpatialWeightTable,
        right: SpatialWeightTable,
        hop_size: usize,
        sample_rate: u32,
        color_blue: u8,
    ) -> Result<Self, CoreError> {
        if left.emitter_count() != right.emitter_count() {
            return Err(CoreError::config(format!(
                "strips differ in length: left {} LEDs, right {}",
                left.emitter_count(),
                right.emitter_count()
            )));
        }
        if left.mic_count() != right.mic_count() {
            return Err(CoreError::config(format!(
                "walls differ in microphone count: left {}, right {}",
                left.mic_count(),
                right.mic_count()
            )));
        }
        if hop_size == 0 || sample_rate == 0 {
            return Err(CoreError::config("hop_size and sample_rate must be > 0"));
        }
        Ok(Self {
            left,
            right,
            hop_size,
            sample_rate,
            color_blue,
        })
    }

    /// Builds both weight tables from the configured microphone positions.
    ///
    /// # Errors
    /// Returns the first validation or weight-table error.
    ///
    /// # Example
    /// ```
    /// use wl_core::config::PipelineConfig;
    /// use wl_map::mapper::EmitterIntensityMapper;
    /// let mapper = EmitterIntensityMapper::from_config(&PipelineConfig::default()).unwrap();
    /// assert_eq!(mapper.led_count(), 100);
    /// assert_eq!(mapper.channel_count(), 10);
    /// ```
    pub fn from_config(config: &PipelineConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let mics = config.microphones();
        let left = SpatialWeightTable::for_strip(&wall_axis(&mics, Side::Left), config.led_count)?;
        let right =
            SpatialWeightTable::for_strip(&wall_axis(&mics, Side::Right), config.led_count)?;
        Self::new(
            left,
            right,
            config.hop_size,
            config.sample_rate,
            config.color_blue,
        )
    }

    /// LEDs per strip.
    #[must_use]
    pub fn led_count(&self) -> usize {
        self.left.emitter_count()
    }

    /// Microphones per wall (K).
    #[must_use]
    pub fn mics_per_wall(&self) -> usize {
        self.left.mic_count()
    }

    /// Energies expected per frame (2K).
    #[must_use]
    pub fn channel_count(&self) -> usize {
        2 * self.mics_per_wall()
    }

    /// Weight table used for `side`.
    #[must_use]
    pub fn table(&self, side: Side) -> &SpatialWeightTable {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Timestamp of frame `index` in seconds.
    #[must_use]
    pub fn time_of(&self, index: usize) -> f64 {
        frame_time(index, self.hop_size, self.sample_rate)
    }

    /// Maps one frame to `2 × led_count` records, ordered by LED then side.
    ///
    /// # Errors
    /// Returns [`CoreError::ChannelCountMismatch`] if the frame does not hold
    /// exactly 2K energies.
    pub fn map_frame(
        &self,
        frame: &FrameEnergyVector,
    ) -> Result<Vec<EmitterStateRecord>, CoreError> {
        let mut out = Vec::with_capacity(2 * self.led_count());
        self.map_frame_into(frame, &mut out)?;
        Ok(out)
    }

    /// Appends the records of one frame to `out`.
    ///
    /// # Errors
    /// Same as [`map_frame`](Self::map_frame); nothing is appended on error.
    pub fn map_frame_into(
        &self,
        frame: &FrameEnergyVector,
        out: &mut Vec<EmitterStateRecord>,
    ) -> Result<(), CoreError> {
        if frame.energies.len() != self.channel_count() {
            return Err(CoreError::ChannelCountMismatch {
                expected: self.channel_count(),
                found: frame.energies.len(),
            });
        }

        let peak = FramePeak::of(&frame.energies);
        if peak == FramePeak::Silent {
            log::trace!("Frame {} is silent", frame.index);
        }
        let normalized = normalize_energies(&frame.energies, peak);
        let k = self.mics_per_wall();
        let time = self.time_of(frame.index);

        for m in 0..self.led_count() {
            for side in Side::ALL {
                let level = self
                    .table(side)
                    .weighted_sum(m, &normalized[side.channel_range(k)]);
                out.push(EmitterStateRecord::new(
                    time,
                    side,
                    m,
                    quantize_intensity(level),
                    self.color_blue,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_core::color::DEFAULT_BLUE;

    fn two_mic_mapper(leds: &[f64]) -> Result<EmitterIntensityMapper, CoreError> {
        let mics = [0.0, 10.0];
        EmitterIntensityMapper::new(
            SpatialWeightTable::new(leds, &mics)?,
            SpatialWeightTable::new(leds, &mics)?,
            2,
            100,
            DEFAULT_BLUE,
        )
    }

    #[test]
    fn reference_scenario_led_on_loud_microphone() -> Result<(), CoreError> {
        // K = 2, mics [0, 10], channel A all ones, channel B silent:
        // frame 0 energies per side are [4, 0] -> normalized [255, 0].
        let mapper = two_mic_mapper(&[0.0, 10.0])?;
        let frame = FrameEnergyVector {
            index: 0,
            energies: vec![4.0, 0.0, 4.0, 0.0],
        };
        let records = mapper.map_frame(&frame)?;
        assert_eq!(records.len(), 4);

        let led0 = records[0];
        assert_eq!(led0.side, Side::Left);
        assert_eq!(led0.led_index, 0);
        assert!(led0.intensity >= 254, "got {}", led0.intensity);
        assert!(led0.time.abs() < f64::EPSILON);

        // LED at the silent microphone stays dark.
        assert_eq!(records[2].led_index, 1);
        assert_eq!(records[2].intensity, 0);
        Ok(())
    }

    #[test]
    fn loudest_channel_normalizes_to_full_scale() {
        let energies = [3.0, 12.0, 0.5, 7.0];
        assert_eq!(FramePeak::of(&energies), FramePeak::Active(12.0));
        let normalized = normalize_energies(&energies, FramePeak::of(&energies));
        assert!((normalized[1] - 255.0).abs() < f64::EPSILON);
        assert!(normalized.iter().all(|&v| (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn silent_frame_maps_to_dark_leds() -> Result<(), CoreError> {
        let mapper = EmitterIntensityMapper::from_config(&PipelineConfig::default())?;
        let frame = FrameEnergyVector {
            index: 7,
            energies: vec![0.0; 10],
        };
        let records = mapper.map_frame(&frame)?;
        assert_eq!(records.len(), 200);
        for r in &records {
            assert_eq!(r.intensity, 0);
            assert_eq!(r.color, (0, 255, DEFAULT_BLUE));
        }
        Ok(())
    }

    #[test]
    fn uniform_frame_floors_to_254_or_255() -> Result<(), CoreError> {
        let mapper = EmitterIntensityMapper::from_config(&PipelineConfig::default())?;
        let frame = FrameEnergyVector {
            index: 0,
            energies: vec![4.0; 10],
        };
        let records = mapper.map_frame(&frame)?;
        assert!(records.iter().all(|r| r.intensity >= 254));
        Ok(())
    }

    #[test]
    fn records_follow_led_then_side_order() -> Result<(), CoreError> {
        let mapper = EmitterIntensityMapper::from_config(&PipelineConfig::default())?;
        let frame = FrameEnergyVector {
            index: 3,
            energies: (1..=10).map(f64::from).collect(),
        };
        let records = mapper.map_frame(&frame)?;
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.led_index, i / 2);
            assert_eq!(r.side, if i % 2 == 0 { Side::Left } else { Side::Right });
            assert!((r.time - 3.0 * 512.0 / 44100.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn each_side_uses_its_own_energies_and_color() -> Result<(), CoreError> {
        let mapper = two_mic_mapper(&[0.0, 10.0])?;
        // Left silent, right loud.
        let frame = FrameEnergyVector {
            index: 0,
            energies: vec![0.0, 0.0, 9.0, 9.0],
        };
        let records = mapper.map_frame(&frame)?;
        let left = records[0];
        let right = records[1];
        assert_eq!(left.intensity, 0);
        assert_eq!(left.color.0, 0);
        assert!(right.intensity >= 254);
        assert_eq!(right.color.0, right.intensity);
        assert_eq!(u16::from(right.color.0) + u16::from(right.color.1), 255);
        Ok(())
    }

    #[test]
    fn separate_wall_layouts_produce_different_levels() -> Result<(), CoreError> {
        let leds = [0.0, 10.0];
        let mapper = EmitterIntensityMapper::new(
            SpatialWeightTable::new(&leds, &[0.0, 10.0])?,
            SpatialWeightTable::new(&leds, &[10.0, 0.0])?,
            2,
            100,
            DEFAULT_BLUE,
        )?;
        let frame = FrameEnergyVector {
            index: 0,
            energies: vec![1.0, 0.0, 1.0, 0.0],
        };
        let records = mapper.map_frame(&frame)?;
        // LED 0: left wall hears mic at x=0, right wall's loud mic is at x=10.
        assert!(records[0].intensity > 250);
        assert!(records[1].intensity < 5);
        Ok(())
    }

    #[test]
    fn tables_follow_configured_microphones() -> Result<(), CoreError> {
        let config = PipelineConfig {
            mics_per_wall: 3,
            right_mic_x: Some(vec![2.0, 3.0, 9.0]),
            led_count: 4,
            ..PipelineConfig::default()
        };
        let mapper = EmitterIntensityMapper::from_config(&config)?;
        let mics = config.microphones();
        for side in Side::ALL {
            let expected = SpatialWeightTable::for_strip(&wall_axis(&mics, side), 4)?;
            for m in 0..4 {
                assert_eq!(mapper.table(side).row(m), expected.row(m));
            }
        }
        // LED 0 of the right strip sits on the microphone at x = 2.
        let right = mapper.table(Side::Right).row(0);
        assert!(right[0] > right[1] && right[1] > right[2]);
        assert_ne!(mapper.table(Side::Left).row(0), right);
        Ok(())
    }

    #[test]
    fn intensities_stay_in_range_and_colors_complement() -> Result<(), CoreError> {
        let mapper = EmitterIntensityMapper::from_config(&PipelineConfig::default())?;
        let frame = FrameEnergyVector {
            index: 1,
            energies: vec![1e-9, 3.0, 250.0, 0.0, 17.5, 1e6, 2.0, 0.0, 44.0, 1e6],
        };
        for r in mapper.map_frame(&frame)? {
            assert_eq!(u16::from(r.color.0) + u16::from(r.color.1), 255);
            assert_eq!(r.color.0, r.intensity);
            assert_eq!(r.color.2, DEFAULT_BLUE);
        }
        Ok(())
    }

    #[test]
    fn wrong_channel_count_is_rejected() -> Result<(), CoreError> {
        let mapper = two_mic_mapper(&[0.0, 5.0, 10.0])?;
        let frame = FrameEnergyVector {
            index: 0,
            energies: vec![1.0; 3],
        };
        let mut out = Vec::new();
        assert_eq!(
            mapper.map_frame_into(&frame, &mut out),
            Err(CoreError::ChannelCountMismatch {
                expected: 4,
                found: 3
            })
        );
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn mismatched_strips_are_rejected() -> Result<(), CoreError> {
        let result = EmitterIntensityMapper::new(
            SpatialWeightTable::new(&[0.0, 1.0], &[0.0, 1.0])?,
            SpatialWeightTable::new(&[0.0], &[0.0, 1.0])?,
            2,
            100,
            DEFAULT_BLUE,
        );
        assert!(result.is_err());
        Ok(())
    }
}
