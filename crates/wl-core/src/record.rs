use crate::color::intensity_to_rgb;
use crate::layout::Side;

/// State of one LED at one instant: a single row of the output sequence.
///
/// Records are produced in (frame, led_index, side) order and never mutated
/// afterwards.
///
/// # Example
/// ```
/// use wl_core::layout::Side;
/// use wl_core::record::EmitterStateRecord;
/// let rec = EmitterStateRecord::new(0.5, Side::Left, 3, 200, 150);
/// assert_eq!(rec.color, (200, 55, 150));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmitterStateRecord {
    /// Frame start in seconds.
    pub time: f64,
    /// Strip the LED belongs to.
    pub side: Side,
    /// 0-based LED index along the strip.
    pub led_index: usize,
    /// Weighted intensity in [0, 255].
    pub intensity: u8,
    /// (R, G, B) derived from `intensity`.
    pub color: (u8, u8, u8),
}

impl EmitterStateRecord {
    /// Builds a record, deriving its color from `intensity`.
    #[must_use]
    pub fn new(time: f64, side: Side, led_index: usize, intensity: u8, blue: u8) -> Self {
        Self {
            time,
            side,
            led_index,
            intensity,
            color: intensity_to_rgb(intensity, blue),
        }
    }
}

/// Timestamp of a frame: `frame × (hop / sample_rate)` seconds.
///
/// # Example
/// ```
/// use wl_core::record::frame_time;
/// assert!((frame_time(3, 2, 100) - 0.06).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn frame_time(frame: usize, hop_size: usize, sample_rate: u32) -> f64 {
    frame as f64 * (hop_size as f64 / f64::from(sample_rate))
}
