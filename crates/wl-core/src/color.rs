/// Upper bound of every intensity and color component.
pub const FULL_SCALE: u8 = 255;

/// Blue component used by the reference installation.
pub const DEFAULT_BLUE: u8 = 150;

/// Projects a continuous intensity onto the integer range [0, 255].
///
/// Values are floored, not rounded. NaN maps to 0. A weighted average of
/// channels that are all at full scale can land just below 255 in floating
/// point, so a uniformly loud frame reads 254 on some LEDs.
///
/// # Example
/// ```
/// use wl_core::color::quantize_intensity;
/// assert_eq!(quantize_intensity(254.99), 254);
/// assert_eq!(quantize_intensity(300.0), 255);
/// assert_eq!(quantize_intensity(-1.0), 0);
/// ```
#[inline]
#[must_use]
pub fn quantize_intensity(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, f64::from(FULL_SCALE)) as u8
}

/// Encodes an intensity as an (R, G, B) triple.
///
/// Red follows the intensity, green is its complement, blue is constant, so
/// `r + g == 255` for every input.
///
/// # Example
/// ```
/// use wl_core::color::intensity_to_rgb;
/// assert_eq!(intensity_to_rgb(0, 150), (0, 255, 150));
/// assert_eq!(intensity_to_rgb(200, 150), (200, 55, 150));
/// ```
#[inline]
#[must_use]
pub fn intensity_to_rgb(intensity: u8, blue: u8) -> (u8, u8, u8) {
    (intensity, FULL_SCALE - intensity, blue)
}
