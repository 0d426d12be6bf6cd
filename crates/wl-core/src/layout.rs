use std::fmt;

/// One of the two opposing walls; also names the LED strip mounted on it.
///
/// # Example
/// ```
/// use wl_core::layout::Side;
/// assert_eq!(Side::Left.as_str(), "left");
/// assert_eq!(Side::ALL, [Side::Left, Side::Right]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// First wall: channels `0..K`.
    Left,
    /// Opposite wall: channels `K..2K`.
    Right,
}

impl Side {
    /// Emission order within one emitter: left first.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Name written in the `strip` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Position of this side's channels inside a 2K energy vector.
    ///
    /// # Example
    /// ```
    /// use wl_core::layout::Side;
    /// assert_eq!(Side::Right.channel_range(5), 5..10);
    /// ```
    #[must_use]
    pub fn channel_range(self, mics_per_wall: usize) -> std::ops::Range<usize> {
        match self {
            Side::Left => 0..mics_per_wall,
            Side::Right => mics_per_wall..2 * mics_per_wall,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed physical position of one microphone.
///
/// `x` runs along the wall and is the only coordinate used for weighting;
/// `y` identifies the wall's distance from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MicrophonePosition {
    /// Along-wall coordinate in meters.
    pub x: f64,
    /// Across-room coordinate in meters.
    pub y: f64,
    /// Wall this microphone is mounted on.
    pub side: Side,
}

/// Along-wall coordinates of the microphones on `side`, in channel order.
///
/// # Example
/// ```
/// use wl_core::layout::{MicrophonePosition, Side, wall_axis};
/// let mics = [
///     MicrophonePosition { x: 0.0, y: 0.0, side: Side::Left },
///     MicrophonePosition { x: 3.0, y: 8.0, side: Side::Right },
/// ];
/// assert_eq!(wall_axis(&mics, Side::Right), vec![3.0]);
/// ```
#[must_use]
pub fn wall_axis(mics: &[MicrophonePosition], side: Side) -> Vec<f64> {
    mics.iter().filter(|m| m.side == side).map(|m| m.x).collect()
}

/// `count` evenly spaced values from `start` to `end`, both ends included.
///
/// A single point yields `[start]`; zero points yield an empty vector.
///
/// # Example
/// ```
/// use wl_core::layout::linspace;
/// assert_eq!(linspace(0.0, 10.0, 5), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
/// assert_eq!(linspace(4.0, 9.0, 1), vec![4.0]);
/// ```
#[must_use]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(0.0, 10.0, 100);
        assert_eq!(xs.len(), 100);
        assert!(xs[0].abs() < f64::EPSILON);
        assert!((xs[99] - 10.0).abs() < f64::EPSILON);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linspace_empty() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn channel_ranges_are_contiguous() {
        let k = 5;
        assert_eq!(Side::Left.channel_range(k), 0..5);
        assert_eq!(Side::Right.channel_range(k).start, Side::Left.channel_range(k).end);
    }
}
