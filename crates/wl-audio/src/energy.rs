use std::iter::FusedIterator;

use wl_core::error::CoreError;
use wl_core::frame::FrameEnergyVector;
use wl_core::traits::EnergySource;

/// Slices aligned channels into overlapping windows and measures their energy.
///
/// Frame `f` covers samples `[f × hop, f × hop + window)`. Only frames whose
/// window fits entirely inside the channels are produced; trailing partial
/// windows are dropped.
///
/// # Example
/// ```
/// use wl_audio::energy::FrameEnergyExtractor;
/// let channels = [vec![1.0f32; 6], vec![0.0f32; 6]];
/// let extractor = FrameEnergyExtractor::new(&channels, 4, 2).unwrap();
/// assert_eq!(extractor.frame_count(), 2);
/// let first = extractor.into_iter().next().unwrap();
/// assert_eq!(first.energies, vec![4.0, 0.0]);
/// ```
#[derive(Clone, Debug)]
pub struct FrameEnergyExtractor<'a> {
    channels: Vec<&'a [f32]>,
    window: usize,
    hop: usize,
    frame_count: usize,
}

impl<'a> FrameEnergyExtractor<'a> {
    /// Creates an extractor over `channels`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfiguration`] if `window` or `hop` is
    /// zero, if there is no channel, or if the channels differ in length.
    pub fn new<C: AsRef<[f32]>>(
        channels: &'a [C],
        window: usize,
        hop: usize,
    ) -> Result<Self, CoreError> {
        if window == 0 {
            return Err(CoreError::config("window size must be > 0"));
        }
        if hop == 0 {
            return Err(CoreError::config("hop size must be > 0"));
        }
        if channels.is_empty() {
            return Err(CoreError::config("at least one channel is required"));
        }

        let channels: Vec<&[f32]> = channels.iter().map(AsRef::<[f32]>::as_ref).collect();
        let length = channels[0].len();
        if let Some((i, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != length) {
            return Err(CoreError::config(format!(
                "channel {i} has {} samples, channel 0 has {length}",
                ch.len()
            )));
        }

        Ok(Self {
            frame_count: complete_frames(length, window, hop),
            channels,
            window,
            hop,
        })
    }

    /// Number of complete frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of channels (2K).
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    #[must_use]
    pub fn channel_len(&self) -> usize {
        self.channels[0].len()
    }

    /// Energy vector of frame `index`, or `None` past the last frame.
    #[must_use]
    pub fn energy_at(&self, index: usize) -> Option<FrameEnergyVector> {
        if index >= self.frame_count {
            return None;
        }
        let start = index * self.hop;
        let end = start + self.window;
        let energies = self
            .channels
            .iter()
            .map(|ch| window_energy(&ch[start..end]))
            .collect();
        Some(FrameEnergyVector { index, energies })
    }
}

impl EnergySource for FrameEnergyExtractor<'_> {
    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn energy_at(&self, index: usize) -> Option<FrameEnergyVector> {
        FrameEnergyExtractor::energy_at(self, index)
    }
}

impl<'a> IntoIterator for FrameEnergyExtractor<'a> {
    type Item = FrameEnergyVector;
    type IntoIter = FrameEnergies<'a>;

    fn into_iter(self) -> Self::IntoIter {
        FrameEnergies {
            extractor: self,
            next: 0,
        }
    }
}

/// Consuming, single-pass sequence of frame energies.
pub struct FrameEnergies<'a> {
    extractor: FrameEnergyExtractor<'a>,
    next: usize,
}

impl Iterator for FrameEnergies<'_> {
    type Item = FrameEnergyVector;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.extractor.energy_at(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.extractor.frame_count.saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for FrameEnergies<'_> {}

impl FusedIterator for FrameEnergies<'_> {}

/// Frames `f < length / hop` whose window `[f × hop, f × hop + window)` fits.
///
/// # Example
/// ```
/// use wl_audio::energy::complete_frames;
/// assert_eq!(complete_frames(6, 4, 2), 2);
/// assert_eq!(complete_frames(3, 4, 2), 0);
/// ```
#[must_use]
pub fn complete_frames(length: usize, window: usize, hop: usize) -> usize {
    if hop == 0 || length < window {
        return 0;
    }
    (length / hop).min((length - window) / hop + 1)
}

/// Σ |sample|² accumulated in f64.
#[inline]
#[must_use]
pub fn window_energy(samples: &[f32]) -> f64 {
    samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum()
}
