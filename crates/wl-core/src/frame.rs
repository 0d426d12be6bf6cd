/// Windowed energy of every channel for one frame.
///
/// Holds 2K values, left wall first. Created once per frame and consumed by
/// the mapper; never persisted.
///
/// # Example
/// ```
/// use wl_core::frame::FrameEnergyVector;
/// use wl_core::layout::Side;
/// let v = FrameEnergyVector { index: 0, energies: vec![1.0, 2.0, 3.0, 4.0] };
/// assert_eq!(&v.energies[Side::Right.channel_range(2)], &[3.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FrameEnergyVector {
    /// Frame number f; the window starts at sample f × hop.
    pub index: usize,
    /// Σ sample² over the window, one entry per channel.
    pub energies: Vec<f64>,
}
