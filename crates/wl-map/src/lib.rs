//! Spatial mapping engine for wallights.
//!
//! Turns per-frame microphone energies into per-LED intensities and colors.

pub mod mapper;
pub mod sequence;
pub mod weights;

pub use mapper::{EmitterIntensityMapper, FramePeak};
pub use sequence::build_sequence;
pub use weights::SpatialWeightTable;
