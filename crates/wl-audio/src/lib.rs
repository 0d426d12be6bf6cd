// Audio decoding, channel loading, and windowed energy extraction for wallights.

pub mod decode;
pub mod energy;
pub mod error;
pub mod loader;

pub use energy::FrameEnergyExtractor;
pub use error::AudioError;
