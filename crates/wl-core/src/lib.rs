//! Configuration, types, and shared structures for wallights.
//!
//! This crate contains the shared types, the sink trait, and the
//! configuration logic used across the wallights workspace.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod layout;
pub mod record;
pub mod traits;

pub use config::PipelineConfig;
pub use error::CoreError;
pub use frame::FrameEnergyVector;
pub use layout::{MicrophonePosition, Side};
pub use record::EmitterStateRecord;
pub use traits::{EnergySource, RecordSink};
