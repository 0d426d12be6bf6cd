use thiserror::Error;

/// Errors originating from the core module.
///
/// Every variant is a configuration error: it is detected before any frame
/// is processed and aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The number of channels does not match the microphone layout.
    #[error("Channel count mismatch: expected {expected}, found {found}")]
    ChannelCountMismatch {
        /// Channels required by the layout (2 × mics per wall).
        expected: usize,
        /// Channels actually supplied.
        found: usize,
    },
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidConfiguration`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
