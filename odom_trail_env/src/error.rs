//! Error types for the odometry environment abstraction.

use thiserror::Error;

/// Errors that can occur between the message stream and the display.
#[derive(Debug, Error)]
pub enum EnvError {
    /// No transform is known from the message frame to the fixed frame
    #[error("No transform from frame '{from}' to '{to}'")]
    UnknownFrame { from: String, to: String },

    /// The message carries NaN or infinite values
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The sample channel is closed or full
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl EnvError {
    /// Creates an unknown frame error.
    pub fn unknown_frame(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::UnknownFrame {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a channel error.
    pub fn channel(msg: impl std::fmt::Display) -> Self {
        Self::ChannelError(msg.to_string())
    }
}
