//! Error types for the simulator.

use odom_trail_core::TrailError;
use odom_trail_env::EnvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Display error: {0}")]
    Trail(#[from] TrailError),

    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values that parse but make no sense
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sample producer task panicked or was cancelled
    #[error("Producer task failed: {0}")]
    Producer(String),

    /// The Rerun viewer or recording file could not be opened
    #[error("Viewer error: {0}")]
    Viewer(String),
}
