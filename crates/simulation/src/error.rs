//! Error types for the simulation controller.

use thiserror::Error;

/// Result type alias for the simulation crate.
pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Error)]
pub enum SimulationError {
    /// Pool or selector failure.
    #[error(transparent)]
    Core(#[from] dispatch_core::Error),
    /// Configuration that cannot be used.
    #[error("invalid config: {0}")]
    Config(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulationError {
    /// Whether routing failed because no node was online.
    pub fn is_no_available_nodes(&self) -> bool {
        matches!(self, SimulationError::Core(dispatch_core::Error::NoAvailableNodes))
    }
}
