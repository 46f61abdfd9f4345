use crate::breath::BreathError;
use crate::config::ConfigError;

use super::PlotError;

/// Errors that abort an analysis run
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No valid samples could be read from the capture
    #[error("Insufficient data: no valid samples ({rejected} lines rejected)")]
    InsufficientData {
        /// Number of lines rejected as malformed
        rejected: usize,
    },

    /// Breath detection failed
    #[error("Breath detection failed: {0}")]
    Breath(#[from] BreathError),

    /// Chart rendering failed
    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),

    /// Invalid analysis configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error while reading the capture
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
