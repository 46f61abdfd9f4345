/// Errors that prevent the leakage volume from being computed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeakageError {
    /// Time and flow series differ in length
    #[error("series length mismatch: time has {time_len} samples, flow has {flow_len}")]
    LengthMismatch {
        /// Length of the time series
        time_len: usize,
        /// Length of the flow series
        flow_len: usize,
    },

    /// The cumulative integral has no finite value to report
    #[error("flow integral has no finite value ({samples} samples)")]
    NoFiniteIntegral {
        /// Number of samples that were integrated
        samples: usize,
    },
}
