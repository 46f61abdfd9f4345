/// Errors that prevent breath metrics from being computed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BreathError {
    /// Time or flow series holds no samples
    #[error("time and flow series must not be empty")]
    EmptySeries,

    /// Time and flow series differ in length
    #[error("series length mismatch: time has {time_len} samples, flow has {flow_len}")]
    LengthMismatch {
        /// Length of the time series
        time_len: usize,
        /// Length of the flow series
        flow_len: usize,
    },

    /// Capture duration is zero, negative or not a number
    #[error("capture duration must be positive, got {0} s")]
    NonPositiveDuration(f64),

    /// A peak index points past the end of the time series
    #[error("peak index {index} out of range for series of length {len}")]
    PeakOutOfRange {
        /// Offending peak index
        index: usize,
        /// Length of the time series
        len: usize,
    },
}
