//! Errors reported by host capabilities.
//!
//! None of these are fatal: the orchestrator treats every variant as
//! "skip this frame" and tries again on the next display refresh.

/// Result type alias for host capability calls.
pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// Analysis graph not connected yet, or suspended
    #[error("audio analysis is not available")]
    AnalysisUnavailable,

    /// Media element gone or not ready to play
    #[error("media playback is not available: {0}")]
    PlaybackUnavailable(String),

    /// Caller handed in a buffer that does not match the bin count
    #[error("magnitude buffer holds {got} bins, analysis produces {expected}")]
    BufferSize { expected: usize, got: usize },
}
