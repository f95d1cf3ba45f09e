//! Error types for the turn-check subsystem.

/// Top-level error type for turn polling and scheduling.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// Remote game-state fetch error.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Cycle state persistence error.
    #[error("state error: {0}")]
    State(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TurnError>;
