use thiserror::Error;

/// Core error type shared across Catascope crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint was unreachable, rejected the query, or returned a
    /// response missing expected fields.
    #[error("transport error: {0}")]
    Transport(String),
    /// A result was recorded twice for the same (property, class) key.
    /// Always an internal resolution bug, never an endpoint condition.
    #[error("aggregator conflict: {0}")]
    Conflict(String),
    /// The property profile or vocabulary plan is malformed.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by Catascope crates.
pub type Result<T> = std::result::Result<T, Error>;
