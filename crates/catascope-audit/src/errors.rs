use thiserror::Error;

/// Errors emitted by the audit engine.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Discovery returned no catalogs, or could not run at all. The
    /// run ends cleanly with nothing to analyze.
    #[error("no catalogs found")]
    NoCatalogs,
    #[error(transparent)]
    Core(#[from] catascope_core::Error),
    #[error("analysis task failed: {0}")]
    Join(String),
}
