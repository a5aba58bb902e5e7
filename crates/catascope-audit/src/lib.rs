//! Compliance and vocabulary analysis over a resolved catalog graph.

pub mod compliance;
pub mod engine;
pub mod errors;
pub mod model;
pub mod report;
pub mod vocabulary;

pub use compliance::evaluate_property;
pub use engine::AuditEngine;
pub use errors::AuditError;
pub use model::{AuditOptions, AuditResults, AuditWarning, PerformanceMetrics};
pub use report::{ComplianceBand, mandatory_average, render_report};
pub use vocabulary::classify_property;
