use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use catascope_core::{Aggregator, Iri};

/// Options controlling an audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOptions {
    /// Maximum number of property analyses with queries in flight.
    pub max_in_flight: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

/// Machine-readable audit artifact: the aggregator plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditResults {
    pub results_version: String,
    pub catalog_count: u64,
    pub results: Aggregator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
    pub performance: PerformanceMetrics,
}

/// Recovered failure surfaced to the report, scoped to one catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditWarning {
    pub catalog: Iri,
    pub message: String,
}

/// Wall-clock timings for the audit phases.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceMetrics {
    pub resolve_ms: u128,
    pub analyze_ms: u128,
    pub total_ms: u128,
}
