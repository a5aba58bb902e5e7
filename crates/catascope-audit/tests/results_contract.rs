use catascope_audit::{AuditResults, AuditWarning, PerformanceMetrics};
use catascope_core::{
    Aggregator, EntityClass, Iri, PropertyKey, PropertyObservation, ValueObservation,
    VocabularyObservation,
};
use jsonschema::JSONSchema;
use schemars::schema_for;

fn sample_results() -> AuditResults {
    let catalog = Iri::new("http://data.example.org/catalog/1");
    let mut aggregator = Aggregator::new();
    aggregator
        .record_compliance(
            &catalog,
            PropertyKey::new(Iri::new("http://purl.org/dc/terms/title"), EntityClass::Dataset),
            PropertyObservation::new(2, 2),
        )
        .unwrap();
    aggregator
        .record_vocabulary(
            &catalog,
            PropertyKey::new(Iri::new("http://purl.org/dc/terms/format"), EntityClass::Distribution),
            VocabularyObservation::from_counts(
                1,
                1,
                vec![ValueObservation::new("http://codes.example/csv", 1)],
            ),
        )
        .unwrap();

    AuditResults {
        results_version: catascope_core::RESULTS_VERSION.to_string(),
        catalog_count: 1,
        results: aggregator,
        warnings: vec![AuditWarning {
            catalog: catalog.clone(),
            message: "record resolution failed: endpoint timed out".to_string(),
        }],
        performance: PerformanceMetrics {
            resolve_ms: 12,
            analyze_ms: 34,
            total_ms: 46,
        },
    }
}

#[test]
fn results_artifact_matches_its_json_schema() {
    let generated = schema_for!(AuditResults);
    let schema = serde_json::to_value(&generated).expect("serialize generated schema");
    let compiled = JSONSchema::compile(&schema).expect("compile schema");

    let instance = serde_json::to_value(sample_results()).expect("serialize results");
    assert!(compiled.is_valid(&instance));
}

#[test]
fn results_artifact_round_trips() {
    let results = sample_results();
    let json = serde_json::to_string(&results).expect("serialize results");
    let restored: AuditResults = serde_json::from_str(&json).expect("deserialize results");

    assert_eq!(restored.catalog_count, 1);
    assert_eq!(restored.warnings.len(), 1);
    assert_eq!(
        serde_json::to_value(&restored.results).unwrap(),
        serde_json::to_value(&results.results).unwrap()
    );
}
