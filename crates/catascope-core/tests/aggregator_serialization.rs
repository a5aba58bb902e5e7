use catascope_core::{
    Aggregator, EntityClass, Iri, PropertyKey, PropertyObservation, ValueObservation,
    VocabularyObservation,
};

fn sample() -> Aggregator {
    let catalog = Iri::new("http://data.example.org/catalog/main");
    let mut aggregator = Aggregator::new();

    aggregator
        .record_compliance(
            &catalog,
            PropertyKey::new(
                Iri::new("http://purl.org/dc/terms/title"),
                EntityClass::Dataset,
            ),
            PropertyObservation::new(2, 2),
        )
        .unwrap();
    aggregator
        .record_compliance(
            &catalog,
            PropertyKey::new(
                Iri::new("http://purl.org/dc/terms/created"),
                EntityClass::Record,
            ),
            PropertyObservation::NOT_APPLICABLE,
        )
        .unwrap();
    aggregator
        .record_vocabulary(
            &catalog,
            PropertyKey::new(
                Iri::new("http://purl.org/dc/terms/format"),
                EntityClass::Distribution,
            ),
            VocabularyObservation::from_counts(
                3,
                3,
                vec![
                    ValueObservation::new("http://publications.europa.eu/resource/authority/file-type/CSV", 2),
                    ValueObservation::new("http://publications.europa.eu/resource/authority/file-type/JSON", 1),
                ],
            ),
        )
        .unwrap();

    aggregator
}

#[test]
fn round_trips_through_json() {
    let aggregator = sample();
    let json = serde_json::to_string_pretty(&aggregator).expect("serialize aggregator");
    let restored: Aggregator = serde_json::from_str(&json).expect("deserialize aggregator");

    let catalog = Iri::new("http://data.example.org/catalog/main");
    assert_eq!(
        restored.compliance_for(&catalog).map(|slots| slots.len()),
        Some(2)
    );
    assert_eq!(
        restored.vocabulary_for(&catalog).map(|slots| slots.len()),
        Some(1)
    );
}

#[test]
fn property_keys_serialize_in_display_form() {
    let aggregator = sample();
    let json = serde_json::to_value(&aggregator).expect("serialize aggregator");

    let slots = &json["compliance"]["http://data.example.org/catalog/main"];
    assert!(slots.get("http://purl.org/dc/terms/title (Dataset)").is_some());
    assert!(slots.get("http://purl.org/dc/terms/created (Record)").is_some());
}

#[test]
fn sentinel_observation_survives_serialization() {
    let aggregator = sample();
    let json = serde_json::to_string(&aggregator).expect("serialize aggregator");
    let restored: Aggregator = serde_json::from_str(&json).expect("deserialize aggregator");

    let catalog = Iri::new("http://data.example.org/catalog/main");
    let observation = restored
        .compliance_for(&catalog)
        .unwrap()
        .get(&PropertyKey::new(
            Iri::new("http://purl.org/dc/terms/created"),
            EntityClass::Record,
        ))
        .copied()
        .unwrap();
    assert_eq!(observation, PropertyObservation::NOT_APPLICABLE);
    assert!(!observation.is_applicable());
}
