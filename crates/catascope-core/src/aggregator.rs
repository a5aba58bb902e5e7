use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Iri, PropertyKey, PropertyObservation, VocabularyObservation};

/// Run-scoped accumulation of audit results, keyed per catalog and per
/// (property, class).
///
/// Both maps are write-once: each key is written exactly once per run,
/// and a second write is rejected as [`Error::Conflict`] rather than
/// silently overwriting. Keys always carry the entity class, so two
/// classes sharing a property identifier occupy distinct slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Aggregator {
    pub compliance: BTreeMap<Iri, BTreeMap<PropertyKey, PropertyObservation>>,
    pub vocabulary: BTreeMap<Iri, BTreeMap<PropertyKey, VocabularyObservation>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a compliance observation; fails on an occupied key.
    pub fn record_compliance(
        &mut self,
        catalog: &Iri,
        key: PropertyKey,
        observation: PropertyObservation,
    ) -> Result<()> {
        match self.compliance.entry(catalog.clone()).or_default().entry(key) {
            Entry::Occupied(slot) => Err(Error::Conflict(format!(
                "compliance result already recorded for {} in {catalog}",
                slot.key()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(observation);
                Ok(())
            }
        }
    }

    /// Record a vocabulary observation; fails on an occupied key.
    pub fn record_vocabulary(
        &mut self,
        catalog: &Iri,
        key: PropertyKey,
        observation: VocabularyObservation,
    ) -> Result<()> {
        match self.vocabulary.entry(catalog.clone()).or_default().entry(key) {
            Entry::Occupied(slot) => Err(Error::Conflict(format!(
                "vocabulary result already recorded for {} in {catalog}",
                slot.key()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(observation);
                Ok(())
            }
        }
    }

    /// Catalogs with at least one recorded observation, in order.
    pub fn catalogs(&self) -> Vec<&Iri> {
        let mut catalogs: Vec<&Iri> = self.compliance.keys().collect();
        for catalog in self.vocabulary.keys() {
            if !self.compliance.contains_key(catalog) {
                catalogs.push(catalog);
            }
        }
        catalogs.sort();
        catalogs
    }

    pub fn compliance_for(
        &self,
        catalog: &Iri,
    ) -> Option<&BTreeMap<PropertyKey, PropertyObservation>> {
        self.compliance.get(catalog)
    }

    pub fn vocabulary_for(
        &self,
        catalog: &Iri,
    ) -> Option<&BTreeMap<PropertyKey, VocabularyObservation>> {
        self.vocabulary.get(catalog)
    }

    pub fn is_empty(&self) -> bool {
        self.compliance.is_empty() && self.vocabulary.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityClass;

    fn key(property: &str, class: EntityClass) -> PropertyKey {
        PropertyKey::new(Iri::new(property), class)
    }

    #[test]
    fn second_write_to_same_key_is_a_conflict() {
        let catalog = Iri::new("http://example.org/catalog");
        let mut aggregator = Aggregator::new();

        aggregator
            .record_compliance(
                &catalog,
                key("http://purl.org/dc/terms/title", EntityClass::Dataset),
                PropertyObservation::new(1, 2),
            )
            .unwrap();

        let err = aggregator
            .record_compliance(
                &catalog,
                key("http://purl.org/dc/terms/title", EntityClass::Dataset),
                PropertyObservation::new(2, 2),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // The original observation survives.
        let stored = aggregator
            .compliance_for(&catalog)
            .unwrap()
            .get(&key("http://purl.org/dc/terms/title", EntityClass::Dataset))
            .unwrap();
        assert_eq!(stored.entities_with_property, 1);
    }

    #[test]
    fn same_property_under_two_classes_does_not_collide() {
        let catalog = Iri::new("http://example.org/catalog");
        let mut aggregator = Aggregator::new();
        let property = "http://purl.org/dc/terms/publisher";

        aggregator
            .record_compliance(
                &catalog,
                key(property, EntityClass::Catalog),
                PropertyObservation::new(1, 1),
            )
            .unwrap();
        aggregator
            .record_compliance(
                &catalog,
                key(property, EntityClass::Dataset),
                PropertyObservation::new(0, 3),
            )
            .unwrap();

        assert_eq!(aggregator.compliance_for(&catalog).unwrap().len(), 2);
    }

    #[test]
    fn compliance_and_vocabulary_slots_are_independent() {
        let catalog = Iri::new("http://example.org/catalog");
        let mut aggregator = Aggregator::new();
        let shared = key("http://purl.org/dc/terms/format", EntityClass::Distribution);

        aggregator
            .record_compliance(&catalog, shared.clone(), PropertyObservation::new(2, 2))
            .unwrap();
        aggregator
            .record_vocabulary(
                &catalog,
                shared,
                VocabularyObservation::from_counts(2, 2, Vec::new()),
            )
            .unwrap();

        assert_eq!(aggregator.catalogs(), vec![&catalog]);
    }
}
