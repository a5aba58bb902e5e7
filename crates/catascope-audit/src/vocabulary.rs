use std::collections::BTreeMap;

use tracing::warn;

use catascope_core::{EntityClass, Iri, ValueObservation, VocabularyObservation};
use catascope_resolve::{CatalogGraph, QueryClient, ResultSet, queries};

/// Retrieve, per catalog, the distinct values of `property` across the
/// relevant entity set and classify the distribution.
///
/// Catalogs with an empty relevant set are skipped outright: "not
/// analyzed" here is distinct from the compliance sentinel, which
/// still records a not-applicable observation.
pub async fn classify_property(
    client: &dyn QueryClient,
    property: &Iri,
    class: EntityClass,
    graph: &CatalogGraph,
) -> BTreeMap<Iri, VocabularyObservation> {
    let mut observations = BTreeMap::new();

    for (catalog, sets) in &graph.catalogs {
        let entities = sets.for_class(class);
        if entities.is_empty() {
            continue;
        }

        let values = match client
            .execute(&queries::value_counts(entities, property))
            .await
        {
            Ok(result) => decode_values(&result, catalog, property),
            Err(err) => {
                warn!(
                    catalog = %catalog,
                    property = %property,
                    error = %err,
                    "value query failed; recording no values"
                );
                Vec::new()
            }
        };

        // Counted separately: one entity holding several values must
        // contribute once here, however many usage counts it adds.
        let entities_with_property = match client
            .execute(&queries::presence_count(entities, property))
            .await
        {
            Ok(result) => result.single_count("count").unwrap_or(0),
            Err(err) => {
                warn!(
                    catalog = %catalog,
                    property = %property,
                    error = %err,
                    "entity count query failed; recording zero"
                );
                0
            }
        };

        observations.insert(
            catalog.clone(),
            VocabularyObservation::from_counts(
                entities.len() as u64,
                entities_with_property.min(entities.len() as u64),
                values,
            ),
        );
    }

    observations
}

fn decode_values(result: &ResultSet, catalog: &Iri, property: &Iri) -> Vec<ValueObservation> {
    let mut values = Vec::with_capacity(result.rows.len());
    for row in &result.rows {
        let Some(value) = row.get("value") else {
            continue;
        };
        let count: u64 = row
            .get("count")
            .and_then(|term| term.value().parse().ok())
            .unwrap_or(0);
        if count == 0 {
            warn!(
                catalog = %catalog,
                property = %property,
                value = %value.value(),
                "dropping value row without a usable count"
            );
            continue;
        }
        values.push(ValueObservation::new(value.value(), count));
    }
    values
}
