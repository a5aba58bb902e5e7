use std::collections::BTreeMap;

use tracing::{debug, warn};

use catascope_core::{EntityClass, Iri, PropertyObservation};
use catascope_resolve::{CatalogGraph, QueryClient, queries};

/// Measure, per catalog, how many entities of `class` carry at least
/// one value for `property`.
///
/// Catalogs with no entities of the class receive the not-applicable
/// sentinel without issuing a query. A failed or malformed count query
/// yields zero presence for that catalog alone; other catalogs are
/// unaffected.
pub async fn evaluate_property(
    client: &dyn QueryClient,
    property: &Iri,
    class: EntityClass,
    graph: &CatalogGraph,
) -> BTreeMap<Iri, PropertyObservation> {
    let mut observations = BTreeMap::new();

    for (catalog, sets) in &graph.catalogs {
        let entities = sets.for_class(class);
        if entities.is_empty() {
            observations.insert(catalog.clone(), PropertyObservation::NOT_APPLICABLE);
            continue;
        }

        let total = entities.len() as u64;
        let present = match client
            .execute(&queries::presence_count(entities, property))
            .await
        {
            Ok(result) => match result.single_count("count") {
                // An endpoint cannot report more carriers than the
                // enumerated set holds; clamp rather than propagate.
                Some(count) => count.min(total),
                None => {
                    warn!(
                        catalog = %catalog,
                        property = %property,
                        "count missing from result; treating presence as unknown"
                    );
                    0
                }
            },
            Err(err) => {
                warn!(
                    catalog = %catalog,
                    property = %property,
                    error = %err,
                    "presence query failed; treating presence as unknown"
                );
                0
            }
        };

        debug!(catalog = %catalog, property = %property, class = %class, present, total, "evaluated property");
        observations.insert(catalog.clone(), PropertyObservation::new(present, total));
    }

    observations
}
