//! SPARQL query text for resolution and analysis.
//!
//! Entity restrictions are always explicit `VALUES` enumerations of a
//! previously resolved set, never wildcards over the store.

use std::collections::BTreeSet;

use catascope_core::Iri;

const DCAT_PREFIX: &str = "PREFIX dcat: <http://www.w3.org/ns/dcat#>";

/// All entities typed as a catalog.
pub fn catalogs() -> String {
    format!(
        "{DCAT_PREFIX}\n\
         SELECT DISTINCT ?catalog WHERE {{\n\
         \x20 ?catalog a dcat:Catalog .\n\
         }}"
    )
}

/// Datasets linked from a catalog via either of the two link shapes in
/// the wild (`dcat:dataset` and the class-named `dcat:Dataset` form),
/// with each dataset's distributions joined optionally.
pub fn datasets_with_distributions(catalog: &Iri) -> String {
    format!(
        "{DCAT_PREFIX}\n\
         SELECT DISTINCT ?dataset ?distribution WHERE {{\n\
         \x20 <{catalog}> a dcat:Catalog .\n\
         \x20 {{\n\
         \x20   <{catalog}> dcat:dataset ?dataset .\n\
         \x20 }} UNION {{\n\
         \x20   <{catalog}> dcat:Dataset ?dataset .\n\
         \x20 }}\n\
         \x20 ?dataset a dcat:Dataset .\n\
         \x20 OPTIONAL {{\n\
         \x20   ?dataset dcat:distribution ?distribution .\n\
         \x20   ?distribution a dcat:Distribution .\n\
         \x20 }}\n\
         }}"
    )
}

/// Catalog records linked from a catalog, filtered to the record class.
pub fn records(catalog: &Iri) -> String {
    format!(
        "{DCAT_PREFIX}\n\
         SELECT DISTINCT ?record WHERE {{\n\
         \x20 <{catalog}> dcat:record ?record .\n\
         \x20 ?record a dcat:CatalogRecord .\n\
         }}"
    )
}

/// Count of entities, among an enumerated set, carrying at least one
/// value for a property.
pub fn presence_count(entities: &BTreeSet<Iri>, property: &Iri) -> String {
    format!(
        "SELECT (COUNT(DISTINCT ?entity) AS ?count) WHERE {{\n\
         \x20 {}\n\
         \x20 ?entity <{property}> ?value .\n\
         }}",
        values_clause(entities)
    )
}

/// Distinct values of a property among an enumerated set, with usage
/// counts, most used first.
pub fn value_counts(entities: &BTreeSet<Iri>, property: &Iri) -> String {
    format!(
        "SELECT ?value (COUNT(?entity) AS ?count) WHERE {{\n\
         \x20 {}\n\
         \x20 ?entity <{property}> ?value .\n\
         }}\n\
         GROUP BY ?value\n\
         ORDER BY DESC(?count)",
        values_clause(entities)
    )
}

fn values_clause(entities: &BTreeSet<Iri>) -> String {
    let members = entities
        .iter()
        .map(|entity| format!("<{entity}>"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("VALUES ?entity {{ {members} }}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_count_enumerates_the_exact_entity_set() {
        let entities: BTreeSet<Iri> = [Iri::new("http://d/1"), Iri::new("http://d/2")]
            .into_iter()
            .collect();
        let query = presence_count(&entities, &Iri::new("http://purl.org/dc/terms/title"));

        assert!(query.contains("VALUES ?entity { <http://d/1> <http://d/2> }"));
        assert!(query.contains("COUNT(DISTINCT ?entity)"));
        assert!(query.contains("<http://purl.org/dc/terms/title>"));
    }

    #[test]
    fn value_counts_groups_and_orders_by_usage() {
        let entities: BTreeSet<Iri> = [Iri::new("http://d/1")].into_iter().collect();
        let query = value_counts(&entities, &Iri::new("http://purl.org/dc/terms/format"));

        assert!(query.contains("GROUP BY ?value"));
        assert!(query.contains("ORDER BY DESC(?count)"));
    }

    #[test]
    fn dataset_query_unions_both_link_shapes() {
        let query = datasets_with_distributions(&Iri::new("http://example.org/cat"));
        assert!(query.contains("dcat:dataset ?dataset"));
        assert!(query.contains("dcat:Dataset ?dataset"));
        assert!(query.contains("OPTIONAL"));
    }
}
