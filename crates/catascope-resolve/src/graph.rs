use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use catascope_core::{EntityClass, Iri, Result};

use crate::client::QueryClient;
use crate::queries;

/// Entity-reference sets reachable from one catalog. Edges, not
/// containment: subordinate entities are held by identifier. A set
/// with zero members is a valid, fully resolved state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySets {
    pub catalogs: BTreeSet<Iri>,
    pub datasets: BTreeSet<Iri>,
    pub distributions: BTreeSet<Iri>,
    pub records: BTreeSet<Iri>,
}

impl EntitySets {
    fn seeded(catalog: &Iri) -> Self {
        let mut sets = Self::default();
        sets.catalogs.insert(catalog.clone());
        sets
    }

    /// The reference set relevant to an entity class.
    pub fn for_class(&self, class: EntityClass) -> &BTreeSet<Iri> {
        match class {
            EntityClass::Catalog => &self.catalogs,
            EntityClass::Dataset => &self.datasets,
            EntityClass::Distribution => &self.distributions,
            EntityClass::Record => &self.records,
        }
    }
}

/// Warning recorded when a per-catalog query failed and the affected
/// set was left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveWarning {
    pub catalog: Iri,
    pub message: String,
}

/// The entity graph, resolved once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogGraph {
    pub catalogs: BTreeMap<Iri, EntitySets>,
    pub warnings: Vec<ResolveWarning>,
}

impl CatalogGraph {
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    pub fn entities(&self, catalog: &Iri, class: EntityClass) -> Option<&BTreeSet<Iri>> {
        self.catalogs.get(catalog).map(|sets| sets.for_class(class))
    }
}

/// Discover all catalogs and resolve each one's subordinate entity
/// sets.
///
/// A failed discovery query is fatal and yields the error. A failed
/// per-catalog query leaves that catalog's affected set empty,
/// records a warning, and resolution continues for the rest.
pub async fn resolve(client: &dyn QueryClient) -> Result<CatalogGraph> {
    let discovered = client.execute(&queries::catalogs()).await?;

    let mut graph = CatalogGraph::default();
    for row in &discovered.rows {
        let Some(term) = row.get("catalog") else {
            continue;
        };
        let catalog = Iri::new(term.value());
        graph
            .catalogs
            .entry(catalog.clone())
            .or_insert_with(|| EntitySets::seeded(&catalog));
    }
    debug!(catalogs = graph.catalogs.len(), "discovered catalogs");

    let ids: Vec<Iri> = graph.catalogs.keys().cloned().collect();
    for catalog in ids {
        resolve_datasets(client, &catalog, &mut graph).await;
        resolve_records(client, &catalog, &mut graph).await;
    }

    Ok(graph)
}

async fn resolve_datasets(client: &dyn QueryClient, catalog: &Iri, graph: &mut CatalogGraph) {
    let result = match client
        .execute(&queries::datasets_with_distributions(catalog))
        .await
    {
        Ok(result) => result,
        Err(err) => {
            warn!(catalog = %catalog, error = %err, "dataset resolution failed; sets left empty");
            graph.warnings.push(ResolveWarning {
                catalog: catalog.clone(),
                message: format!("dataset resolution failed: {err}"),
            });
            return;
        }
    };

    let Some(sets) = graph.catalogs.get_mut(catalog) else {
        return;
    };
    for row in &result.rows {
        if let Some(dataset) = row.get("dataset") {
            sets.datasets.insert(Iri::new(dataset.value()));
        }
        if let Some(distribution) = row.get("distribution") {
            sets.distributions.insert(Iri::new(distribution.value()));
        }
    }
}

async fn resolve_records(client: &dyn QueryClient, catalog: &Iri, graph: &mut CatalogGraph) {
    let result = match client.execute(&queries::records(catalog)).await {
        Ok(result) => result,
        Err(err) => {
            warn!(catalog = %catalog, error = %err, "record resolution failed; set left empty");
            graph.warnings.push(ResolveWarning {
                catalog: catalog.clone(),
                message: format!("record resolution failed: {err}"),
            });
            return;
        }
    };

    let Some(sets) = graph.catalogs.get_mut(catalog) else {
        return;
    };
    for row in &result.rows {
        if let Some(record) = row.get("record") {
            sets.records.insert(Iri::new(record.value()));
        }
    }
}
