use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use catascope_core::{
    Aggregator, EntityClass, Iri, Profile, PropertyKey, PropertyObservation, RESULTS_VERSION,
    VocabularyObservation, VocabularyPlan,
};
use catascope_resolve::{CatalogGraph, QueryClient, resolve};

use crate::compliance::evaluate_property;
use crate::errors::AuditError;
use crate::model::{AuditOptions, AuditResults, AuditWarning, PerformanceMetrics};
use crate::vocabulary::classify_property;

/// Orchestrates a full audit: one resolution pass, then compliance and
/// vocabulary analysis for every configured property.
#[derive(Debug, Clone, Default)]
pub struct AuditEngine {
    options: AuditOptions,
}

impl AuditEngine {
    pub fn new(options: AuditOptions) -> Self {
        Self { options }
    }

    /// Run the audit against a resolved endpoint.
    ///
    /// No property task starts before resolution completes. Property
    /// analyses fan out through a semaphore-bounded task pool and are
    /// merged back in profile order on the calling task, so the output
    /// is deterministic for an unchanged endpoint. A write-once
    /// violation during the merge aborts the remaining tasks and fails
    /// the run.
    pub async fn run(
        &self,
        client: Arc<dyn QueryClient>,
        profile: &Profile,
        plan: &VocabularyPlan,
    ) -> Result<AuditResults, AuditError> {
        profile.validate()?;
        plan.validate()?;

        let total_start = Instant::now();
        let graph = match resolve(client.as_ref()).await {
            Ok(graph) => graph,
            Err(err) => {
                warn!(error = %err, "catalog discovery failed");
                return Err(AuditError::NoCatalogs);
            }
        };
        if graph.is_empty() {
            return Err(AuditError::NoCatalogs);
        }
        let resolve_ms = total_start.elapsed().as_millis();
        info!(catalogs = graph.catalogs.len(), "resolved catalog graph");

        let warnings = graph
            .warnings
            .iter()
            .map(|warning| AuditWarning {
                catalog: warning.catalog.clone(),
                message: warning.message.clone(),
            })
            .collect();
        let catalog_count = graph.catalogs.len() as u64;

        let analyze_start = Instant::now();
        let graph = Arc::new(graph);
        let limiter = Arc::new(Semaphore::new(self.options.max_in_flight.max(1)));

        let mut compliance_tasks = Vec::new();
        for class in EntityClass::ALL {
            for (property, _tier) in profile.class(class).tiers() {
                compliance_tasks.push((
                    PropertyKey::new(property.clone(), class),
                    spawn_compliance(
                        Arc::clone(&client),
                        Arc::clone(&graph),
                        Arc::clone(&limiter),
                        property.clone(),
                        class,
                    ),
                ));
            }
        }

        let mut vocabulary_tasks = Vec::new();
        for class in EntityClass::ALL {
            for property in plan.class(class) {
                vocabulary_tasks.push((
                    PropertyKey::new(property.clone(), class),
                    spawn_vocabulary(
                        Arc::clone(&client),
                        Arc::clone(&graph),
                        Arc::clone(&limiter),
                        property.clone(),
                        class,
                    ),
                ));
            }
        }

        let mut aggregator = Aggregator::new();
        drain(compliance_tasks, |catalog, key, observation| {
            aggregator.record_compliance(catalog, key, observation)
        })
        .await?;
        drain(vocabulary_tasks, |catalog, key, observation| {
            aggregator.record_vocabulary(catalog, key, observation)
        })
        .await?;

        Ok(AuditResults {
            results_version: RESULTS_VERSION.to_string(),
            catalog_count,
            results: aggregator,
            warnings,
            performance: PerformanceMetrics {
                resolve_ms,
                analyze_ms: analyze_start.elapsed().as_millis(),
                total_ms: total_start.elapsed().as_millis(),
            },
        })
    }
}

fn spawn_compliance(
    client: Arc<dyn QueryClient>,
    graph: Arc<CatalogGraph>,
    limiter: Arc<Semaphore>,
    property: Iri,
    class: EntityClass,
) -> JoinHandle<BTreeMap<Iri, PropertyObservation>> {
    tokio::spawn(async move {
        let _permit = limiter.acquire_owned().await.ok();
        evaluate_property(client.as_ref(), &property, class, graph.as_ref()).await
    })
}

fn spawn_vocabulary(
    client: Arc<dyn QueryClient>,
    graph: Arc<CatalogGraph>,
    limiter: Arc<Semaphore>,
    property: Iri,
    class: EntityClass,
) -> JoinHandle<BTreeMap<Iri, VocabularyObservation>> {
    tokio::spawn(async move {
        let _permit = limiter.acquire_owned().await.ok();
        classify_property(client.as_ref(), &property, class, graph.as_ref()).await
    })
}

/// Await tasks in spawn order and record each observation. On any
/// failure the remaining tasks are aborted rather than awaited.
async fn drain<T>(
    tasks: Vec<(PropertyKey, JoinHandle<BTreeMap<Iri, T>>)>,
    mut record: impl FnMut(&Iri, PropertyKey, T) -> catascope_core::Result<()>,
) -> Result<(), AuditError> {
    let mut tasks = tasks.into_iter();
    while let Some((key, handle)) = tasks.next() {
        let observations = match handle.await {
            Ok(observations) => observations,
            Err(err) => {
                abort_rest(tasks);
                return Err(AuditError::Join(err.to_string()));
            }
        };
        for (catalog, observation) in observations {
            if let Err(err) = record(&catalog, key.clone(), observation) {
                abort_rest(tasks);
                return Err(err.into());
            }
        }
    }
    Ok(())
}

fn abort_rest<T>(tasks: impl Iterator<Item = (PropertyKey, JoinHandle<T>)>) {
    for (_, handle) in tasks {
        handle.abort();
    }
}
