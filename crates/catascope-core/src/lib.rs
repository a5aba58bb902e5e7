//! Core contracts and helpers for Catascope.
//!
//! This crate defines the entity model, the injected property profile,
//! the controlled-vocabulary decision rule, and the write-once result
//! aggregator shared across the resolver, the audit engine, and the
//! CLI.

pub mod aggregator;
pub mod error;
pub mod profile;
pub mod types;
pub mod vocab;

pub use aggregator::Aggregator;
pub use error::{Error, Result};
pub use profile::{ClassProperties, Profile, RequirementTier, VocabularyPlan};
pub use types::{
    EntityClass, Iri, PropertyKey, PropertyObservation, ValueObservation, VocabularyKind,
    VocabularyObservation,
};
pub use vocab::{classify_values, is_uri_shaped};

/// Current contract version for `results.json` artifacts.
pub const RESULTS_VERSION: &str = "0.1";
