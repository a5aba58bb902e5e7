//! SPARQL endpoint access and entity-graph resolution.

pub mod client;
pub mod graph;
pub mod http;
pub mod queries;

pub use client::{QueryClient, ResultSet, Row, Term};
pub use graph::{CatalogGraph, EntitySets, ResolveWarning, resolve};
pub use http::{ClientOptions, SparqlHttpClient};
