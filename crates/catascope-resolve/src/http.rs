use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use catascope_core::{Error, Result};

use crate::client::{QueryClient, ResultSet, Row, Term};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Options controlling the HTTP SPARQL client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: String,
    /// Per-query timeout; an expired timeout is a transport failure,
    /// never an indefinite wait.
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("catascope/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// SPARQL protocol client speaking HTTP POST with form-encoded queries
/// and JSON results.
#[derive(Debug, Clone)]
pub struct SparqlHttpClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlHttpClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|err| Error::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: options.endpoint.clone(),
        })
    }
}

#[async_trait]
impl QueryClient for SparqlHttpClient {
    async fn execute(&self, query: &str) -> Result<ResultSet> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| Error::Transport(err.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        parse_results(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<BTreeMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

/// Decode a `application/sparql-results+json` document. Responses
/// missing expected fields are transport failures, per the caller's
/// recovery rules.
pub(crate) fn parse_results(body: &str) -> Result<ResultSet> {
    let response: SparqlResponse = serde_json::from_str(body)
        .map_err(|err| Error::Transport(format!("malformed result document: {err}")))?;

    let rows = response
        .results
        .bindings
        .into_iter()
        .map(|binding| {
            binding
                .into_iter()
                .map(|(var, term)| {
                    let term = match term.kind.as_str() {
                        "uri" => Term::Iri(term.value),
                        _ => Term::Literal(term.value),
                    };
                    (var, term)
                })
                .collect::<Row>()
        })
        .collect();

    Ok(ResultSet::new(rows))
}
