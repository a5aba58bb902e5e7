use std::collections::BTreeMap;

use async_trait::async_trait;

use catascope_core::Result;

/// A single term bound to a result variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Iri(String),
    Literal(String),
}

impl Term {
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(value) | Term::Literal(value) => value,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

/// One result row: variable name to bound term. Unbound variables are
/// simply absent.
pub type Row = BTreeMap<String, Term>;

/// Ordered rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Integer bound to `var` in the first row, for aggregate queries.
    /// `None` when the row or binding is missing or not numeric.
    pub fn single_count(&self, var: &str) -> Option<u64> {
        self.rows
            .first()
            .and_then(|row| row.get(var))
            .and_then(|term| term.value().parse().ok())
    }
}

/// Trait implemented by endpoints that can execute SPARQL queries.
///
/// Failures are returned as values; implementations must never panic
/// on endpoint conditions.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn execute(&self, query: &str) -> Result<ResultSet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_count_parses_first_binding() {
        let mut row = Row::new();
        row.insert("count".to_string(), Term::Literal("42".to_string()));
        let result = ResultSet::new(vec![row]);
        assert_eq!(result.single_count("count"), Some(42));
        assert_eq!(result.single_count("missing"), None);
    }

    #[test]
    fn single_count_rejects_non_numeric_terms() {
        let mut row = Row::new();
        row.insert("count".to_string(), Term::Literal("many".to_string()));
        let result = ResultSet::new(vec![row]);
        assert_eq!(result.single_count("count"), None);
        assert_eq!(ResultSet::default().single_count("count"), None);
    }
}
