//! Controlled-vocabulary decision rule.
//!
//! A heuristic over observed value distributions, not a registry
//! lookup: it tolerates false positives and negatives and is not a
//! validation rule.

use crate::types::{ValueObservation, VocabularyKind};

/// Distinct-value count at or below which a set is treated as closed.
const SMALL_SET_MAX: usize = 5;
/// Usage share the top five values must exceed for a dominant core.
const DOMINANT_CORE_SHARE: f64 = 0.8;
/// URI-shaped share above which a value set reads as identifier-based.
const URI_SHARE_CONTROLLED: f64 = 0.7;
/// URI-shaped share above which a controlled property is a codelist.
const URI_SHARE_CODELIST: f64 = 0.5;

/// Lexical check for a URI scheme prefix (`scheme:` per RFC 3986),
/// without parsing the remainder. Whitespace disqualifies a value.
pub fn is_uri_shaped(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Order values by descending usage, ties broken by ascending value.
pub fn sort_values(values: &mut [ValueObservation]) {
    values.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.value.cmp(&b.value))
    });
}

/// Decide whether an observed value distribution behaves as a
/// controlled vocabulary. `values` must already be sorted by
/// descending usage. First matching rule wins:
///
/// 1. no values: not controlled
/// 2. five or fewer distinct values: controlled
/// 3. top five values above 80% of total usage: controlled
/// 4. more than 70% of distinct values URI-shaped: controlled
/// 5. otherwise: free text
pub fn classify_values(values: &[ValueObservation]) -> bool {
    if values.is_empty() {
        return false;
    }
    if values.len() <= SMALL_SET_MAX {
        return true;
    }

    let total_usage: u64 = values.iter().map(|entry| entry.usage_count).sum();
    let core_usage: u64 = values
        .iter()
        .take(SMALL_SET_MAX)
        .map(|entry| entry.usage_count)
        .sum();
    if total_usage > 0 && core_usage as f64 / total_usage as f64 > DOMINANT_CORE_SHARE {
        return true;
    }

    uri_share(values) > URI_SHARE_CONTROLLED
}

/// Display label for a classified property. The codelist refinement is
/// derived wherever shown, never stored.
pub fn vocabulary_kind(controlled: bool, values: &[ValueObservation]) -> VocabularyKind {
    if !controlled {
        return VocabularyKind::FreeText;
    }
    if !values.is_empty() && uri_share(values) > URI_SHARE_CODELIST {
        VocabularyKind::Codelist
    } else {
        VocabularyKind::Controlled
    }
}

fn uri_share(values: &[ValueObservation]) -> f64 {
    let uri_count = values
        .iter()
        .filter(|entry| is_uri_shaped(&entry.value))
        .count();
    uri_count as f64 / values.len() as f64
}
