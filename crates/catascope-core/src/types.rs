use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::vocab;

/// Opaque identifier (URI) for an entity or a property.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Iri(pub String);

impl Iri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fragment or last path segment, used for compact display.
    pub fn short_name(&self) -> &str {
        let tail = match self.0.rsplit_once('#') {
            Some((_, fragment)) if !fragment.is_empty() => fragment,
            _ => self.0.rsplit('/').next().unwrap_or(&self.0),
        };
        if tail.is_empty() { &self.0 } else { tail }
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Categorical role of an entity within a catalog, selecting both the
/// profile tier lists and the relevant entity-reference set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Catalog,
    Dataset,
    Distribution,
    Record,
}

impl EntityClass {
    pub const ALL: [EntityClass; 4] = [
        EntityClass::Catalog,
        EntityClass::Dataset,
        EntityClass::Distribution,
        EntityClass::Record,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityClass::Catalog => "Catalog",
            EntityClass::Dataset => "Dataset",
            EntityClass::Distribution => "Distribution",
            EntityClass::Record => "Record",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Catalog" => Some(EntityClass::Catalog),
            "Dataset" => Some(EntityClass::Dataset),
            "Distribution" => Some(EntityClass::Distribution),
            "Record" => Some(EntityClass::Record),
            _ => None,
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregator key: a property paired with the class it was checked
/// against. Two classes sharing a property identifier never collide.
///
/// Serialized as `"<property> (<Class>)"` so result artifacts stay
/// readable as flat maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey {
    pub property: Iri,
    pub class: EntityClass,
}

impl PropertyKey {
    pub fn new(property: Iri, class: EntityClass) -> Self {
        Self { property, class }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.property, self.class)
    }
}

impl FromStr for PropertyKey {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (property, rest) = text
            .rsplit_once(" (")
            .ok_or_else(|| format!("malformed property key: {text}"))?;
        let label = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("malformed property key: {text}"))?;
        let class = EntityClass::from_label(label)
            .ok_or_else(|| format!("unknown entity class in property key: {label}"))?;
        Ok(PropertyKey::new(Iri::new(property), class))
    }
}

impl Serialize for PropertyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

impl JsonSchema for PropertyKey {
    fn schema_name() -> String {
        "PropertyKey".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

/// Presence counts for one property over one catalog's entity set.
///
/// `total_entities == 0` is the not-applicable sentinel: the catalog
/// has no entities of the class, which is distinct from an applicable
/// property that no entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyObservation {
    pub entities_with_property: u64,
    pub total_entities: u64,
}

impl PropertyObservation {
    /// Sentinel for a property check with no applicable entities.
    pub const NOT_APPLICABLE: PropertyObservation = PropertyObservation {
        entities_with_property: 0,
        total_entities: 0,
    };

    pub fn new(entities_with_property: u64, total_entities: u64) -> Self {
        Self {
            entities_with_property,
            total_entities,
        }
    }

    pub fn is_applicable(&self) -> bool {
        self.total_entities > 0
    }

    /// Presence rate, or `None` when no entities of the class exist.
    pub fn rate(&self) -> Option<f64> {
        if self.total_entities == 0 {
            None
        } else {
            Some(self.entities_with_property as f64 / self.total_entities as f64)
        }
    }
}

/// One distinct value taken by a property, with the number of entities
/// using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValueObservation {
    pub value: String,
    pub usage_count: u64,
}

impl ValueObservation {
    pub fn new(value: impl Into<String>, usage_count: u64) -> Self {
        Self {
            value: value.into(),
            usage_count,
        }
    }
}

/// Display-only refinement of a vocabulary classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    /// Controlled and predominantly URI-shaped values.
    Codelist,
    /// Controlled, non-URI values such as enumerated literals.
    Controlled,
    FreeText,
}

impl VocabularyKind {
    pub fn label(&self) -> &'static str {
        match self {
            VocabularyKind::Codelist => "Codelist",
            VocabularyKind::Controlled => "Controlled",
            VocabularyKind::FreeText => "Free text",
        }
    }
}

/// Value distribution for one property over one catalog's entity set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VocabularyObservation {
    pub total_entities: u64,
    /// Distinct entities with at least one value; may differ from the
    /// sum of usage counts when an entity holds multiple values.
    pub entities_with_property: u64,
    /// Distinct values ordered by descending usage, ties by value.
    pub values: Vec<ValueObservation>,
    pub unique_value_count: u64,
    pub controlled: bool,
}

impl VocabularyObservation {
    /// Build an observation from raw per-value counts: sorts the
    /// values deterministically and applies the classification rule.
    pub fn from_counts(
        total_entities: u64,
        entities_with_property: u64,
        mut values: Vec<ValueObservation>,
    ) -> Self {
        vocab::sort_values(&mut values);
        let controlled = vocab::classify_values(&values);
        Self {
            total_entities,
            entities_with_property,
            unique_value_count: values.len() as u64,
            values,
            controlled,
        }
    }

    /// Derived display label; the codelist refinement is never stored.
    pub fn kind(&self) -> VocabularyKind {
        vocab::vocabulary_kind(self.controlled, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_prefers_fragment_over_path() {
        assert_eq!(
            Iri::new("http://www.w3.org/ns/dcat#theme").short_name(),
            "theme"
        );
        assert_eq!(
            Iri::new("http://purl.org/dc/terms/title").short_name(),
            "title"
        );
    }

    #[test]
    fn property_key_round_trips_through_display_form() {
        let key = PropertyKey::new(
            Iri::new("http://purl.org/dc/terms/title"),
            EntityClass::Dataset,
        );
        let text = key.to_string();
        assert_eq!(text, "http://purl.org/dc/terms/title (Dataset)");
        let parsed: PropertyKey = text.parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn property_key_rejects_unknown_class() {
        assert!("http://example.org/p (Widget)".parse::<PropertyKey>().is_err());
        assert!("no-class-suffix".parse::<PropertyKey>().is_err());
    }

    #[test]
    fn not_applicable_sentinel_has_no_rate() {
        assert_eq!(PropertyObservation::NOT_APPLICABLE.rate(), None);
        assert!(!PropertyObservation::NOT_APPLICABLE.is_applicable());

        let absent = PropertyObservation::new(0, 5);
        assert!(absent.is_applicable());
        assert_eq!(absent.rate(), Some(0.0));
    }

    #[test]
    fn from_counts_sorts_and_counts_values() {
        let observation = VocabularyObservation::from_counts(
            10,
            9,
            vec![
                ValueObservation::new("b", 2),
                ValueObservation::new("a", 7),
                ValueObservation::new("c", 2),
            ],
        );
        let ordered: Vec<&str> = observation
            .values
            .iter()
            .map(|entry| entry.value.as_str())
            .collect();
        assert_eq!(ordered, ["a", "b", "c"]);
        assert_eq!(observation.unique_value_count, 3);
        assert!(observation.controlled);
    }
}
