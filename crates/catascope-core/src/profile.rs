use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::types::{EntityClass, Iri};

/// Requirement tier of a property within the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequirementTier {
    Mandatory,
    Recommended,
    Optional,
}

impl RequirementTier {
    /// Single-letter marker used in rendered tables.
    pub fn marker(&self) -> &'static str {
        match self {
            RequirementTier::Mandatory => "M",
            RequirementTier::Recommended => "R",
            RequirementTier::Optional => "O",
        }
    }
}

/// Tiered property lists for one entity class. The `recommended` tier
/// may be absent in configuration and is treated as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClassProperties {
    #[serde(default)]
    pub mandatory: Vec<Iri>,
    #[serde(default)]
    pub recommended: Vec<Iri>,
    #[serde(default)]
    pub optional: Vec<Iri>,
}

impl ClassProperties {
    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.recommended.is_empty() && self.optional.is_empty()
    }

    /// Properties in report order: mandatory, recommended, optional.
    pub fn tiers(&self) -> impl Iterator<Item = (&Iri, RequirementTier)> {
        self.mandatory
            .iter()
            .map(|property| (property, RequirementTier::Mandatory))
            .chain(
                self.recommended
                    .iter()
                    .map(|property| (property, RequirementTier::Recommended)),
            )
            .chain(
                self.optional
                    .iter()
                    .map(|property| (property, RequirementTier::Optional)),
            )
    }
}

/// Injected property-specification profile: which properties each
/// entity class must, should, or may carry. Configuration data, never
/// derived, never mutated during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    #[serde(default)]
    pub catalog: ClassProperties,
    #[serde(default)]
    pub dataset: ClassProperties,
    #[serde(default)]
    pub distribution: ClassProperties,
    #[serde(default)]
    pub record: ClassProperties,
}

impl Profile {
    pub fn class(&self, class: EntityClass) -> &ClassProperties {
        match class {
            EntityClass::Catalog => &self.catalog,
            EntityClass::Dataset => &self.dataset,
            EntityClass::Distribution => &self.distribution,
            EntityClass::Record => &self.record,
        }
    }

    /// Parse a profile from its TOML form and validate it.
    pub fn from_toml(text: &str) -> Result<Self> {
        let profile: Profile =
            toml::from_str(text).map_err(|err| Error::InvalidProfile(err.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject duplicate properties within a class: a property listed
    /// twice for the same class would force an aggregator conflict at
    /// audit time.
    pub fn validate(&self) -> Result<()> {
        for class in EntityClass::ALL {
            let mut seen = BTreeSet::new();
            for (property, _tier) in self.class(class).tiers() {
                if !seen.insert(property) {
                    return Err(Error::InvalidProfile(format!(
                        "property listed twice for {class}: {property}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Ordered lists of properties to classify for vocabulary control,
/// per entity class. Independent of the profile: a property may appear
/// in one, both, or neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VocabularyPlan {
    #[serde(default)]
    pub catalog: Vec<Iri>,
    #[serde(default)]
    pub dataset: Vec<Iri>,
    #[serde(default)]
    pub distribution: Vec<Iri>,
    #[serde(default)]
    pub record: Vec<Iri>,
}

impl VocabularyPlan {
    pub fn class(&self, class: EntityClass) -> &[Iri] {
        match class {
            EntityClass::Catalog => &self.catalog,
            EntityClass::Dataset => &self.dataset,
            EntityClass::Distribution => &self.distribution,
            EntityClass::Record => &self.record,
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityClass::ALL
            .iter()
            .all(|class| self.class(*class).is_empty())
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let plan: VocabularyPlan =
            toml::from_str(text).map_err(|err| Error::InvalidProfile(err.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        for class in EntityClass::ALL {
            let mut seen = BTreeSet::new();
            for property in self.class(class) {
                if !seen.insert(property) {
                    return Err(Error::InvalidProfile(format!(
                        "vocabulary property listed twice for {class}: {property}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_with_missing_recommended_tier() {
        let profile = Profile::from_toml(
            r#"
            [catalog]
            mandatory = ["http://purl.org/dc/terms/title"]
            optional = ["http://purl.org/dc/terms/identifier"]

            [record]
            mandatory = ["http://purl.org/dc/terms/created"]
            "#,
        )
        .unwrap();

        assert!(profile.catalog.recommended.is_empty());
        assert_eq!(profile.catalog.mandatory.len(), 1);
        assert!(profile.dataset.is_empty());
        assert_eq!(profile.record.mandatory.len(), 1);
    }

    #[test]
    fn tier_order_is_mandatory_recommended_optional() {
        let class = ClassProperties {
            mandatory: vec![Iri::new("m")],
            recommended: vec![Iri::new("r")],
            optional: vec![Iri::new("o")],
        };
        let markers: Vec<&str> = class.tiers().map(|(_, tier)| tier.marker()).collect();
        assert_eq!(markers, ["M", "R", "O"]);
    }

    #[test]
    fn duplicate_property_within_a_class_is_rejected() {
        let err = Profile::from_toml(
            r#"
            [dataset]
            mandatory = ["http://purl.org/dc/terms/title"]
            optional = ["http://purl.org/dc/terms/title"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn same_property_across_classes_is_allowed() {
        let profile = Profile::from_toml(
            r#"
            [catalog]
            mandatory = ["http://purl.org/dc/terms/publisher"]

            [dataset]
            mandatory = ["http://purl.org/dc/terms/publisher"]
            "#,
        );
        assert!(profile.is_ok());
    }

    #[test]
    fn vocabulary_plan_parses_flat_lists() {
        let plan = VocabularyPlan::from_toml(
            r#"
            dataset = ["http://www.w3.org/ns/dcat#theme"]
            distribution = ["http://purl.org/dc/terms/format"]
            "#,
        )
        .unwrap();
        assert_eq!(plan.class(EntityClass::Dataset).len(), 1);
        assert!(plan.class(EntityClass::Catalog).is_empty());
        assert!(!plan.is_empty());
    }
}
