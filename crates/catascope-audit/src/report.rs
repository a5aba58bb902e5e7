//! Report rendering over the aggregator, the core's only output
//! surface. Everything here is a thin, deterministic transformation;
//! no new statistics are computed beyond derived rates and labels.

use catascope_core::{
    Aggregator, EntityClass, Iri, Profile, PropertyKey, VocabularyKind, VocabularyObservation,
    VocabularyPlan,
};

use crate::model::AuditResults;

/// Pass/warn/fail banding applied to mandatory-tier compliance
/// averages. Reporting concern only; nothing stores a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceBand {
    Pass,
    Warn,
    Fail,
}

impl ComplianceBand {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 0.8 {
            ComplianceBand::Pass
        } else if rate >= 0.5 {
            ComplianceBand::Warn
        } else {
            ComplianceBand::Fail
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplianceBand::Pass => "PASS",
            ComplianceBand::Warn => "WARN",
            ComplianceBand::Fail => "FAIL",
        }
    }
}

/// Average mandatory-tier compliance for one catalog and class, over
/// applicable observations only. `None` when no mandatory property
/// had applicable entities.
pub fn mandatory_average(
    aggregator: &Aggregator,
    profile: &Profile,
    catalog: &Iri,
    class: EntityClass,
) -> Option<f64> {
    let slots = aggregator.compliance_for(catalog)?;
    let rates: Vec<f64> = profile
        .class(class)
        .mandatory
        .iter()
        .filter_map(|property| {
            slots
                .get(&PropertyKey::new(property.clone(), class))
                .and_then(|observation| observation.rate())
        })
        .collect();
    if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }
}

/// Render a deterministic markdown report from audit results.
pub fn render_report(results: &AuditResults, profile: &Profile, plan: &VocabularyPlan) -> String {
    let aggregator = &results.results;
    let catalogs = aggregator.catalogs();
    let mut lines = Vec::new();

    lines.push("# Catascope Audit Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- results_version: {}", results.results_version));
    lines.push(format!("- catalogs: {}", results.catalog_count));
    lines.push(format!("- resolve_ms: {}", results.performance.resolve_ms));
    lines.push(format!("- analyze_ms: {}", results.performance.analyze_ms));
    lines.push(String::new());

    render_compliance_tables(&mut lines, aggregator, profile, &catalogs);
    render_mandatory_summary(&mut lines, aggregator, profile, &catalogs);
    render_vocabulary_tables(&mut lines, aggregator, plan, &catalogs);

    if !results.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in &results.warnings {
            lines.push(format!("- {}: {}", warning.catalog, warning.message));
        }
        lines.push(String::new());
    }

    lines.push("## Legend".to_string());
    lines.push("- (M) mandatory, (R) recommended, (O) optional property".to_string());
    lines.push("- m/n = entities with the property / entities of the class".to_string());
    lines.push("- N/A = no entities of this class in the catalog".to_string());
    lines.push("- p% (kX) = p% of entities carry the property, k distinct values;".to_string());
    lines.push("  X is C for codelist, V for controlled vocabulary, F for free text".to_string());
    lines.push("- \"-\" = not checked for this catalog".to_string());

    lines.join("\n")
}

fn render_compliance_tables(
    lines: &mut Vec<String>,
    aggregator: &Aggregator,
    profile: &Profile,
    catalogs: &[&Iri],
) {
    for class in EntityClass::ALL {
        let class_properties = profile.class(class);
        if class_properties.is_empty() {
            continue;
        }

        lines.push(format!("## {} properties", class.label()));
        push_table_header(lines, "property", catalogs);

        for (property, tier) in class_properties.tiers() {
            let key = PropertyKey::new(property.clone(), class);
            let mut row = format!("| {} ({}) |", property.short_name(), tier.marker());
            for catalog in catalogs {
                let cell = match aggregator
                    .compliance_for(catalog)
                    .and_then(|slots| slots.get(&key))
                {
                    Some(observation) if observation.is_applicable() => format!(
                        "{}/{}",
                        observation.entities_with_property, observation.total_entities
                    ),
                    Some(_) => "N/A".to_string(),
                    None => "-".to_string(),
                };
                row.push_str(&format!(" {cell} |"));
            }
            lines.push(row);
        }
        lines.push(String::new());
    }
}

fn render_mandatory_summary(
    lines: &mut Vec<String>,
    aggregator: &Aggregator,
    profile: &Profile,
    catalogs: &[&Iri],
) {
    lines.push("## Mandatory compliance".to_string());
    for catalog in catalogs {
        lines.push(format!("### {catalog}"));
        let mut class_scores = Vec::new();
        for class in EntityClass::ALL {
            if profile.class(class).mandatory.is_empty() {
                continue;
            }
            match mandatory_average(aggregator, profile, catalog, class) {
                Some(average) => {
                    let band = ComplianceBand::for_rate(average);
                    lines.push(format!(
                        "- [{}] {}: {:.1}% mandatory compliance",
                        band.label(),
                        class.label(),
                        average * 100.0
                    ));
                    class_scores.push(average);
                }
                None => {
                    lines.push(format!("- [N/A] {}: no applicable entities", class.label()));
                }
            }
        }
        if !class_scores.is_empty() {
            let overall = class_scores.iter().sum::<f64>() / class_scores.len() as f64;
            lines.push(format!(
                "- [{}] overall: {:.1}%",
                ComplianceBand::for_rate(overall).label(),
                overall * 100.0
            ));
        }
        lines.push(String::new());
    }
}

fn render_vocabulary_tables(
    lines: &mut Vec<String>,
    aggregator: &Aggregator,
    plan: &VocabularyPlan,
    catalogs: &[&Iri],
) {
    if plan.is_empty() || aggregator.vocabulary.is_empty() {
        return;
    }

    lines.push("## Controlled vocabularies".to_string());
    for class in EntityClass::ALL {
        let properties = plan.class(class);
        if properties.is_empty() {
            continue;
        }

        lines.push(format!("### {} properties", class.label()));
        push_table_header(lines, "property", catalogs);

        for property in properties {
            let key = PropertyKey::new(property.clone(), class);
            let mut row = format!("| {} |", property.short_name());
            for catalog in catalogs {
                let cell = match aggregator
                    .vocabulary_for(catalog)
                    .and_then(|slots| slots.get(&key))
                {
                    Some(observation) => vocabulary_cell(observation),
                    None => "-".to_string(),
                };
                row.push_str(&format!(" {cell} |"));
            }
            lines.push(row);
        }
        lines.push(String::new());
    }

    render_top_values(lines, aggregator, plan, catalogs);
}

fn vocabulary_cell(observation: &VocabularyObservation) -> String {
    let percentage = if observation.total_entities > 0 {
        (observation.entities_with_property as f64 / observation.total_entities as f64) * 100.0
    } else {
        0.0
    };
    let marker = match observation.kind() {
        VocabularyKind::Codelist => "C",
        VocabularyKind::Controlled => "V",
        VocabularyKind::FreeText => "F",
    };
    format!(
        "{percentage:.0}% ({}{marker})",
        observation.unique_value_count
    )
}

fn render_top_values(
    lines: &mut Vec<String>,
    aggregator: &Aggregator,
    plan: &VocabularyPlan,
    catalogs: &[&Iri],
) {
    let mut detail_lines = Vec::new();
    for class in EntityClass::ALL {
        for property in plan.class(class) {
            let key = PropertyKey::new(property.clone(), class);
            for catalog in catalogs {
                let Some(observation) = aggregator
                    .vocabulary_for(catalog)
                    .and_then(|slots| slots.get(&key))
                else {
                    continue;
                };
                if !observation.controlled || observation.values.is_empty() {
                    continue;
                }
                let top = observation
                    .values
                    .iter()
                    .take(3)
                    .map(|entry| format!("{} ({})", entry.value, entry.usage_count))
                    .collect::<Vec<_>>()
                    .join(", ");
                detail_lines.push(format!(
                    "- {} on {catalog}: {}, top values: {top}",
                    property.short_name(),
                    observation.kind().label()
                ));
            }
        }
    }

    if !detail_lines.is_empty() {
        lines.push("### Top values".to_string());
        lines.append(&mut detail_lines);
        lines.push(String::new());
    }
}

fn push_table_header(lines: &mut Vec<String>, first_column: &str, catalogs: &[&Iri]) {
    let mut header = format!("| {first_column} |");
    let mut separator = "| --- |".to_string();
    for catalog in catalogs {
        header.push_str(&format!(" {catalog} |"));
        separator.push_str(" --- |");
    }
    lines.push(header);
    lines.push(separator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use catascope_core::{ClassProperties, PropertyObservation, ValueObservation};

    use crate::model::PerformanceMetrics;

    #[test]
    fn bands_follow_the_tier_thresholds() {
        assert_eq!(ComplianceBand::for_rate(1.0), ComplianceBand::Pass);
        assert_eq!(ComplianceBand::for_rate(0.8), ComplianceBand::Pass);
        assert_eq!(ComplianceBand::for_rate(0.79), ComplianceBand::Warn);
        assert_eq!(ComplianceBand::for_rate(0.5), ComplianceBand::Warn);
        assert_eq!(ComplianceBand::for_rate(0.49), ComplianceBand::Fail);
        assert_eq!(ComplianceBand::for_rate(0.0), ComplianceBand::Fail);
    }

    fn dataset_profile(properties: &[&str]) -> Profile {
        Profile {
            dataset: ClassProperties {
                mandatory: properties.iter().map(|p| Iri::new(*p)).collect(),
                ..ClassProperties::default()
            },
            ..Profile::default()
        }
    }

    #[test]
    fn mandatory_average_skips_not_applicable_observations() {
        let catalog = Iri::new("http://example.org/cat");
        let profile = dataset_profile(&["http://p/full", "http://p/half", "http://p/na"]);
        let mut aggregator = Aggregator::new();

        aggregator
            .record_compliance(
                &catalog,
                PropertyKey::new(Iri::new("http://p/full"), EntityClass::Dataset),
                PropertyObservation::new(4, 4),
            )
            .unwrap();
        aggregator
            .record_compliance(
                &catalog,
                PropertyKey::new(Iri::new("http://p/half"), EntityClass::Dataset),
                PropertyObservation::new(2, 4),
            )
            .unwrap();
        aggregator
            .record_compliance(
                &catalog,
                PropertyKey::new(Iri::new("http://p/na"), EntityClass::Dataset),
                PropertyObservation::NOT_APPLICABLE,
            )
            .unwrap();

        let average = mandatory_average(&aggregator, &profile, &catalog, EntityClass::Dataset);
        assert_eq!(average, Some(0.75));
    }

    #[test]
    fn mandatory_average_is_none_when_nothing_applies() {
        let catalog = Iri::new("http://example.org/cat");
        let profile = dataset_profile(&["http://p/na"]);
        let mut aggregator = Aggregator::new();
        aggregator
            .record_compliance(
                &catalog,
                PropertyKey::new(Iri::new("http://p/na"), EntityClass::Dataset),
                PropertyObservation::NOT_APPLICABLE,
            )
            .unwrap();

        assert_eq!(
            mandatory_average(&aggregator, &profile, &catalog, EntityClass::Dataset),
            None
        );
    }

    #[test]
    fn report_renders_sentinel_and_vocabulary_cells() {
        let catalog = Iri::new("http://example.org/cat");
        let profile = dataset_profile(&["http://p/title"]);
        let plan = VocabularyPlan {
            dataset: vec![Iri::new("http://p/theme")],
            ..VocabularyPlan::default()
        };

        let mut aggregator = Aggregator::new();
        aggregator
            .record_compliance(
                &catalog,
                PropertyKey::new(Iri::new("http://p/title"), EntityClass::Dataset),
                PropertyObservation::NOT_APPLICABLE,
            )
            .unwrap();
        aggregator
            .record_vocabulary(
                &catalog,
                PropertyKey::new(Iri::new("http://p/theme"), EntityClass::Dataset),
                VocabularyObservation::from_counts(
                    4,
                    3,
                    vec![
                        ValueObservation::new("http://codes.example/road", 2),
                        ValueObservation::new("http://codes.example/rail", 1),
                    ],
                ),
            )
            .unwrap();

        let results = AuditResults {
            results_version: "0.1".to_string(),
            catalog_count: 1,
            results: aggregator,
            warnings: Vec::new(),
            performance: PerformanceMetrics {
                resolve_ms: 0,
                analyze_ms: 0,
                total_ms: 0,
            },
        };

        let report = render_report(&results, &profile, &plan);
        assert!(report.contains("| title (M) | N/A |"));
        assert!(report.contains("75% (2C)"));
        assert!(report.contains("[N/A] Dataset: no applicable entities"));
        assert!(report.contains("top values: http://codes.example/road (2)"));
    }
}
