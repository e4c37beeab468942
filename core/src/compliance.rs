//! Regulatory compliance: evaluate a scenario against the rule set of
//! its location.
//!
//! Rules come from a `RuleCatalog` (loaded from data/ or hardcoded for
//! tests). Every rule is evaluated independently; the report aggregates
//! them and lists recommendations for failed rules, most severe first.

use crate::{
    project::SQM_PER_HECTARE,
    results_calculator::ScenarioResults,
    scenario::{Layout, Scenario},
    types::{ratio_or_zero, CountryCode},
};
use serde::{Deserialize, Serialize};

/// Redesign and resubmission allowance charged for any failed rule.
pub const MIN_REMEDIATION_COST: f64 = 5_000.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Zoning,
    Building,
    Accessibility,
    Environmental,
    Safety,
}

/// Ordered most to least severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleRequirement {
    MinUnitSize { sqm: f64 },
    MaxDensity { units_per_hectare: f64 },
    MaxLandCoverage { percentage: f64 },
    MinGreenSpace { percentage: f64 },
    MinAccessibleUnits { percentage: f64 },
    MaxFloors { floors: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceRule {
    pub id: String,
    pub country_code: CountryCode,
    #[serde(default)]
    pub city: Option<String>,
    pub category: RuleCategory,
    pub description: String,
    pub impact: ImpactLevel,
    pub requirement: RuleRequirement,
    /// Currency per unit of shortfall where the requirement has no
    /// natural cost (landscaping per m², retrofit per unit).
    #[serde(default)]
    pub remediation_unit_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleStatus {
    pub rule_id: String,
    pub category: RuleCategory,
    pub impact: ImpactLevel,
    pub compliant: bool,
    pub notes: Option<String>,
    pub suggested_adjustment: Option<String>,
    pub remedial_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub rule_id: String,
    pub priority: ImpactLevel,
    pub message: String,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulatoryCompliance {
    pub scenario_id: String,
    pub statuses: Vec<RuleStatus>,
    pub compliant_rules: usize,
    pub total_rules: usize,
    pub compliance_percentage: f64,
    pub total_remediate_cost: f64,
    pub recommendations: Vec<Recommendation>,
}

impl RegulatoryCompliance {
    pub fn is_fully_compliant(&self) -> bool {
        self.compliant_rules == self.total_rules
    }
}

struct Finding {
    notes: String,
    adjustment: String,
    cost: f64,
}

fn check_rule(rule: &ComplianceRule, scenario: &Scenario, results: &ScenarioResults) -> Option<Finding> {
    let units = results.total_units as f64;
    let cost_per_sqm = scenario.costs.construction_cost_per_sqm;

    match rule.requirement {
        RuleRequirement::MinUnitSize { sqm } => {
            let size = scenario.dwelling_size();
            (size < sqm).then(|| Finding {
                notes: format!("Unit size {size:.1} m² is below the {sqm:.1} m² minimum"),
                adjustment: format!("Increase unit size by {:.1} m²", sqm - size),
                cost: (sqm - size) * units * cost_per_sqm,
            })
        }
        RuleRequirement::MaxDensity { units_per_hectare } => {
            let density = results.density_per_hectare;
            (density > units_per_hectare).then(|| {
                let allowed = units_per_hectare * results.built_up_area / SQM_PER_HECTARE;
                let excess = (units - allowed).max(0.0).ceil();
                Finding {
                    notes: format!(
                        "Density {density:.1} units/ha exceeds the {units_per_hectare:.1} units/ha limit"
                    ),
                    adjustment: format!("Remove {excess:.0} units or enlarge the footprint"),
                    cost: excess * results.cost_per_unit,
                }
            })
        }
        RuleRequirement::MaxLandCoverage { percentage } => {
            let coverage = results.land_coverage_percentage;
            (coverage > percentage).then(|| {
                let excess_area = results.built_up_area * (1.0 - percentage / coverage);
                Finding {
                    notes: format!(
                        "Land coverage {coverage:.1}% exceeds the {percentage:.1}% limit"
                    ),
                    adjustment: format!("Reduce built-up area by {excess_area:.0} m²"),
                    cost: excess_area * cost_per_sqm,
                }
            })
        }
        RuleRequirement::MinGreenSpace { percentage } => {
            let green = (100.0 - results.land_coverage_percentage).max(0.0);
            (green < percentage).then(|| {
                let land_sqm =
                    ratio_or_zero(results.built_up_area, results.land_coverage_percentage) * 100.0;
                let shortfall_sqm = land_sqm * (percentage - green) / 100.0;
                Finding {
                    notes: format!(
                        "Green space {green:.1}% is below the {percentage:.1}% requirement"
                    ),
                    adjustment: format!("Set aside {shortfall_sqm:.0} m² more open space"),
                    cost: shortfall_sqm * rule.remediation_unit_cost,
                }
            })
        }
        RuleRequirement::MinAccessibleUnits { percentage } => {
            let actual = scenario.accessible_unit_percentage;
            (actual < percentage).then(|| {
                let shortfall = (units * (percentage - actual) / 100.0).ceil();
                Finding {
                    notes: format!(
                        "Accessible units {actual:.1}% are below the {percentage:.1}% quota"
                    ),
                    adjustment: format!("Convert {shortfall:.0} more units to accessible layouts"),
                    cost: shortfall * rule.remediation_unit_cost,
                }
            })
        }
        RuleRequirement::MaxFloors { floors } => {
            let actual = scenario.floors();
            (actual > floors).then(|| {
                let per_floor = match &scenario.layout {
                    Layout::Apartment(a) => a.units_per_floor as f64,
                    Layout::SingleFamily(_) | Layout::Mixed(_) => 0.0,
                };
                let excess = (actual - floors) as f64;
                Finding {
                    notes: format!("{actual} floors exceed the {floors}-floor height limit"),
                    adjustment: format!("Remove {excess:.0} floors or redistribute units"),
                    cost: excess * per_floor * results.cost_per_unit,
                }
            })
        }
    }
}

/// Evaluate `rules` in order and aggregate the outcome.
pub fn evaluate(
    scenario: &Scenario,
    results: &ScenarioResults,
    rules: &[ComplianceRule],
) -> RegulatoryCompliance {
    let statuses: Vec<RuleStatus> = rules
        .iter()
        .map(|rule| match check_rule(rule, scenario, results) {
            None => RuleStatus {
                rule_id: rule.id.clone(),
                category: rule.category,
                impact: rule.impact,
                compliant: true,
                notes: None,
                suggested_adjustment: None,
                remedial_cost: 0.0,
            },
            Some(finding) => RuleStatus {
                rule_id: rule.id.clone(),
                category: rule.category,
                impact: rule.impact,
                compliant: false,
                notes: Some(finding.notes),
                suggested_adjustment: Some(finding.adjustment),
                remedial_cost: finding.cost.max(MIN_REMEDIATION_COST),
            },
        })
        .collect();

    let total_rules = statuses.len();
    let compliant_rules = statuses.iter().filter(|s| s.compliant).count();
    let compliance_percentage = if total_rules == 0 {
        100.0
    } else {
        compliant_rules as f64 / total_rules as f64 * 100.0
    };
    let total_remediate_cost = statuses
        .iter()
        .filter(|s| !s.compliant)
        .map(|s| s.remedial_cost)
        .sum();

    let mut recommendations: Vec<Recommendation> = rules
        .iter()
        .zip(&statuses)
        .filter(|(_, status)| !status.compliant)
        .map(|(rule, status)| Recommendation {
            rule_id: rule.id.clone(),
            priority: rule.impact,
            message: format!(
                "{}: {}",
                rule.description,
                status.suggested_adjustment.as_deref().unwrap_or_default()
            ),
            estimated_cost: status.remedial_cost,
        })
        .collect();
    // Stable: equal priorities keep rule order.
    recommendations.sort_by_key(|r| r.priority);

    log::debug!(
        "Compliance for {}: {compliant_rules}/{total_rules} rules, remediation {total_remediate_cost:.0}",
        scenario.id
    );

    RegulatoryCompliance {
        scenario_id: scenario.id.clone(),
        statuses,
        compliant_rules,
        total_rules,
        compliance_percentage,
        total_remediate_cost,
        recommendations,
    }
}

// ── Rule source ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct RulesFile {
    rules: Vec<ComplianceRule>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<ComplianceRule>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<ComplianceRule>) -> Self {
        Self { rules }
    }

    /// Load from the data/ directory.
    /// In tests, use RuleCatalog::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/compliance/rules.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: RulesFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(Self::new(file.rules))
    }

    /// Country-wide rules then city rules, in declaration order. A city
    /// rule replaces the country rule with the same id in place.
    pub fn rules_for(&self, country: &str, city: Option<&str>) -> Vec<ComplianceRule> {
        let in_country = |r: &&ComplianceRule| r.country_code.eq_ignore_ascii_case(country);

        let mut selected: Vec<ComplianceRule> = self
            .rules
            .iter()
            .filter(in_country)
            .filter(|r| r.city.is_none())
            .cloned()
            .collect();

        let Some(city) = city else {
            return selected;
        };
        let city_rules = self.rules.iter().filter(in_country).filter(|r| {
            r.city
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(city))
        });
        for rule in city_rules {
            match selected.iter_mut().find(|r| r.id == rule.id) {
                Some(existing) => *existing = rule.clone(),
                None => selected.push(rule.clone()),
            }
        }
        selected
    }

    /// Catalog with hardcoded rules for use in tests.
    pub fn default_test() -> Self {
        let rule = |id: &str, city: Option<&str>, category, impact, requirement, remediation_unit_cost| {
            ComplianceRule {
                id: id.into(),
                country_code: "US".into(),
                city: city.map(Into::into),
                category,
                description: id.replace('_', " "),
                impact,
                requirement,
                remediation_unit_cost,
            }
        };
        Self::new(vec![
            rule("min_unit_size", None, RuleCategory::Building, ImpactLevel::High,
                RuleRequirement::MinUnitSize { sqm: 37.0 }, 0.0),
            rule("max_density", None, RuleCategory::Zoning, ImpactLevel::Critical,
                RuleRequirement::MaxDensity { units_per_hectare: 250.0 }, 0.0),
            rule("min_green_space", None, RuleCategory::Environmental, ImpactLevel::Medium,
                RuleRequirement::MinGreenSpace { percentage: 20.0 }, 120.0),
            rule("accessible_units", None, RuleCategory::Accessibility, ImpactLevel::High,
                RuleRequirement::MinAccessibleUnits { percentage: 5.0 }, 15_000.0),
            rule("height_limit", Some("Boston"), RuleCategory::Zoning, ImpactLevel::Critical,
                RuleRequirement::MaxFloors { floors: 6 }, 0.0),
            rule("min_unit_size", Some("Boston"), RuleCategory::Building, ImpactLevel::High,
                RuleRequirement::MinUnitSize { sqm: 42.0 }, 0.0),
        ])
    }
}
