//! Country reference data and the assumption override chain.
//!
//! RULE: formulas never look at overrides directly. Every computation
//! receives one fully resolved `CountryCostAssumptions` produced by
//! `resolve_assumptions()` (scenario beats project beats country).

use crate::types::{CountryCode, FinishLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Reference data ─────────────────────────────────────────────────

/// Construction cost tiers, currency per square meter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConstructionCostTiers {
    pub basic: f64,
    pub standard: f64,
    pub improved: f64,
}

impl ConstructionCostTiers {
    pub fn for_finish(&self, finish: FinishLevel) -> f64 {
        match finish {
            FinishLevel::Basic => self.basic,
            FinishLevel::Standard => self.standard,
            FinishLevel::Improved => self.improved,
        }
    }
}

/// Per-unit infrastructure connection costs. Visualization only;
/// the cost model uses a flat per-unit allowance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureUnitCosts {
    pub water_connection: f64,
    pub sewer_connection: f64,
    pub electrical_connection: f64,
    pub road_per_meter: f64,
}

/// Persons per unit, by unit type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OccupancyAssumptions {
    #[serde(default = "default_one_bedroom")]
    pub one_bedroom: f64,
    #[serde(default = "default_two_bedroom")]
    pub two_bedroom: f64,
    #[serde(default = "default_three_bedroom")]
    pub three_bedroom: f64,
    #[serde(default = "default_single_family")]
    pub single_family: f64,
}

fn default_one_bedroom() -> f64 { 2.0 }
fn default_two_bedroom() -> f64 { 3.0 }
fn default_three_bedroom() -> f64 { 4.0 }
fn default_single_family() -> f64 { 4.0 }

impl Default for OccupancyAssumptions {
    fn default() -> Self {
        Self {
            one_bedroom: default_one_bedroom(),
            two_bedroom: default_two_bedroom(),
            three_bedroom: default_three_bedroom(),
            single_family: default_single_family(),
        }
    }
}

/// Daily per-capita utility consumption.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UtilityConsumption {
    pub water_liters_per_person: f64,
    pub electricity_kwh_per_person: f64,
    pub waste_kg_per_person: f64,
}

/// Lower bounds of the density bands, units per hectare.
/// Expected ordering: low < medium < high < very_high.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DensityThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub very_high: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureLimit {
    pub water_liters_per_day: f64,
    pub population: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureThresholds {
    pub warning: InfrastructureLimit,
    pub exceeds: InfrastructureLimit,
}

/// Room sizes in square meters, consumed by floor-plan views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VisualizationRoomSizes {
    pub bedroom: f64,
    pub living_room: f64,
    pub kitchen: f64,
    pub bathroom: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryCostAssumptions {
    pub country_code: CountryCode,
    pub currency: String,
    pub construction_costs: ConstructionCostTiers,
    pub infrastructure_costs: InfrastructureUnitCosts,
    #[serde(default)]
    pub occupancy: OccupancyAssumptions,
    pub utility_consumption: UtilityConsumption,
    pub density_thresholds: DensityThresholds,
    pub infrastructure_thresholds: InfrastructureThresholds,
    pub visualization: VisualizationRoomSizes,
}

// ── Overrides ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OccupancyOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_bedroom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_bedroom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_bedroom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_family: Option<f64>,
}

/// Partial assumptions attached to a project or a scenario.
/// Sections replace the underlying section wholesale; occupancy
/// is the exception and merges per unit type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssumptionOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_costs: Option<ConstructionCostTiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_costs: Option<InfrastructureUnitCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<OccupancyOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility_consumption: Option<UtilityConsumption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_thresholds: Option<DensityThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_thresholds: Option<InfrastructureThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<VisualizationRoomSizes>,
}

impl AssumptionOverrides {
    fn apply_to(&self, base: &mut CountryCostAssumptions) {
        if let Some(v) = self.construction_costs {
            base.construction_costs = v;
        }
        if let Some(v) = self.infrastructure_costs {
            base.infrastructure_costs = v;
        }
        if let Some(o) = self.occupancy {
            let occ = &mut base.occupancy;
            occ.one_bedroom = o.one_bedroom.unwrap_or(occ.one_bedroom);
            occ.two_bedroom = o.two_bedroom.unwrap_or(occ.two_bedroom);
            occ.three_bedroom = o.three_bedroom.unwrap_or(occ.three_bedroom);
            occ.single_family = o.single_family.unwrap_or(occ.single_family);
        }
        if let Some(v) = self.utility_consumption {
            base.utility_consumption = v;
        }
        if let Some(v) = self.density_thresholds {
            base.density_thresholds = v;
        }
        if let Some(v) = self.infrastructure_thresholds {
            base.infrastructure_thresholds = v;
        }
        if let Some(v) = self.visualization {
            base.visualization = v;
        }
    }
}

/// Resolve the three-tier chain into one assumptions value.
pub fn resolve_assumptions(
    country: &CountryCostAssumptions,
    project: Option<&AssumptionOverrides>,
    scenario: Option<&AssumptionOverrides>,
) -> CountryCostAssumptions {
    let mut resolved = country.clone();
    if let Some(p) = project {
        p.apply_to(&mut resolved);
    }
    if let Some(s) = scenario {
        s.apply_to(&mut resolved);
    }
    resolved
}

// ── Catalog ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct CountriesFile {
    default_country: CountryCode,
    countries: Vec<CountryCostAssumptions>,
}

/// The assumption provider: country code → reference data.
#[derive(Debug, Clone)]
pub struct AssumptionCatalog {
    default_country: CountryCode,
    countries: HashMap<CountryCode, CountryCostAssumptions>,
}

impl AssumptionCatalog {
    /// Load from the data/ directory.
    /// In tests, use AssumptionCatalog::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/assumptions/countries.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: CountriesFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Self::from_entries(file.default_country, file.countries)
    }

    fn from_entries(
        default_country: CountryCode,
        entries: Vec<CountryCostAssumptions>,
    ) -> anyhow::Result<Self> {
        let countries: HashMap<_, _> = entries
            .into_iter()
            .map(|c| (c.country_code.to_uppercase(), c))
            .collect();
        let default_country = default_country.to_uppercase();
        if !countries.contains_key(&default_country) {
            anyhow::bail!("default country {default_country} has no assumptions entry");
        }
        Ok(Self { default_country, countries })
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Known country codes, sorted.
    pub fn country_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.countries.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Look up a country, falling back to the default country for
    /// unknown codes. Never fails.
    pub fn for_country(&self, code: &str) -> &CountryCostAssumptions {
        if let Some(found) = self.countries.get(&code.to_uppercase()) {
            return found;
        }
        log::warn!(
            "No cost assumptions for country '{code}', using {}",
            self.default_country
        );
        &self.countries[&self.default_country]
    }

    /// Catalog with hardcoded values for use in tests.
    pub fn default_test() -> Self {
        let us = CountryCostAssumptions {
            country_code: "US".into(),
            currency: "USD".into(),
            construction_costs: ConstructionCostTiers {
                basic: 1_200.0,
                standard: 1_600.0,
                improved: 2_200.0,
            },
            infrastructure_costs: InfrastructureUnitCosts {
                water_connection: 4_500.0,
                sewer_connection: 5_000.0,
                electrical_connection: 3_500.0,
                road_per_meter: 900.0,
            },
            occupancy: OccupancyAssumptions {
                one_bedroom: 1.8,
                two_bedroom: 2.9,
                three_bedroom: 4.1,
                single_family: 3.6,
            },
            utility_consumption: UtilityConsumption {
                water_liters_per_person: 300.0,
                electricity_kwh_per_person: 12.0,
                waste_kg_per_person: 2.2,
            },
            density_thresholds: DensityThresholds {
                low: 0.0,
                medium: 50.0,
                high: 150.0,
                very_high: 300.0,
            },
            infrastructure_thresholds: InfrastructureThresholds {
                warning: InfrastructureLimit {
                    water_liters_per_day: 250_000.0,
                    population: 800.0,
                },
                exceeds: InfrastructureLimit {
                    water_liters_per_day: 500_000.0,
                    population: 1_600.0,
                },
            },
            visualization: VisualizationRoomSizes {
                bedroom: 12.0,
                living_room: 20.0,
                kitchen: 10.0,
                bathroom: 5.0,
            },
        };

        let ke = CountryCostAssumptions {
            country_code: "KE".into(),
            currency: "KES".into(),
            construction_costs: ConstructionCostTiers {
                basic: 35_000.0,
                standard: 50_000.0,
                improved: 75_000.0,
            },
            infrastructure_costs: InfrastructureUnitCosts {
                water_connection: 60_000.0,
                sewer_connection: 80_000.0,
                electrical_connection: 45_000.0,
                road_per_meter: 25_000.0,
            },
            occupancy: OccupancyAssumptions::default(),
            utility_consumption: UtilityConsumption {
                water_liters_per_person: 80.0,
                electricity_kwh_per_person: 1.5,
                waste_kg_per_person: 0.6,
            },
            density_thresholds: DensityThresholds {
                low: 0.0,
                medium: 80.0,
                high: 200.0,
                very_high: 400.0,
            },
            infrastructure_thresholds: InfrastructureThresholds {
                warning: InfrastructureLimit {
                    water_liters_per_day: 100_000.0,
                    population: 1_000.0,
                },
                exceeds: InfrastructureLimit {
                    water_liters_per_day: 200_000.0,
                    population: 2_500.0,
                },
            },
            visualization: VisualizationRoomSizes {
                bedroom: 9.0,
                living_room: 14.0,
                kitchen: 6.0,
                bathroom: 3.5,
            },
        };

        Self {
            default_country: "US".into(),
            countries: HashMap::from([("US".to_string(), us), ("KE".to_string(), ke)]),
        }
    }
}
