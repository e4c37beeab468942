//! Scenarios: one housing layout plus its cost inputs.
//!
//! Two shapes exist:
//!   - `ScenarioRecord` is what callers store and edit. Every topology's
//!     fields are optional because the form keeps them all around.
//!   - `Scenario` is what formulas consume. `Scenario::from_record()` is
//!     the only place defaults are substituted and the only place a
//!     missing structural field is rejected.

use crate::{
    config::{AssumptionOverrides, CountryCostAssumptions},
    error::{EngineError, EngineResult},
    results_calculator::ScenarioResults,
    types::{new_id, FinishLevel, ProjectId, ProjectType, ScenarioId},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_APARTMENT_UNIT_SIZE: f64 = 50.0;
pub const DEFAULT_SHARED_SPACE_PERCENTAGE: f64 = 15.0;
pub const DEFAULT_SINGLE_FAMILY_UNIT_SIZE: f64 = 150.0;

/// Apartment unit-type split, percentages expected to sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UnitMix {
    pub one_bedroom: f64,
    pub two_bedroom: f64,
    pub three_bedroom: f64,
}

impl UnitMix {
    pub fn new(one_bedroom: f64, two_bedroom: f64, three_bedroom: f64) -> Self {
        Self { one_bedroom, two_bedroom, three_bedroom }
    }

    pub fn total(&self) -> f64 {
        self.one_bedroom + self.two_bedroom + self.three_bedroom
    }

    /// Not enforced: `Scenario::from_record()` only warns, and the
    /// three-bedroom bucket absorbs whatever the first two leave.
    pub fn sums_to_hundred(&self) -> bool {
        (self.total() - 100.0).abs() < 1e-6
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureLineItems {
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub sewer: f64,
    #[serde(default)]
    pub electrical: f64,
    #[serde(default)]
    pub roads: f64,
}

/// The persisted, loosely typed scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioRecord {
    pub id: ScenarioId,
    pub project_id: ProjectId,
    pub name: String,
    pub project_type: ProjectType,

    // ── Apartment ──────────────────────────────────
    #[serde(default)]
    pub unit_size: Option<f64>,
    #[serde(default)]
    pub units_per_floor: Option<u32>,
    #[serde(default)]
    pub number_of_floors: Option<u32>,
    #[serde(default)]
    pub unit_mix: Option<UnitMix>,
    #[serde(default)]
    pub shared_space_percentage: Option<f64>,

    // ── Single-family (number_of_units also used by mixed) ──
    #[serde(default)]
    pub number_of_units: Option<u32>,
    #[serde(default)]
    pub lot_size: Option<f64>,
    #[serde(default)]
    pub house_size: Option<f64>,

    // ── Mixed ──────────────────────────────────────
    #[serde(default)]
    pub apartment_units: Option<u32>,
    #[serde(default)]
    pub single_family_units: Option<u32>,

    // ── Costs ──────────────────────────────────────
    #[serde(default)]
    pub construction_cost_per_sqm: Option<f64>,
    #[serde(default)]
    pub infrastructure_costs: Option<InfrastructureLineItems>,
    #[serde(default)]
    pub finish_level: Option<FinishLevel>,
    #[serde(default)]
    pub accessible_unit_percentage: Option<f64>,

    #[serde(default)]
    pub assumption_overrides: Option<AssumptionOverrides>,

    // ── Cache (written by the engine) ──────────────
    #[serde(default)]
    pub results: Option<ScenarioResults>,
    #[serde(default)]
    pub input_fingerprint: Option<u32>,
}

impl ScenarioRecord {
    /// A blank record of the given type; fill fields before computing.
    pub fn new(project_id: impl Into<ProjectId>, name: impl Into<String>, project_type: ProjectType) -> Self {
        Self {
            id: new_id(),
            project_id: project_id.into(),
            name: name.into(),
            project_type,
            unit_size: None,
            units_per_floor: None,
            number_of_floors: None,
            unit_mix: None,
            shared_space_percentage: None,
            number_of_units: None,
            lot_size: None,
            house_size: None,
            apartment_units: None,
            single_family_units: None,
            construction_cost_per_sqm: None,
            infrastructure_costs: None,
            finish_level: None,
            accessible_unit_percentage: None,
            assumption_overrides: None,
            results: None,
            input_fingerprint: None,
        }
    }

    pub fn apartment(
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
        units_per_floor: u32,
        number_of_floors: u32,
        unit_mix: UnitMix,
    ) -> Self {
        let mut record = Self::new(project_id, name, ProjectType::Apartment);
        record.units_per_floor = Some(units_per_floor);
        record.number_of_floors = Some(number_of_floors);
        record.unit_mix = Some(unit_mix);
        record
    }

    pub fn single_family(
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
        number_of_units: u32,
    ) -> Self {
        let mut record = Self::new(project_id, name, ProjectType::SingleFamily);
        record.number_of_units = Some(number_of_units);
        record
    }

    pub fn mixed(
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
        number_of_units: u32,
        apartment_units: u32,
        single_family_units: u32,
    ) -> Self {
        let mut record = Self::new(project_id, name, ProjectType::Mixed);
        record.number_of_units = Some(number_of_units);
        record.apartment_units = Some(apartment_units);
        record.single_family_units = Some(single_family_units);
        record
    }

    /// Drop the cached results, e.g. after an edit.
    pub fn invalidate(&mut self) {
        self.results = None;
        self.input_fingerprint = None;
    }
}

// ── Resolved form ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ApartmentLayout {
    pub unit_size: f64,
    pub units_per_floor: u32,
    pub number_of_floors: u32,
    pub unit_mix: UnitMix,
    pub shared_space_percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SingleFamilyLayout {
    pub number_of_units: u32,
    pub lot_size: f64,
    /// Floor area per house; `house_size` when given, else `unit_size`, else 150.
    pub house_size: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MixedLayout {
    pub number_of_units: u32,
    pub apartment_units: u32,
    pub single_family_units: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "project_type", rename_all = "kebab-case")]
pub enum Layout {
    Apartment(ApartmentLayout),
    SingleFamily(SingleFamilyLayout),
    Mixed(MixedLayout),
}

impl Layout {
    pub fn project_type(&self) -> ProjectType {
        match self {
            Layout::Apartment(_) => ProjectType::Apartment,
            Layout::SingleFamily(_) => ProjectType::SingleFamily,
            Layout::Mixed(_) => ProjectType::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScenarioCosts {
    pub construction_cost_per_sqm: f64,
    pub infrastructure: InfrastructureLineItems,
    pub finish_level: FinishLevel,
}

/// A scenario with every default applied.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Scenario {
    pub id: ScenarioId,
    pub project_id: ProjectId,
    pub name: String,
    pub layout: Layout,
    pub costs: ScenarioCosts,
    pub accessible_unit_percentage: f64,
}

impl Scenario {
    /// Resolve a record against already-resolved assumptions.
    ///
    /// Fails only for apartment records lacking `units_per_floor`,
    /// `number_of_floors` or `unit_mix`.
    pub fn from_record(
        record: &ScenarioRecord,
        assumptions: &CountryCostAssumptions,
    ) -> EngineResult<Self> {
        let layout = match record.project_type {
            ProjectType::Apartment => {
                let missing: Vec<&str> = [
                    ("units_per_floor", record.units_per_floor.is_none()),
                    ("number_of_floors", record.number_of_floors.is_none()),
                    ("unit_mix", record.unit_mix.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(field, _)| field)
                .collect();

                match (record.units_per_floor, record.number_of_floors, record.unit_mix) {
                    (Some(units_per_floor), Some(number_of_floors), Some(unit_mix)) => {
                        if !unit_mix.sums_to_hundred() {
                            log::warn!(
                                "Scenario {}: unit mix sums to {:.1}%, not 100%",
                                record.id,
                                unit_mix.total()
                            );
                        }
                        Layout::Apartment(ApartmentLayout {
                            unit_size: record.unit_size.unwrap_or(DEFAULT_APARTMENT_UNIT_SIZE),
                            units_per_floor,
                            number_of_floors,
                            unit_mix,
                            shared_space_percentage: record
                                .shared_space_percentage
                                .unwrap_or(DEFAULT_SHARED_SPACE_PERCENTAGE),
                        })
                    }
                    _ => {
                        return Err(EngineError::Configuration(format!(
                            "apartment scenario '{}' is missing {}",
                            record.id,
                            missing.join(", ")
                        )))
                    }
                }
            }
            ProjectType::SingleFamily => Layout::SingleFamily(SingleFamilyLayout {
                number_of_units: record.number_of_units.unwrap_or(0),
                lot_size: record.lot_size.unwrap_or(0.0),
                house_size: record
                    .house_size
                    .or(record.unit_size)
                    .unwrap_or(DEFAULT_SINGLE_FAMILY_UNIT_SIZE),
            }),
            ProjectType::Mixed => Layout::Mixed(MixedLayout {
                number_of_units: record.number_of_units.unwrap_or(0),
                apartment_units: record.apartment_units.unwrap_or(0),
                single_family_units: record.single_family_units.unwrap_or(0),
            }),
        };

        let finish_level = record.finish_level.unwrap_or_default();
        let costs = ScenarioCosts {
            construction_cost_per_sqm: record
                .construction_cost_per_sqm
                .unwrap_or_else(|| assumptions.construction_costs.for_finish(finish_level)),
            infrastructure: record.infrastructure_costs.unwrap_or_default(),
            finish_level,
        };

        Ok(Self {
            id: record.id.clone(),
            project_id: record.project_id.clone(),
            name: record.name.clone(),
            layout,
            costs,
            accessible_unit_percentage: record.accessible_unit_percentage.unwrap_or(0.0),
        })
    }

    /// Floor area of one dwelling, as used by the unit-size rules.
    pub fn dwelling_size(&self) -> f64 {
        match &self.layout {
            Layout::Apartment(a) => a.unit_size,
            Layout::SingleFamily(s) => s.house_size,
            Layout::Mixed(_) => crate::results_calculator::MIXED_UNIT_AREA,
        }
    }

    pub fn floors(&self) -> u32 {
        match &self.layout {
            Layout::Apartment(a) => a.number_of_floors,
            Layout::SingleFamily(_) | Layout::Mixed(_) => 1,
        }
    }
}
