//! Scenario results calculator: units, population, cost, density and
//! infrastructure load for one scenario.
//!
//! Pure: no I/O, no state. Runs on a resolved `Scenario` and resolved
//! assumptions; `compute_record()` does the resolution for callers that
//! hold a raw `ScenarioRecord`.

use crate::{
    config::{resolve_assumptions, AssumptionOverrides, CountryCostAssumptions, OccupancyAssumptions},
    error::EngineResult,
    scenario::{ApartmentLayout, Layout, MixedLayout, Scenario, ScenarioRecord, SingleFamilyLayout},
    types::{ratio_or_zero, BudgetRange, BudgetStatus, DensityClass, InfrastructureStatus},
};
use serde::{Deserialize, Serialize};

/// Flat infrastructure allowance per unit. The scenario's itemized
/// infrastructure costs feed visualization only.
pub const INFRASTRUCTURE_COST_PER_UNIT: f64 = 15_000.0;
pub const SOFT_COST_RATE: f64 = 0.15;
pub const CONTINGENCY_RATE: f64 = 0.10;
/// Floor area assumed per unit in mixed developments, m².
pub const MIXED_UNIT_AREA: f64 = 60.0;

const SQM_PER_HECTARE: f64 = crate::project::SQM_PER_HECTARE;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitCounts {
    pub one_bedroom: u32,
    pub two_bedroom: u32,
    pub three_bedroom: u32,
    pub single_family: u32,
}

impl UnitCounts {
    pub fn total(&self) -> u32 {
        self.one_bedroom + self.two_bedroom + self.three_bedroom + self.single_family
    }
}

/// Derived snapshot for one scenario. Replaced, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioResults {
    pub total_units: u32,
    pub unit_counts: UnitCounts,
    pub estimated_population: u64,
    pub built_up_area: f64,
    pub land_coverage_percentage: f64,
    pub density_per_hectare: f64,
    pub density_class: DensityClass,
    // Costs
    pub construction_cost: f64,
    pub infrastructure_cost: f64,
    pub soft_costs: f64,
    pub contingency: f64,
    pub total_project_cost: f64,
    pub cost_per_unit: f64,
    pub cost_per_person: f64,
    pub budget_status: BudgetStatus,
    // Daily infrastructure demand
    pub daily_water_liters: f64,
    pub daily_electricity_kwh: f64,
    pub daily_waste_kg: f64,
    pub infrastructure_status: InfrastructureStatus,
}

struct LayoutMetrics {
    unit_counts: UnitCounts,
    total_units: u32,
    population: f64,
    built_up_area: f64,
}

/// Resolve `record` against the country data plus overrides, then compute.
pub fn compute_record(
    record: &ScenarioRecord,
    budget: &BudgetRange,
    land_size_hectares: f64,
    country: &CountryCostAssumptions,
    project_overrides: Option<&AssumptionOverrides>,
) -> EngineResult<ScenarioResults> {
    let assumptions =
        resolve_assumptions(country, project_overrides, record.assumption_overrides.as_ref());
    let scenario = Scenario::from_record(record, &assumptions)?;
    Ok(compute(&scenario, budget, land_size_hectares, &assumptions))
}

/// Compute results for a resolved scenario.
///
/// `land_size_hectares` is scaled by 10 000 into square meters for the
/// land-coverage ratio.
pub fn compute(
    scenario: &Scenario,
    budget: &BudgetRange,
    land_size_hectares: f64,
    assumptions: &CountryCostAssumptions,
) -> ScenarioResults {
    let occupancy = &assumptions.occupancy;
    let metrics = match &scenario.layout {
        Layout::Apartment(a) => apartment_metrics(a, occupancy),
        Layout::SingleFamily(s) => single_family_metrics(s, occupancy),
        Layout::Mixed(m) => mixed_metrics(m, occupancy),
    };

    let total_units = metrics.total_units;
    let estimated_population = metrics.population.max(0.0).round() as u64;
    let built_up_area = metrics.built_up_area;

    // ── Costs ──────────────────────────────────────────────────
    let construction_cost = built_up_area * scenario.costs.construction_cost_per_sqm;
    let infrastructure_cost = total_units as f64 * INFRASTRUCTURE_COST_PER_UNIT;
    let subtotal = construction_cost + infrastructure_cost;
    let soft_costs = subtotal * SOFT_COST_RATE;
    let contingency = subtotal * CONTINGENCY_RATE;
    let total_project_cost = subtotal + soft_costs + contingency;

    let cost_per_unit = ratio_or_zero(total_project_cost, total_units as f64);
    let cost_per_person = ratio_or_zero(total_project_cost, estimated_population as f64);

    // ── Density ────────────────────────────────────────────────
    let density_per_hectare = ratio_or_zero(total_units as f64, built_up_area / SQM_PER_HECTARE);
    let density_class = classify_density(density_per_hectare, assumptions);

    let land_coverage_percentage = if built_up_area == 0.0 {
        0.0
    } else {
        ratio_or_zero(built_up_area, land_size_hectares * SQM_PER_HECTARE) * 100.0
    };

    // ── Infrastructure demand ──────────────────────────────────
    let utility = &assumptions.utility_consumption;
    let population = estimated_population as f64;
    let daily_water_liters = population * utility.water_liters_per_person;
    let daily_electricity_kwh = population * utility.electricity_kwh_per_person;
    let daily_waste_kg = population * utility.waste_kg_per_person;
    let infrastructure_status =
        classify_infrastructure(daily_water_liters, population, assumptions);

    let budget_status = budget.status_of(total_project_cost);

    log::debug!(
        "{}: units={} pop={} area={:.0}m² cost={:.0} ({:?}) density={:.1}/ha ({:?}) infra={:?}",
        scenario.name,
        total_units,
        estimated_population,
        built_up_area,
        total_project_cost,
        budget_status,
        density_per_hectare,
        density_class,
        infrastructure_status
    );

    ScenarioResults {
        total_units,
        unit_counts: metrics.unit_counts,
        estimated_population,
        built_up_area,
        land_coverage_percentage,
        density_per_hectare,
        density_class,
        construction_cost,
        infrastructure_cost,
        soft_costs,
        contingency,
        total_project_cost,
        cost_per_unit,
        cost_per_person,
        budget_status,
        daily_water_liters,
        daily_electricity_kwh,
        daily_waste_kg,
        infrastructure_status,
    }
}

fn apartment_metrics(a: &ApartmentLayout, occupancy: &OccupancyAssumptions) -> LayoutMetrics {
    let total_units = a.units_per_floor.saturating_mul(a.number_of_floors);
    let one_bedroom = share_of(total_units, a.unit_mix.one_bedroom);
    let two_bedroom = share_of(total_units, a.unit_mix.two_bedroom).min(total_units - one_bedroom);
    // Third bucket absorbs the rounding remainder.
    let three_bedroom = total_units - one_bedroom - two_bedroom;

    let population = one_bedroom as f64 * occupancy.one_bedroom
        + two_bedroom as f64 * occupancy.two_bedroom
        + three_bedroom as f64 * occupancy.three_bedroom;

    let built_up_area =
        total_units as f64 * a.unit_size * (1.0 + a.shared_space_percentage / 100.0);

    LayoutMetrics {
        unit_counts: UnitCounts {
            one_bedroom,
            two_bedroom,
            three_bedroom,
            single_family: 0,
        },
        total_units,
        population,
        built_up_area,
    }
}

fn single_family_metrics(
    s: &SingleFamilyLayout,
    occupancy: &OccupancyAssumptions,
) -> LayoutMetrics {
    let total_units = s.number_of_units;
    LayoutMetrics {
        unit_counts: UnitCounts {
            single_family: total_units,
            ..UnitCounts::default()
        },
        total_units,
        population: total_units as f64 * occupancy.single_family,
        built_up_area: total_units as f64 * s.house_size,
    }
}

fn mixed_metrics(m: &MixedLayout, occupancy: &OccupancyAssumptions) -> LayoutMetrics {
    let total_units = m.number_of_units;
    let single_family = m.single_family_units.min(total_units);
    let apartments = total_units - single_family;
    let one_bedroom = (apartments as f64 / 2.0).round() as u32;
    let two_bedroom = apartments - one_bedroom;

    let persons_per_unit = (occupancy.one_bedroom + occupancy.two_bedroom) / 2.0;
    LayoutMetrics {
        unit_counts: UnitCounts {
            one_bedroom,
            two_bedroom,
            three_bedroom: 0,
            single_family,
        },
        total_units,
        population: total_units as f64 * persons_per_unit,
        built_up_area: total_units as f64 * MIXED_UNIT_AREA,
    }
}

/// `round(total × pct / 100)`, clamped into `[0, total]`.
fn share_of(total: u32, percentage: f64) -> u32 {
    let raw = (total as f64 * percentage / 100.0).round();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as u32).min(total)
    }
}

/// Highest band whose lower bound is exceeded; `low` otherwise.
pub fn classify_density(units_per_hectare: f64, assumptions: &CountryCostAssumptions) -> DensityClass {
    let t = &assumptions.density_thresholds;
    if units_per_hectare > t.very_high {
        DensityClass::VeryHigh
    } else if units_per_hectare > t.high {
        DensityClass::High
    } else if units_per_hectare > t.medium {
        DensityClass::Medium
    } else {
        DensityClass::Low
    }
}

/// Water is checked before population at each tier; either one trips it.
pub fn classify_infrastructure(
    daily_water_liters: f64,
    population: f64,
    assumptions: &CountryCostAssumptions,
) -> InfrastructureStatus {
    let t = &assumptions.infrastructure_thresholds;
    if daily_water_liters > t.exceeds.water_liters_per_day || population > t.exceeds.population {
        InfrastructureStatus::Exceeds
    } else if daily_water_liters > t.warning.water_liters_per_day
        || population > t.warning.population
    {
        InfrastructureStatus::Warning
    } else {
        InfrastructureStatus::Ok
    }
}
