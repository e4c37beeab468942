//! Housing demand forecast: compound population growth over 5, 10
//! or 20 years, converted to households.

use crate::{
    error::{EngineError, EngineResult},
    types::ProjectId,
};
use serde::{Deserialize, Serialize};

/// Persons per household used to turn population into housing units.
pub const AVERAGE_HOUSEHOLD_SIZE: f64 = 3.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub enum ForecastHorizon {
    FiveYears,
    TenYears,
    TwentyYears,
}

impl ForecastHorizon {
    pub fn years(self) -> u32 {
        match self {
            ForecastHorizon::FiveYears => 5,
            ForecastHorizon::TenYears => 10,
            ForecastHorizon::TwentyYears => 20,
        }
    }
}

impl TryFrom<u32> for ForecastHorizon {
    type Error = EngineError;

    fn try_from(years: u32) -> EngineResult<Self> {
        match years {
            5 => Ok(ForecastHorizon::FiveYears),
            10 => Ok(ForecastHorizon::TenYears),
            20 => Ok(ForecastHorizon::TwentyYears),
            other => Err(EngineError::Configuration(format!(
                "forecast horizon must be 5, 10 or 20 years, got {other}"
            ))),
        }
    }
}

impl From<ForecastHorizon> for u32 {
    fn from(h: ForecastHorizon) -> u32 {
        h.years()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearProjection {
    pub year: u32,
    pub population: u64,
    pub housing_demand: u64,
    /// Demand growth over the year-0 baseline, in units.
    pub surplus_shortfall: i64,
}

impl YearProjection {
    /// Units still needed after `supply` new units are delivered.
    /// Negative means oversupply.
    pub fn unmet_demand(&self, supply: u32) -> i64 {
        self.housing_demand as i64 - supply as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandForecast {
    pub project_id: ProjectId,
    pub current_population: u64,
    pub annual_growth_rate: f64,
    pub time_horizon: ForecastHorizon,
    pub projections: Vec<YearProjection>,
}

impl DemandForecast {
    pub fn final_year(&self) -> Option<&YearProjection> {
        self.projections.last()
    }
}

/// Households for a population, rounded to whole units.
pub fn housing_units_for(population: f64) -> u64 {
    (population / AVERAGE_HOUSEHOLD_SIZE).round().max(0.0) as u64
}

/// Project population and housing demand for each year of the horizon.
///
/// Each year is computed directly from `current_population`, so rounding
/// never compounds.
pub fn forecast(
    project_id: &str,
    current_population: u64,
    annual_growth_pct: f64,
    horizon: ForecastHorizon,
) -> DemandForecast {
    let base = current_population as f64;
    let growth = 1.0 + annual_growth_pct / 100.0;
    let baseline_demand = housing_units_for(base) as i64;

    let projections = (1..=horizon.years())
        .map(|year| {
            let population = base * growth.powi(year as i32);
            let housing_demand = housing_units_for(population);
            YearProjection {
                year,
                population: population.round().max(0.0) as u64,
                housing_demand,
                surplus_shortfall: housing_demand as i64 - baseline_demand,
            }
        })
        .collect();

    DemandForecast {
        project_id: project_id.to_string(),
        current_population,
        annual_growth_rate: annual_growth_pct,
        time_horizon: horizon,
        projections,
    }
}
