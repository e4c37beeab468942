//! Projects: the site, budget and location a set of scenarios shares.

use crate::{
    config::AssumptionOverrides,
    types::{new_id, BudgetRange, CountryCode, ProjectId},
};
use serde::{Deserialize, Serialize};

pub const SQM_PER_HECTARE: f64 = 10_000.0;
pub const HECTARES_PER_ACRE: f64 = 0.404_685_642_24;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    Sqm,
    Hectares,
    Acres,
}

/// A land parcel size as entered by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LandArea {
    pub value: f64,
    pub unit: AreaUnit,
}

impl LandArea {
    pub fn hectares(&self) -> f64 {
        match self.unit {
            AreaUnit::Sqm => self.value / SQM_PER_HECTARE,
            AreaUnit::Hectares => self.value,
            AreaUnit::Acres => self.value * HECTARES_PER_ACRE,
        }
    }

    pub fn square_meters(&self) -> f64 {
        self.hectares() * SQM_PER_HECTARE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub country_code: CountryCode,
    #[serde(default)]
    pub city: Option<String>,
    pub budget: BudgetRange,
    pub land_area: LandArea,
    /// Population of the served area today; seeds the demand forecast.
    #[serde(default)]
    pub current_population: u64,
    #[serde(default)]
    pub assumption_overrides: Option<AssumptionOverrides>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        country_code: impl Into<CountryCode>,
        budget: BudgetRange,
        land_area: LandArea,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            country_code: country_code.into(),
            city: None,
            budget,
            land_area,
            current_population: 0,
            assumption_overrides: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.current_population = population;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn land_area_converts_to_hectares() {
        let sqm = LandArea { value: 25_000.0, unit: AreaUnit::Sqm };
        assert_eq!(sqm.hectares(), 2.5);

        let acres = LandArea { value: 1.0, unit: AreaUnit::Acres };
        assert!((acres.square_meters() - 4_046.856_422_4).abs() < 1e-6);

        let ha = LandArea { value: 3.0, unit: AreaUnit::Hectares };
        assert_eq!(ha.square_meters(), 30_000.0);
    }
}
