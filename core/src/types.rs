//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};

/// A stable, unique identifier for a project.
pub type ProjectId = String;

/// A stable, unique identifier for a scenario.
pub type ScenarioId = String;

/// ISO-style country code used to select reference data ("US", "KE", ...).
pub type CountryCode = String;

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Apartment,
    SingleFamily,
    Mixed,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishLevel {
    Basic,
    #[default]
    Standard,
    Improved,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Under,
    Within,
    Over,
}

/// Ordered low → very high; `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum DensityClass {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureStatus {
    Ok,
    Warning,
    Exceeds,
}

/// A project's declared budget range, in the project currency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `under` below `min`, `over` above `max`, otherwise `within`.
    pub fn status_of(&self, cost: f64) -> BudgetStatus {
        if cost < self.min {
            BudgetStatus::Under
        } else if cost > self.max {
            BudgetStatus::Over
        } else {
            BudgetStatus::Within
        }
    }
}

/// Divide, returning 0 when the denominator is zero.
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
