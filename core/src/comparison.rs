//! Side-by-side comparison of a project's scenarios.

use crate::{
    results_calculator::ScenarioResults,
    scenario::ScenarioRecord,
    types::{BudgetStatus, DensityClass, InfrastructureStatus, ProjectId, ProjectType, ScenarioId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    pub scenario_id: ScenarioId,
    pub name: String,
    pub project_type: ProjectType,
    pub total_units: u32,
    pub estimated_population: u64,
    pub total_project_cost: f64,
    pub cost_per_unit: f64,
    pub cost_per_person: f64,
    pub budget_status: BudgetStatus,
    pub density_class: DensityClass,
    pub infrastructure_status: InfrastructureStatus,
}

impl ScenarioSummary {
    pub fn new(record: &ScenarioRecord, results: &ScenarioResults) -> Self {
        Self {
            scenario_id: record.id.clone(),
            name: record.name.clone(),
            project_type: record.project_type,
            total_units: results.total_units,
            estimated_population: results.estimated_population,
            total_project_cost: results.total_project_cost,
            cost_per_unit: results.cost_per_unit,
            cost_per_person: results.cost_per_person,
            budget_status: results.budget_status,
            density_class: results.density_class,
            infrastructure_status: results.infrastructure_status,
        }
    }

    fn affordable(&self) -> bool {
        self.budget_status != BudgetStatus::Over
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioComparison {
    pub project_id: ProjectId,
    pub rows: Vec<ScenarioSummary>,
    /// Best picks among scenarios that are not over budget.
    pub lowest_cost_per_unit: Option<ScenarioId>,
    pub lowest_cost_per_person: Option<ScenarioId>,
    pub highest_population: Option<ScenarioId>,
}

/// Pick the best scenarios. Scenarios with no units (or nobody housed)
/// are skipped for the per-unit (per-person) picks. Ties go to the
/// earlier row.
pub fn compare(project_id: &str, rows: Vec<ScenarioSummary>) -> ScenarioComparison {
    let candidates = || rows.iter().filter(|r| r.affordable());

    let lowest_cost_per_unit = candidates()
        .filter(|r| r.total_units > 0)
        .fold(None::<&ScenarioSummary>, |best, r| match best {
            Some(b) if b.cost_per_unit <= r.cost_per_unit => Some(b),
            _ => Some(r),
        })
        .map(|r| r.scenario_id.clone());

    let lowest_cost_per_person = candidates()
        .filter(|r| r.estimated_population > 0)
        .fold(None::<&ScenarioSummary>, |best, r| match best {
            Some(b) if b.cost_per_person <= r.cost_per_person => Some(b),
            _ => Some(r),
        })
        .map(|r| r.scenario_id.clone());

    let highest_population = candidates()
        .filter(|r| r.estimated_population > 0)
        .fold(None::<&ScenarioSummary>, |best, r| match best {
            Some(b) if b.estimated_population >= r.estimated_population => Some(b),
            _ => Some(r),
        })
        .map(|r| r.scenario_id.clone());

    ScenarioComparison {
        project_id: project_id.to_string(),
        rows,
        lowest_cost_per_unit,
        lowest_cost_per_person,
        highest_population,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, cost_per_unit: f64, population: u64, status: BudgetStatus) -> ScenarioSummary {
        ScenarioSummary {
            scenario_id: id.into(),
            name: id.into(),
            project_type: ProjectType::Apartment,
            total_units: 10,
            estimated_population: population,
            total_project_cost: cost_per_unit * 10.0,
            cost_per_unit,
            cost_per_person: cost_per_unit * 10.0 / population.max(1) as f64,
            budget_status: status,
            density_class: DensityClass::Medium,
            infrastructure_status: InfrastructureStatus::Ok,
        }
    }

    #[test]
    fn ties_go_to_the_earlier_row() {
        let cmp = compare(
            "p",
            vec![
                row("a", 100.0, 30, BudgetStatus::Within),
                row("b", 100.0, 30, BudgetStatus::Under),
            ],
        );
        assert_eq!(cmp.lowest_cost_per_unit.as_deref(), Some("a"));
        assert_eq!(cmp.lowest_cost_per_person.as_deref(), Some("a"));
        assert_eq!(cmp.highest_population.as_deref(), Some("a"));
    }

    #[test]
    fn all_over_budget_means_no_picks() {
        let cmp = compare("p", vec![row("a", 100.0, 30, BudgetStatus::Over)]);
        assert_eq!(cmp.rows.len(), 1);
        assert!(cmp.lowest_cost_per_unit.is_none());
        assert!(cmp.highest_population.is_none());
    }
}
