//! The feasibility engine: wires the repository, the reference data and
//! the five computation components together.
//!
//! DATA FLOW (one way, never reordered):
//!   1. Load scenario + project from the repository.
//!   2. Resolve assumptions: scenario overrides → project overrides → country.
//!   3. Resolve the scenario record (defaults, structural checks).
//!   4. Compute ScenarioResults, or reuse the cached ones when the input
//!      fingerprint is unchanged.
//!   5. Feed the results, unmodified, to forecast / investment / timeline /
//!      compliance.
//!
//! RULES:
//!   - Computation modules never touch the repository.
//!   - Results are only ever written back whole, never patched.

use crate::{
    comparison::{self, ScenarioComparison, ScenarioSummary},
    compliance::{self, RegulatoryCompliance, RuleCatalog},
    config::{resolve_assumptions, AssumptionCatalog, CountryCostAssumptions},
    demand_forecast::{self, DemandForecast, ForecastHorizon},
    error::{EngineError, EngineResult},
    investment::{self, InvestmentResults, InvestmentScenario},
    project::Project,
    results_calculator::{self, ScenarioResults},
    scenario::{Scenario, ScenarioRecord},
    store::{ScenarioRepository, SqliteStore},
    timeline::{self, ProjectTimeline},
    types::{BudgetRange, BudgetStatus, InfrastructureStatus, ScenarioId},
};
use serde::Serialize;

/// Everything needed to compute one scenario.
pub struct PreparedScenario {
    pub record: ScenarioRecord,
    pub project: Project,
    pub assumptions: CountryCostAssumptions,
    pub scenario: Scenario,
}

impl PreparedScenario {
    /// Stable hash of every input the results depend on.
    pub fn fingerprint(&self) -> EngineResult<u32> {
        #[derive(Serialize)]
        struct Inputs<'a> {
            scenario: &'a Scenario,
            budget: &'a BudgetRange,
            land_size_hectares: f64,
            assumptions: &'a CountryCostAssumptions,
        }
        let json = serde_json::to_vec(&Inputs {
            scenario: &self.scenario,
            budget: &self.project.budget,
            land_size_hectares: self.project.land_area.hectares(),
            assumptions: &self.assumptions,
        })?;
        Ok(xxhash_rust::xxh32::xxh32(&json, 0))
    }

    fn compute(&self) -> ScenarioResults {
        results_calculator::compute(
            &self.scenario,
            &self.project.budget,
            self.project.land_area.hectares(),
            &self.assumptions,
        )
    }
}

pub struct FeasibilityEngine<R: ScenarioRepository> {
    pub assumptions: AssumptionCatalog,
    pub rules: RuleCatalog,
    store: R,
}

impl FeasibilityEngine<SqliteStore> {
    /// Build an engine on a migrated SQLite database and the data/ directory.
    pub fn build(db_path: &str, data_dir: &str) -> anyhow::Result<Self> {
        let store = SqliteStore::open(db_path)?;
        store.migrate()?;
        Ok(Self::new(
            store,
            AssumptionCatalog::load(data_dir)?,
            RuleCatalog::load(data_dir)?,
        ))
    }

    /// In-memory database with the hardcoded test catalogs.
    pub fn build_test() -> EngineResult<Self> {
        let store = SqliteStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(
            store,
            AssumptionCatalog::default_test(),
            RuleCatalog::default_test(),
        ))
    }
}

impl<R: ScenarioRepository> FeasibilityEngine<R> {
    pub fn new(store: R, assumptions: AssumptionCatalog, rules: RuleCatalog) -> Self {
        Self { assumptions, rules, store }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    fn load_project(&self, project_id: &str) -> EngineResult<Project> {
        self.store
            .get_project(project_id)?
            .ok_or_else(|| EngineError::not_found("project", project_id))
    }

    fn prepare_record(&self, record: ScenarioRecord, project: Project) -> EngineResult<PreparedScenario> {
        let country = self.assumptions.for_country(&project.country_code);
        let assumptions = resolve_assumptions(
            country,
            project.assumption_overrides.as_ref(),
            record.assumption_overrides.as_ref(),
        );
        let scenario = Scenario::from_record(&record, &assumptions)?;
        Ok(PreparedScenario { record, project, assumptions, scenario })
    }

    /// Load and resolve a stored scenario.
    pub fn prepare(&self, scenario_id: &str) -> EngineResult<PreparedScenario> {
        let record = self
            .store
            .get_scenario(scenario_id)?
            .ok_or_else(|| EngineError::not_found("scenario", scenario_id))?;
        let project = self.load_project(&record.project_id)?;
        self.prepare_record(record, project)
    }

    /// Results for a prepared scenario, recomputed only when its inputs
    /// changed since the cached results were written.
    fn results_for(&self, prepared: &PreparedScenario) -> EngineResult<ScenarioResults> {
        let fingerprint = prepared.fingerprint()?;
        if let (Some(cached), Some(stored)) =
            (&prepared.record.results, prepared.record.input_fingerprint)
        {
            if stored == fingerprint {
                log::debug!("Scenario {}: cached results are current", prepared.record.id);
                return Ok(cached.clone());
            }
        }

        let results = prepared.compute();
        if results.budget_status == BudgetStatus::Over {
            log::warn!(
                "Scenario {}: total cost {:.0} is over the {:.0} budget ceiling",
                prepared.record.id,
                results.total_project_cost,
                prepared.project.budget.max
            );
        }
        if results.infrastructure_status == InfrastructureStatus::Exceeds {
            log::warn!(
                "Scenario {}: infrastructure demand exceeds capacity ({:.0} L/day water)",
                prepared.record.id,
                results.daily_water_liters
            );
        }

        self.store.put_results(&prepared.record.id, &results, fingerprint)?;
        log::info!(
            "Scenario {}: results recomputed ({} units, cost {:.0})",
            prepared.record.id,
            results.total_units,
            results.total_project_cost
        );
        Ok(results)
    }

    /// Compute (or reuse) and store a scenario's results.
    pub fn evaluate_scenario(&self, scenario_id: &str) -> EngineResult<ScenarioResults> {
        let prepared = self.prepare(scenario_id)?;
        self.results_for(&prepared)
    }

    /// Evaluate every scenario of a project, in insertion order.
    pub fn evaluate_project(&self, project_id: &str) -> EngineResult<Vec<(ScenarioId, ScenarioResults)>> {
        let project = self.load_project(project_id)?;
        self.store
            .scenarios_for_project(project_id)?
            .into_iter()
            .map(|record| {
                let id = record.id.clone();
                let prepared = self.prepare_record(record, project.clone())?;
                Ok((id, self.results_for(&prepared)?))
            })
            .collect()
    }

    pub fn compare_scenarios(&self, project_id: &str) -> EngineResult<ScenarioComparison> {
        let project = self.load_project(project_id)?;
        let mut rows = Vec::new();
        for record in self.store.scenarios_for_project(project_id)? {
            let prepared = self.prepare_record(record, project.clone())?;
            let results = self.results_for(&prepared)?;
            rows.push(ScenarioSummary::new(&prepared.record, &results));
        }
        Ok(comparison::compare(project_id, rows))
    }

    /// Forecast housing demand from the project's current population and
    /// store it as the project's latest forecast.
    pub fn forecast_demand(
        &self,
        project_id: &str,
        annual_growth_pct: f64,
        horizon_years: u32,
    ) -> EngineResult<DemandForecast> {
        let horizon = ForecastHorizon::try_from(horizon_years)?;
        let project = self.load_project(project_id)?;
        let forecast = demand_forecast::forecast(
            &project.id,
            project.current_population,
            annual_growth_pct,
            horizon,
        );
        self.store.put_forecast(&forecast)?;
        Ok(forecast)
    }

    pub fn analyze_investment(
        &self,
        scenario_id: &str,
        investment: &InvestmentScenario,
    ) -> EngineResult<InvestmentResults> {
        let results = self.evaluate_scenario(scenario_id)?;
        Ok(investment::evaluate(investment, &results))
    }

    pub fn build_timeline(
        &self,
        scenario_id: &str,
        total_duration_months: u32,
    ) -> EngineResult<ProjectTimeline> {
        let results = self.evaluate_scenario(scenario_id)?;
        Ok(timeline::generate(Some(&results), total_duration_months))
    }

    /// Check a scenario against the rules for its project's location.
    pub fn check_compliance(&self, scenario_id: &str) -> EngineResult<RegulatoryCompliance> {
        let prepared = self.prepare(scenario_id)?;
        let results = self.results_for(&prepared)?;
        let rules = self
            .rules
            .rules_for(&prepared.project.country_code, prepared.project.city.as_deref());
        Ok(compliance::evaluate(&prepared.scenario, &results, &rules))
    }
}
