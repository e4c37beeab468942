//! Request/response surface: one request per computation component,
//! carrying the record shapes directly. No repository involved.
//!
//! Used by `feasibility-runner --ipc-mode` (one JSON request per line).

use crate::{
    compliance::{self, ComplianceRule, RegulatoryCompliance, RuleCatalog},
    config::{resolve_assumptions, AssumptionCatalog, AssumptionOverrides},
    demand_forecast::{self, DemandForecast, ForecastHorizon},
    error::EngineResult,
    investment::{self, InvestmentResults, InvestmentScenario},
    project::LandArea,
    results_calculator::{self, ScenarioResults},
    scenario::{Scenario, ScenarioRecord},
    timeline::{self, ProjectTimeline},
    types::{BudgetRange, CountryCode, ProjectId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineRequest {
    ComputeResults {
        scenario: ScenarioRecord,
        budget: BudgetRange,
        land_area: LandArea,
        country_code: CountryCode,
        #[serde(default)]
        project_overrides: Option<AssumptionOverrides>,
    },
    ForecastDemand {
        project_id: ProjectId,
        current_population: u64,
        annual_growth_rate: f64,
        time_horizon: ForecastHorizon,
    },
    EvaluateInvestment {
        investment: InvestmentScenario,
        results: ScenarioResults,
    },
    GenerateTimeline {
        #[serde(default)]
        results: Option<ScenarioResults>,
        total_duration_months: u32,
    },
    EvaluateCompliance {
        scenario: ScenarioRecord,
        results: ScenarioResults,
        country_code: CountryCode,
        #[serde(default)]
        city: Option<String>,
        /// Explicit rules; the catalog's rules for the location otherwise.
        #[serde(default)]
        rules: Option<Vec<ComplianceRule>>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineResponse {
    Results { results: ScenarioResults },
    Forecast { forecast: DemandForecast },
    Investment { investment: InvestmentResults },
    Timeline { timeline: ProjectTimeline },
    Compliance { compliance: RegulatoryCompliance },
    Error { message: String },
}

/// Answer one request. Failures become `EngineResponse::Error`.
pub fn handle_request(
    assumptions: &AssumptionCatalog,
    rules: &RuleCatalog,
    request: EngineRequest,
) -> EngineResponse {
    match dispatch(assumptions, rules, request) {
        Ok(response) => response,
        Err(e) => EngineResponse::Error { message: e.to_string() },
    }
}

fn dispatch(
    assumptions: &AssumptionCatalog,
    rules: &RuleCatalog,
    request: EngineRequest,
) -> EngineResult<EngineResponse> {
    let response = match request {
        EngineRequest::ComputeResults {
            scenario,
            budget,
            land_area,
            country_code,
            project_overrides,
        } => {
            let results = results_calculator::compute_record(
                &scenario,
                &budget,
                land_area.hectares(),
                assumptions.for_country(&country_code),
                project_overrides.as_ref(),
            )?;
            EngineResponse::Results { results }
        }
        EngineRequest::ForecastDemand {
            project_id,
            current_population,
            annual_growth_rate,
            time_horizon,
        } => EngineResponse::Forecast {
            forecast: demand_forecast::forecast(
                &project_id,
                current_population,
                annual_growth_rate,
                time_horizon,
            ),
        },
        EngineRequest::EvaluateInvestment { investment, results } => EngineResponse::Investment {
            investment: investment::evaluate(&investment, &results),
        },
        EngineRequest::GenerateTimeline {
            results,
            total_duration_months,
        } => EngineResponse::Timeline {
            timeline: timeline::generate(results.as_ref(), total_duration_months),
        },
        EngineRequest::EvaluateCompliance {
            scenario,
            results,
            country_code,
            city,
            rules: explicit_rules,
        } => {
            let resolved = resolve_assumptions(
                assumptions.for_country(&country_code),
                None,
                scenario.assumption_overrides.as_ref(),
            );
            let scenario = Scenario::from_record(&scenario, &resolved)?;
            let rules = explicit_rules
                .unwrap_or_else(|| rules.rules_for(&country_code, city.as_deref()));
            EngineResponse::Compliance {
                compliance: compliance::evaluate(&scenario, &results, &rules),
            }
        }
    };
    Ok(response)
}
