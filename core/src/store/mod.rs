//! Persistence: the repository contract and its SQLite implementation.
//!
//! RULE: Only the store talks to the database.
//! The computation modules never see it; `FeasibilityEngine` reads
//! inputs through `ScenarioRepository` and writes results back.

use crate::{
    demand_forecast::DemandForecast,
    error::{EngineError, EngineResult},
    project::Project,
    results_calculator::ScenarioResults,
    scenario::ScenarioRecord,
};
use rusqlite::Connection;

mod forecast;
mod project;
mod scenario;

/// Read/write access to projects, scenarios and forecasts by id.
pub trait ScenarioRepository {
    fn get_project(&self, id: &str) -> EngineResult<Option<Project>>;
    fn put_project(&self, project: &Project) -> EngineResult<()>;
    /// Also removes the project's scenarios and forecast.
    fn delete_project(&self, id: &str) -> EngineResult<bool>;

    fn get_scenario(&self, id: &str) -> EngineResult<Option<ScenarioRecord>>;
    fn put_scenario(&self, scenario: &ScenarioRecord) -> EngineResult<()>;
    fn delete_scenario(&self, id: &str) -> EngineResult<bool>;
    /// In insertion order.
    fn scenarios_for_project(&self, project_id: &str) -> EngineResult<Vec<ScenarioRecord>>;

    fn get_forecast(&self, project_id: &str) -> EngineResult<Option<DemandForecast>>;
    fn put_forecast(&self, forecast: &DemandForecast) -> EngineResult<()>;

    /// Replace the cached results embedded in a scenario.
    fn put_results(
        &self,
        scenario_id: &str,
        results: &ScenarioResults,
        fingerprint: u32,
    ) -> EngineResult<()> {
        let mut record = self
            .get_scenario(scenario_id)?
            .ok_or_else(|| EngineError::not_found("scenario", scenario_id))?;
        record.results = Some(results.clone());
        record.input_fingerprint = Some(fingerprint);
        self.put_scenario(&record)
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl ScenarioRepository for SqliteStore {
    fn get_project(&self, id: &str) -> EngineResult<Option<Project>> {
        self.load_project(id)
    }

    fn put_project(&self, project: &Project) -> EngineResult<()> {
        self.save_project(project)
    }

    fn delete_project(&self, id: &str) -> EngineResult<bool> {
        self.remove_project(id)
    }

    fn get_scenario(&self, id: &str) -> EngineResult<Option<ScenarioRecord>> {
        self.load_scenario(id)
    }

    fn put_scenario(&self, scenario: &ScenarioRecord) -> EngineResult<()> {
        self.save_scenario(scenario)
    }

    fn delete_scenario(&self, id: &str) -> EngineResult<bool> {
        self.remove_scenario(id)
    }

    fn scenarios_for_project(&self, project_id: &str) -> EngineResult<Vec<ScenarioRecord>> {
        self.load_project_scenarios(project_id)
    }

    fn get_forecast(&self, project_id: &str) -> EngineResult<Option<DemandForecast>> {
        self.load_forecast(project_id)
    }

    fn put_forecast(&self, forecast: &DemandForecast) -> EngineResult<()> {
        self.save_forecast(forecast)
    }
}
