//! Store methods for demand forecasts (latest per project).

use super::{now, SqliteStore};
use crate::{demand_forecast::DemandForecast, error::EngineResult};
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    pub(super) fn save_forecast(&self, forecast: &DemandForecast) -> EngineResult<()> {
        let payload = serde_json::to_string(forecast)?;
        self.conn.execute(
            "INSERT INTO demand_forecast (project_id, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(project_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![forecast.project_id, payload, now()],
        )?;
        Ok(())
    }

    pub(super) fn load_forecast(&self, project_id: &str) -> EngineResult<Option<DemandForecast>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM demand_forecast WHERE project_id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(Into::into))
            .transpose()
    }
}
