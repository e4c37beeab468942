//! Store methods for scenarios and their embedded results.

use super::{now, SqliteStore};
use crate::{error::EngineResult, scenario::ScenarioRecord};
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    pub(super) fn save_scenario(&self, scenario: &ScenarioRecord) -> EngineResult<()> {
        let payload = serde_json::to_string(scenario)?;
        self.conn.execute(
            "INSERT INTO scenario (id, project_id, name, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                name = excluded.name,
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![scenario.id, scenario.project_id, scenario.name, payload, now()],
        )?;
        Ok(())
    }

    pub(super) fn load_scenario(&self, id: &str) -> EngineResult<Option<ScenarioRecord>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM scenario WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(Into::into))
            .transpose()
    }

    pub(super) fn remove_scenario(&self, id: &str) -> EngineResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM scenario WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    pub(super) fn load_project_scenarios(
        &self,
        project_id: &str,
    ) -> EngineResult<Vec<ScenarioRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM scenario
             WHERE project_id = ?1
             ORDER BY rowid ASC",
        )?;
        let payloads = stmt
            .query_map(params![project_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(Into::into))
            .collect()
    }

    /// Number of scenarios stored for a project (for tests and summaries).
    pub fn scenario_count(&self, project_id: &str) -> EngineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM scenario WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
