//! Store methods for projects.

use super::{now, SqliteStore};
use crate::{error::EngineResult, project::Project};
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    pub(super) fn save_project(&self, project: &Project) -> EngineResult<()> {
        let payload = serde_json::to_string(project)?;
        self.conn.execute(
            "INSERT INTO project (id, name, country, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                country = excluded.country,
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![project.id, project.name, project.country_code, payload, now()],
        )?;
        Ok(())
    }

    pub(super) fn load_project(&self, id: &str) -> EngineResult<Option<Project>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM project WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(Into::into))
            .transpose()
    }

    pub(super) fn remove_project(&self, id: &str) -> EngineResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM project WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Number of stored projects (for tests and summaries).
    pub fn project_count(&self) -> EngineResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM project", [], |row| row.get(0))?;
        Ok(count)
    }
}
