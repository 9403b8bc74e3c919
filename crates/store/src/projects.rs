use duckdb::params;
use logvault_core::error::{LogVaultError, Result};
use logvault_core::model::{Project, ProjectSpec, Stream};

use crate::Store;

impl Store {
    pub fn insert_project(&self, project: &Project) -> Result<()> {
        let streams = encode_streams(&project.streams)?;
        let source_config = encode_source_config(&project.source_config)?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO projects (id, name, description, location, streams_json, source_config_json)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                project.id,
                project.name,
                project.description,
                project.location,
                streams,
                source_config,
            ],
        )
        .map_err(|e| LogVaultError::Store(format!("insert project failed: {e}")))?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let conn = self.conn();
        let result = conn.query_row(
            "SELECT id, name, description, location, streams_json, source_config_json
             FROM projects WHERE id = ?",
            params![id],
            map_project_row,
        );

        match result {
            Ok(project) => Ok(Some(project?)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(LogVaultError::Store(format!("get project failed: {e}"))),
        }
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, location, streams_json, source_config_json
                 FROM projects ORDER BY name ASC",
            )
            .map_err(|e| LogVaultError::Store(format!("prepare list projects failed: {e}")))?;

        let rows = stmt
            .query_map([], map_project_row)
            .map_err(|e| LogVaultError::Store(format!("list projects failed: {e}")))?;

        let mut projects = Vec::new();
        for row in rows {
            let project =
                row.map_err(|e| LogVaultError::Store(format!("map project row failed: {e}")))?;
            projects.push(project?);
        }
        Ok(projects)
    }

    pub fn update_project(&self, id: &str, spec: ProjectSpec) -> Result<Project> {
        let streams = encode_streams(&spec.streams)?;
        let source_config = encode_source_config(&spec.source_config)?;

        let affected = {
            let conn = self.conn();
            conn.execute(
                "UPDATE projects
                 SET name = ?, description = ?, location = ?, streams_json = ?, source_config_json = ?
                 WHERE id = ?",
                params![
                    spec.name,
                    spec.description,
                    spec.location,
                    streams,
                    source_config,
                    id,
                ],
            )
            .map_err(|e| LogVaultError::Store(format!("update project failed: {e}")))?
        };

        if affected == 0 {
            return Err(LogVaultError::NotFound(format!("project {id}")));
        }
        Ok(spec.into_project(id.to_string()))
    }

    /// Deletes a project and everything it owns, children first.
    ///
    /// The two legs are independent operations, not a transaction: if the
    /// parent delete fails after the records are gone, the caller sees a
    /// `CascadeDelete` error and may simply retry — orphaned records have
    /// no value and a re-run is harmless. Returns the number of records
    /// removed.
    pub fn delete_project(&self, id: &str) -> Result<usize> {
        if self.get_project(id)?.is_none() {
            return Err(LogVaultError::NotFound(format!("project {id}")));
        }

        let logs_deleted = self
            .delete_logs_for_project(id)
            .map_err(|e| LogVaultError::CascadeDelete(format!("record deletion leg: {e}")))?;

        let conn = self.conn();
        conn.execute("DELETE FROM projects WHERE id = ?", params![id])
            .map_err(|e| LogVaultError::CascadeDelete(format!("project deletion leg: {e}")))?;

        Ok(logs_deleted)
    }
}

type ProjectRow = (String, String, String, String, String, String);

fn map_project_row(row: &duckdb::Row<'_>) -> duckdb::Result<Result<Project>> {
    let raw: ProjectRow = (
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    );
    Ok(decode_project(raw))
}

fn decode_project(raw: ProjectRow) -> Result<Project> {
    let (id, name, description, location, streams_json, source_config_json) = raw;
    let streams: Vec<Stream> = serde_json::from_str(&streams_json)
        .map_err(|e| LogVaultError::Internal(format!("corrupt streams column: {e}")))?;
    let source_config = serde_json::from_str(&source_config_json)
        .map_err(|e| LogVaultError::Internal(format!("corrupt source config column: {e}")))?;

    Ok(Project {
        id,
        name,
        description,
        location,
        streams,
        source_config,
    })
}

fn encode_streams(streams: &[Stream]) -> Result<String> {
    serde_json::to_string(streams)
        .map_err(|e| LogVaultError::Internal(format!("encode streams failed: {e}")))
}

fn encode_source_config(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| LogVaultError::Internal(format!("encode source config failed: {e}")))
}
