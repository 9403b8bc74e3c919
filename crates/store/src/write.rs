use duckdb::params;
use logvault_core::error::{LogVaultError, Result};
use logvault_core::model::LogRecord;
use tracing::warn;

use crate::Store;

impl Store {
    /// Writes one batch of records in a single durability call.
    ///
    /// Insert semantics are unordered: a record that the store rejects is
    /// logged and skipped, the rest of the batch proceeds. The returned
    /// count is the number of rows actually inserted. A batch that cannot
    /// begin or commit fails as a whole.
    pub fn insert_logs(&self, logs: &[LogRecord]) -> Result<usize> {
        if logs.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| LogVaultError::Store(format!("begin tx failed: {e}")))?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO logs (id, project_id, ts, level, component, message, raw, stream_id)
                     VALUES (nextval('logs_id_seq'), ?, ?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| LogVaultError::Store(format!("prepare insert logs failed: {e}")))?;

            for log in logs {
                match stmt.execute(params![
                    log.project_id,
                    log.timestamp,
                    log.level,
                    log.component,
                    log.message,
                    log.raw,
                    log.stream_id,
                ]) {
                    Ok(_) => inserted += 1,
                    Err(e) => {
                        warn!(project_id = %log.project_id, error = %e, "skipping rejected log record");
                    }
                }
            }
        }

        tx.commit()
            .map_err(|e| LogVaultError::Store(format!("commit logs failed: {e}")))?;
        Ok(inserted)
    }

    /// Removes every record owned by the given project, returning how many
    /// were deleted.
    pub fn delete_logs_for_project(&self, project_id: &str) -> Result<usize> {
        let conn = self.conn();
        conn.execute("DELETE FROM logs WHERE project_id = ?", params![project_id])
            .map_err(|e| LogVaultError::Store(format!("delete project logs failed: {e}")))
    }
}
