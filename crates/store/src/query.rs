use duckdb::params_from_iter;
use duckdb::types::Value;
use logvault_core::error::{LogVaultError, Result};
use logvault_core::model::LogRecord;
use logvault_core::query::{LogQuery, LogQueryResponse};

use crate::Store;

impl Store {
    /// Runs a filter specification against the log table: an independent
    /// count first, then a bounded fetch ordered newest-first.
    ///
    /// The count and the fetch share one filter but are two statements, so
    /// `total` may be stale relative to writes that land in between. That
    /// is acceptable for an inspection surface and is not reconciled.
    pub fn query_logs(&self, query: &LogQuery) -> Result<LogQueryResponse> {
        let total = self.count_logs(query)?;
        let logs = self.fetch_logs(query)?;
        let has_more = total > query.skip + logs.len();
        Ok(LogQueryResponse {
            logs,
            total,
            has_more,
        })
    }

    pub fn count_logs(&self, query: &LogQuery) -> Result<usize> {
        let (where_sql, args) = build_filter(query);
        let sql = format!("SELECT COUNT(*) FROM logs WHERE {where_sql}");

        let conn = self.conn();
        conn.query_row(&sql, params_from_iter(args.iter()), |row| {
            row.get::<_, i64>(0)
        })
        .map(|v| v as usize)
        .map_err(|e| LogVaultError::Store(format!("count logs failed: {e}")))
    }

    pub fn fetch_logs(&self, query: &LogQuery) -> Result<Vec<LogRecord>> {
        let (where_sql, args) = build_filter(query);
        let sql = format!(
            "SELECT project_id, ts, level, component, message, raw, stream_id
             FROM logs
             WHERE {where_sql}
             ORDER BY ts DESC
             LIMIT {} OFFSET {}",
            query.limit, query.skip
        );

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| LogVaultError::Store(format!("prepare fetch failed: {e}")))?;

        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(LogRecord {
                    project_id: row.get::<_, String>(0)?,
                    timestamp: row.get::<_, String>(1)?,
                    level: row.get::<_, String>(2)?,
                    component: row.get::<_, String>(3)?,
                    message: row.get::<_, String>(4)?,
                    raw: row.get::<_, Option<String>>(5)?,
                    stream_id: row.get::<_, Option<String>>(6)?,
                })
            })
            .map_err(|e| LogVaultError::Store(format!("query logs failed: {e}")))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| LogVaultError::Store(format!("map log row failed: {e}")))?);
        }
        Ok(results)
    }
}

/// Builds the WHERE clause from the parts of the filter that are present.
/// Absent filters contribute nothing; they are never matched against empty
/// or null column values.
fn build_filter(query: &LogQuery) -> (String, Vec<Value>) {
    let mut parts = vec!["project_id = ?".to_string()];
    let mut args = vec![Value::Text(query.project_id.clone())];

    if let Some(levels) = &query.levels
        && !levels.is_empty()
    {
        let placeholders = vec!["?"; levels.len()].join(", ");
        parts.push(format!("level IN ({placeholders})"));
        args.extend(levels.iter().cloned().map(Value::Text));
    }
    if let Some(start) = &query.start {
        parts.push("ts >= ?".to_string());
        args.push(Value::Text(start.clone()));
    }
    if let Some(end) = &query.end {
        parts.push("ts <= ?".to_string());
        args.push(Value::Text(end.clone()));
    }
    if let Some(search) = &query.search {
        let needle = format!("%{}%", escape_like(&search.to_lowercase()));
        parts.push(
            "(lower(message) LIKE ? ESCAPE '\\' \
             OR lower(coalesce(raw, '')) LIKE ? ESCAPE '\\' \
             OR lower(component) LIKE ? ESCAPE '\\')"
                .to_string(),
        );
        args.push(Value::Text(needle.clone()));
        args.push(Value::Text(needle.clone()));
        args.push(Value::Text(needle));
    }

    (parts.join(" AND "), args)
}

/// Escapes LIKE metacharacters so the search term is a plain substring.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use logvault_core::model::LogRecord;
    use logvault_core::query::LogQuery;

    use crate::Store;

    fn record(project_id: &str, ts: &str, level: &str, message: &str) -> LogRecord {
        LogRecord {
            project_id: project_id.into(),
            timestamp: ts.into(),
            level: level.into(),
            component: "api".into(),
            message: message.into(),
            raw: None,
            stream_id: None,
        }
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_logs(&[
                record("p1", "2026-02-01T00:00:00Z", "INFO", "started"),
                record("p1", "2026-02-01T00:00:01Z", "WARN", "slow response"),
                record("p1", "2026-02-01T00:00:02Z", "ERROR", "redis Timeout"),
                record("p1", "2026-02-01T00:00:03Z", "INFO", "recovered"),
                record("p2", "2026-02-01T00:00:04Z", "ERROR", "other project timeout"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn scopes_to_project() {
        let store = seeded_store();
        let res = store.query_logs(&LogQuery::for_project("p1")).unwrap();
        assert_eq!(res.total, 4);
        assert!(res.logs.iter().all(|l| l.project_id == "p1"));
    }

    #[test]
    fn orders_newest_first() {
        let store = seeded_store();
        let res = store.query_logs(&LogQuery::for_project("p1")).unwrap();
        assert_eq!(res.logs[0].message, "recovered");
        assert_eq!(res.logs[3].message, "started");
    }

    #[test]
    fn level_set_membership() {
        let store = seeded_store();
        let res = store
            .query_logs(&LogQuery {
                levels: Some(vec!["ERROR".into(), "WARN".into()]),
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.total, 2);
        assert!(res.logs.iter().all(|l| l.level == "ERROR" || l.level == "WARN"));
    }

    #[test]
    fn time_window_is_inclusive_both_ends() {
        let store = seeded_store();
        let res = store
            .query_logs(&LogQuery {
                start: Some("2026-02-01T00:00:01Z".into()),
                end: Some("2026-02-01T00:00:02Z".into()),
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.total, 2);
        assert_eq!(res.logs[0].timestamp, "2026-02-01T00:00:02Z");
        assert_eq!(res.logs[1].timestamp, "2026-02-01T00:00:01Z");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = seeded_store();
        let res = store
            .query_logs(&LogQuery {
                search: Some("timeout".into()),
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.total, 1);
        assert_eq!(res.logs[0].message, "redis Timeout");
    }

    #[test]
    fn search_covers_raw_and_component() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_logs(&[
                LogRecord {
                    raw: Some("raw NEEDLE line".into()),
                    ..record("p1", "2026-02-01T00:00:00Z", "INFO", "plain")
                },
                LogRecord {
                    component: "needle-svc".into(),
                    ..record("p1", "2026-02-01T00:00:01Z", "INFO", "plain")
                },
                record("p1", "2026-02-01T00:00:02Z", "INFO", "plain"),
            ])
            .unwrap();

        let res = store
            .query_logs(&LogQuery {
                search: Some("needle".into()),
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.total, 2);
    }

    #[test]
    fn search_escapes_like_metacharacters() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_logs(&[
                record("p1", "2026-02-01T00:00:00Z", "INFO", "usage at 100% now"),
                record("p1", "2026-02-01T00:00:01Z", "INFO", "usage at 100 now"),
            ])
            .unwrap();

        let res = store
            .query_logs(&LogQuery {
                search: Some("100%".into()),
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.total, 1);
        assert_eq!(res.logs[0].message, "usage at 100% now");
    }

    #[test]
    fn zero_matches_yield_empty_response() {
        let store = seeded_store();
        let res = store
            .query_logs(&LogQuery {
                search: Some("no such text".into()),
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.total, 0);
        assert!(res.logs.is_empty());
        assert!(!res.has_more);
    }

    #[test]
    fn pagination_invariant_holds() {
        let store = Store::open_in_memory().unwrap();
        let logs = (0..25)
            .map(|i| record("p1", &format!("2026-02-01T00:00:{i:02}Z"), "INFO", "timeout"))
            .collect::<Vec<_>>();
        store.insert_logs(&logs).unwrap();

        let page = |limit, skip| {
            store
                .query_logs(&LogQuery {
                    search: Some("timeout".into()),
                    limit,
                    skip,
                    ..LogQuery::for_project("p1")
                })
                .unwrap()
        };

        let first = page(10, 0);
        assert_eq!(first.logs.len(), 10);
        assert_eq!(first.total, 25);
        assert!(first.has_more);

        let last = page(10, 20);
        assert_eq!(last.logs.len(), 5);
        assert_eq!(last.total, 25);
        assert!(!last.has_more);

        for (limit, skip) in [(1usize, 0usize), (25, 0), (10, 24), (50, 25)] {
            let res = page(limit, skip);
            assert_eq!(res.has_more, res.total > skip + res.logs.len());
        }
    }

    #[test]
    fn skip_offsets_into_ordered_results() {
        let store = seeded_store();
        let res = store
            .query_logs(&LogQuery {
                limit: 2,
                skip: 1,
                ..LogQuery::for_project("p1")
            })
            .unwrap();
        assert_eq!(res.logs.len(), 2);
        assert_eq!(res.logs[0].message, "redis Timeout");
        assert!(res.has_more);
    }
}
