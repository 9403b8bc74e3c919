use serde::{Deserialize, Serialize};

use crate::model::{LogEntry, LogRecord};

/// Default fetch window when the caller does not specify a limit.
pub const DEFAULT_QUERY_LIMIT: usize = 50_000;

/// Filter specification for the log query engine.
///
/// Absent filters are omitted from the store query entirely; they never
/// match against empty or null values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogQuery {
    pub project_id: String,
    pub levels: Option<Vec<String>>,
    pub search: Option<String>,
    /// Inclusive lower timestamp bound, compared as provided.
    pub start: Option<String>,
    /// Inclusive upper timestamp bound, compared as provided.
    pub end: Option<String>,
    pub limit: usize,
    pub skip: usize,
}

impl LogQuery {
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            levels: None,
            search: None,
            start: None,
            end: None,
            limit: DEFAULT_QUERY_LIMIT,
            skip: 0,
        }
    }
}

/// Splits a comma-separated level list into a set for membership matching.
/// Returns `None` when the input holds no usable entries.
pub fn parse_levels(input: &str) -> Option<Vec<String>> {
    let levels = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    (!levels.is_empty()).then_some(levels)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQueryResponse {
    pub logs: Vec<LogRecord>,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectResponse {
    pub success: bool,
    pub logs_deleted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub db_path: String,
    pub db_size_bytes: u64,
    pub projects_count: usize,
    pub logs_count: usize,
    pub oldest_ts: Option<String>,
    pub newest_ts: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequest {
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub result: String,
}
