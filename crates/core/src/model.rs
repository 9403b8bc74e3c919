use serde::{Deserialize, Serialize};

/// A log line as it arrives on the wire, before the owning project is known.
///
/// Timestamps are carried as opaque sortable strings; the store orders and
/// windows them lexicographically, exactly as provided by the sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
}

impl LogEntry {
    pub fn into_record(self, project_id: &str) -> LogRecord {
        LogRecord {
            project_id: project_id.to_string(),
            timestamp: self.timestamp,
            level: self.level,
            component: self.component,
            message: self.message,
            raw: self.raw,
            stream_id: self.stream_id,
        }
    }
}

/// A persisted log record. Created once at ingestion time, immutable
/// thereafter, removed only when its owning project is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub project_id: String,
    pub timestamp: String,
    pub level: String,
    pub component: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
}

/// A named sub-channel within a project. Metadata only; records reference
/// streams by id without enforcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stream {
    pub id: String,
    pub name: String,
}

/// A logical namespace owning log records and stream definitions.
///
/// `source_config` is a consumer-defined blob and is stored verbatim,
/// never validated or interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub source_config: serde_json::Value,
}

/// Caller-supplied project fields for create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub source_config: serde_json::Value,
}

impl ProjectSpec {
    pub fn into_project(self, id: String) -> Project {
        Project {
            id,
            name: self.name,
            description: self.description,
            location: self.location,
            streams: self.streams,
            source_config: self.source_config,
        }
    }
}
