use chrono::{Duration, SecondsFormat, TimeZone, Utc};
use logvault_core::model::{LogEntry, Project, Stream};

/// Deterministic entries with sortable millisecond timestamps, 250ms apart.
pub fn sample_entries(n: usize) -> Vec<LogEntry> {
    let base = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| LogEntry {
            timestamp: (base + Duration::milliseconds(i as i64 * 250))
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            level: "INFO".to_string(),
            component: "api".to_string(),
            message: format!("request {i} handled"),
            raw: None,
            stream_id: Some("stdout".to_string()),
        })
        .collect()
}

pub fn sample_project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: "sample project".to_string(),
        location: "local".to_string(),
        streams: vec![
            Stream {
                id: "stdout".to_string(),
                name: "stdout".to_string(),
            },
            Stream {
                id: "stderr".to_string(),
                name: "stderr".to_string(),
            },
        ],
        source_config: serde_json::json!({
            "path": "/var/log/app.log",
            "follow": true,
        }),
    }
}
