pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT NOT NULL,
  location TEXT NOT NULL,
  streams_json TEXT NOT NULL,
  source_config_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS logs (
  id BIGINT PRIMARY KEY,
  project_id TEXT NOT NULL,
  ts TEXT NOT NULL,
  level TEXT NOT NULL,
  component TEXT NOT NULL,
  message TEXT NOT NULL,
  raw TEXT,
  stream_id TEXT
);

CREATE SEQUENCE IF NOT EXISTS logs_id_seq;

CREATE INDEX IF NOT EXISTS idx_logs_project_ts ON logs(project_id, ts);
CREATE INDEX IF NOT EXISTS idx_logs_project_level ON logs(project_id, level);
CREATE INDEX IF NOT EXISTS idx_logs_component ON logs(component);
"#;
