use logvault_core::config::Config;
use logvault_core::error::{LogVaultError, Result};
use logvault_core::model::LogEntry;
use logvault_core::query::{AiRequest, AiResponse};

/// Entries beyond this cap are dropped from the prompt.
pub const MAX_PROMPT_ENTRIES: usize = 150;

/// Stateless pass-through to the external completion service. The core
/// ingestion and query paths never depend on it.
pub async fn summarize(client: &reqwest::Client, cfg: &Config, req: AiRequest) -> Result<AiResponse> {
    let prompt = build_prompt(
        "Summarize the following application logs. Call out errors, their likely causes, \
         and the overall health of the system.",
        &req.logs,
    )?;
    complete(client, cfg, &prompt).await
}

pub async fn scan(client: &reqwest::Client, cfg: &Config, req: AiRequest) -> Result<AiResponse> {
    let prompt = build_prompt(
        "Scan the following application logs for anomalies: unusual patterns, spikes, \
         repeated failures, or suspicious activity. Report each finding with the evidence.",
        &req.logs,
    )?;
    complete(client, cfg, &prompt).await
}

fn build_prompt(instruction: &str, logs: &[LogEntry]) -> Result<String> {
    if logs.is_empty() {
        return Err(LogVaultError::Validation(
            "logs must be a non-empty list".to_string(),
        ));
    }

    let mut prompt = String::from(instruction);
    prompt.push_str("\n\n");
    for entry in logs.iter().take(MAX_PROMPT_ENTRIES) {
        prompt.push_str(&format!(
            "{} [{}] {}: {}\n",
            entry.timestamp, entry.level, entry.component, entry.message
        ));
    }
    Ok(prompt)
}

async fn complete(client: &reqwest::Client, cfg: &Config, prompt: &str) -> Result<AiResponse> {
    let endpoint = cfg
        .ai_endpoint
        .as_deref()
        .ok_or_else(|| LogVaultError::Config("ai endpoint is not configured".to_string()))?;
    let api_key = cfg
        .ai_api_key
        .as_deref()
        .ok_or_else(|| LogVaultError::Config("ai api key is not configured".to_string()))?;

    let body = serde_json::json!({
        "model": cfg.ai_model,
        "messages": [{"role": "user", "content": prompt}],
    });

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| LogVaultError::Internal(format!("completion request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(LogVaultError::Internal(format!(
            "completion service returned {}",
            response.status()
        )));
    }

    let value: serde_json::Value = response
        .json()
        .await
        .map_err(|e| LogVaultError::Internal(format!("completion response decode failed: {e}")))?;

    let result = value
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(AiResponse { result })
}
