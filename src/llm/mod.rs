use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Delay between retry attempts against the inference API.
const RETRY_DELAY: Duration = Duration::from_millis(1500);

/// Client for a hosted text-generation inference API. Used only for attacker
/// reasoning text; the scoring core never depends on its output.
pub struct TextGenClient {
    url: String,
    token: Option<String>,
    max_retries: u32,
    client: Client,
}

impl TextGenClient {
    pub fn new(api_url: &str, model: &str, token: Option<&str>, max_retries: u32) -> Self {
        Self {
            url: format!("{}{model}", api_url),
            token: token.map(str::to_string),
            max_retries,
            client: Client::new(),
        }
    }

    /// One inference call. The response may be an array of generations, a
    /// bare string, or an object carrying `generated_text`; anything else is
    /// an API error.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": 120,
                "temperature": 0.8,
                "return_full_text": false,
            },
        });

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = request.send().await.map_err(LlmError::Http)?;
        if !resp.status().is_success() {
            return Err(LlmError::Api(resp.status().as_u16()));
        }

        let value: Value = resp.json().await.map_err(LlmError::Http)?;
        let text = extract_generated_text(&value).ok_or(LlmError::Empty)?;
        Ok(text)
    }

    /// Capped-retry wrapper around `generate` with a fixed delay between
    /// attempts. Models that are still loading routinely fail the first call.
    pub async fn generate_with_retries(&self, prompt: &str) -> Result<String, LlmError> {
        let mut last_err = LlmError::Empty;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, "retrying inference call");
                tokio::time::sleep(RETRY_DELAY).await;
            }
            match self.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(attempt, "inference call failed: {e}");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

/// Pull the generated text out of the known response shapes.
fn extract_generated_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Array(items) => items.first()?.get("generated_text")?.as_str()?,
        Value::Object(_) => value.get("generated_text")?.as_str()?,
        _ => return None,
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug)]
pub enum LlmError {
    Http(reqwest::Error),
    Api(u16),
    Empty,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Http(e) => write!(f, "HTTP error: {e}"),
            LlmError::Api(code) => write!(f, "API returned status {code}"),
            LlmError::Empty => write!(f, "empty generation"),
        }
    }
}

impl std::error::Error for LlmError {}
