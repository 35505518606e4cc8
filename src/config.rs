use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub defender: DefenderConfig,
    pub experiment: ExperimentConfig,
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DefenderConfig {
    /// Suspicion score at or above which an attempt is rejected.
    pub threshold: i32,
    /// PostgREST-style endpoint serving business_rules rows. Fallback rule
    /// tables apply when unset or unreachable.
    pub rules_api_url: Option<String>,
    pub rules_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExperimentConfig {
    pub rounds: usize,
    /// Scenario names cycled round-robin; unknown names are skipped with a warning.
    pub scenarios: Vec<String>,
    pub delay_ms: u64,
    pub intensity: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub api_url: String,
    pub model: String,
    pub token: Option<String>,
    pub max_retries: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DefenderConfig {
    fn default() -> Self {
        Self {
            threshold: crate::engine::DEFAULT_THRESHOLD,
            rules_api_url: None,
            rules_api_key: None,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            scenarios: vec![
                "vendor_fraud".into(),
                "payroll_theft".into(),
                "card_abuse".into(),
                "invoice_fraud".into(),
            ],
            delay_ms: 500,
            intensity: "medium".into(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api-inference.huggingface.co/models/".into(),
            model: "mistralai/Mistral-7B-Instruct-v0.2".into(),
            token: None,
            max_retries: 2,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/attempts.db".into(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }
}
