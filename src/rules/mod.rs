pub mod fallback;

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::{Rule, ScenarioType};

/// Supplies the defender's weighted rules per scenario.
///
/// Resolution order: instance cache, then the remote rule API when one is
/// configured, then the built-in fallback tables. A known scenario therefore
/// never yields zero rules silently, and a fetch never fails the caller.
pub struct RuleStore {
    api: Option<RuleApi>,
    cache: Mutex<HashMap<ScenarioType, Vec<Rule>>>,
}

impl RuleStore {
    pub fn new(api: Option<RuleApi>) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Store with no remote backend; fallback tables only.
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Fetch the rule set for a scenario. Results are cached per scenario for
    /// the lifetime of the store (one experiment run) until invalidated.
    pub async fn fetch_rules(&self, scenario: ScenarioType) -> Vec<Rule> {
        if let Some(cached) = self.cache.lock().unwrap().get(&scenario) {
            debug!(%scenario, "using cached rules");
            return cached.clone();
        }

        let rules = match &self.api {
            Some(api) => match api.fetch(scenario).await {
                Ok(rules) if !rules.is_empty() => {
                    info!(%scenario, count = rules.len(), "rules fetched from API");
                    rules
                }
                Ok(_) => {
                    warn!(%scenario, "rule API returned no rows, using fallback rules");
                    fallback::fallback_rules(scenario)
                }
                Err(e) => {
                    warn!(%scenario, "rule API unavailable ({e}), using fallback rules");
                    fallback::fallback_rules(scenario)
                }
            },
            None => {
                debug!(%scenario, "no rule API configured, using fallback rules");
                fallback::fallback_rules(scenario)
            }
        };

        self.cache.lock().unwrap().insert(scenario, rules.clone());
        rules
    }

    /// Drop cached rules for one scenario, or all of them.
    pub fn invalidate(&self, scenario: Option<ScenarioType>) {
        let mut cache = self.cache.lock().unwrap();
        match scenario {
            Some(s) => {
                cache.remove(&s);
            }
            None => cache.clear(),
        }
    }
}

/// A rule row as served by the API. `scenario_type` comes back on the row but
/// the store indexes by scenario itself, so it is not kept on `Rule`.
#[derive(Debug, Deserialize)]
struct RuleRow {
    parameter_name: String,
    weight: i32,
    description: String,
}

/// Thin client for a PostgREST-style business-rules endpoint.
pub struct RuleApi {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl RuleApi {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            client: Client::new(),
        }
    }

    pub async fn fetch(&self, scenario: ScenarioType) -> Result<Vec<Rule>, ApiError> {
        let url = format!(
            "{}/business_rules?scenario_type=eq.{}",
            self.base_url, scenario
        );

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }

        let resp = request.send().await.map_err(ApiError::Http)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }

        let rows: Vec<RuleRow> = resp.json().await.map_err(ApiError::Http)?;
        Ok(rows
            .into_iter()
            .map(|row| Rule {
                parameter_name: row.parameter_name,
                weight: row.weight,
                description: row.description,
            })
            .collect())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Status(u16),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP error: {e}"),
            ApiError::Status(code) => write!(f, "unexpected status: {code}"),
        }
    }
}

impl std::error::Error for ApiError {}
