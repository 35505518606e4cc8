mod attack;
mod config;
mod core;
mod db;
mod engine;
mod llm;
mod rules;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::attack::{AttackGenerator, Intensity};
use crate::config::Config;
use crate::core::ScenarioType;
use crate::core::experiment::{self, ExperimentStats};
use crate::db::SharedDatabase;
use crate::engine::{DefenderAi, SuspicionScorer};
use crate::llm::TextGenClient;
use crate::rules::{RuleApi, RuleStore};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("frauddrill=info".parse().unwrap()),
        )
        .init();

    tracing::info!("frauddrill starting...");

    // Load configuration
    let config = Config::load("config.toml");
    tracing::info!("Config: {:?}", config);

    // Open attempt-log database (best-effort sink)
    let db_path = Path::new(&config.database.path);
    if let Some(parent) = db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Failed to create database directory: {e}");
        }
    }
    let sink = match SharedDatabase::open(db_path) {
        Ok(db) => {
            tracing::info!("Attempt database opened at {}", config.database.path);
            Some(db)
        }
        Err(e) => {
            tracing::warn!("Attempt database unavailable ({e}), running without sink");
            None
        }
    };

    // Rule store: remote API when configured, built-in fallback tables otherwise
    let rule_api = config
        .defender
        .rules_api_url
        .as_deref()
        .map(|url| RuleApi::new(url, config.defender.rules_api_key.as_deref()));
    let store = Arc::new(RuleStore::new(rule_api));

    // Defender
    let scorer = SuspicionScorer::new(config.defender.threshold);
    let defender = Arc::new(DefenderAi::new(scorer, store, sink.clone()));

    // Attacker, with optional LLM-written reasoning
    let llm = config.llm.enabled.then(|| {
        TextGenClient::new(
            &config.llm.api_url,
            &config.llm.model,
            config.llm.token.as_deref(),
            config.llm.max_retries,
        )
    });
    let intensity = Intensity::from_str_or_default(&config.experiment.intensity);
    let generator = AttackGenerator::new(&config.llm.model, llm, intensity);

    // Resolve scenario list, skipping unknown names
    let scenarios: Vec<ScenarioType> = config
        .experiment
        .scenarios
        .iter()
        .filter_map(|name| {
            let scenario = ScenarioType::from_str_opt(name);
            if scenario.is_none() {
                tracing::warn!("Unknown scenario '{name}' in config, skipping");
            }
            scenario
        })
        .collect();

    // Experiment → reporter channel
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();

    let delay = Duration::from_millis(config.experiment.delay_ms);
    let rounds = config.experiment.rounds;
    let threshold = defender.threshold();
    let experiment_handle = tokio::spawn(experiment::run_experiment(
        rounds,
        scenarios,
        delay,
        generator,
        threshold,
        experiment::defender_evaluation(defender),
        out_tx,
    ));

    // Reporter: log each round, accumulate the run summary
    let mut stats = ExperimentStats::default();
    while let Some(outcome) = out_rx.recv().await {
        tracing::info!(
            round = outcome.round,
            scenario = %outcome.attack.scenario_type,
            score = outcome.result.suspicion_score,
            decision = %outcome.result.decision,
            "{}",
            outcome.result.reasoning
        );
        stats.record(&outcome);
    }

    if let Err(e) = experiment_handle.await {
        tracing::error!("experiment task failed: {e}");
    }

    tracing::info!("Experiment summary: {}", stats.summary());

    if let Some(db) = &sink {
        match db.attempt_count() {
            Ok(count) => tracing::info!("{count} attempts stored in total"),
            Err(e) => tracing::warn!("Failed to read attempt count: {e}"),
        }
    }
}
