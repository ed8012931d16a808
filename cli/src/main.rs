//! Febris command-line front end.
//!
//! Loads the model artifact once, builds the inference service, and runs one
//! command against it.
//!
//! Usage:
//!   febris predict --input request.json
//!   echo '{"patientData": {"temperature": 38.4}}' | febris predict
//!   febris scenarios
//!   febris --model-dir ./models inspect

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use febris_contracts::error::{FebrisError, FebrisResult};
use febris_core::{InferenceService, ServiceConfig};
use febris_model::{load_predictor, scenarios::validation_scenarios};
use febris_policy::{EmergencyTriage, FeverDecisionPolicy};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Febris: fever medication decision support.
#[derive(Parser)]
#[command(
    name = "febris",
    about = "Fever medication decision support",
    long_about = "Recommends whether to continue fever medication, consult a doctor,\n\
                  or stop, from patient-reported data and a pre-trained model artifact."
)]
struct Cli {
    /// Service configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact directory. Overrides `[model] dir` from the config.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one request read from a JSON file, or `-` for stdin.
    Predict {
        #[arg(long, short, default_value = "-")]
        input: String,
        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// Run the three validation scenarios and report matches.
    Scenarios,
    /// Print a summary of the loaded model artifact.
    Inspect,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.model_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("febris: {}", e);
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over the configured filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!(model_dir = %config.model.dir.display(), "configuration loaded");

    let service = build_service(&config);

    let result = match cli.command {
        Command::Predict { input, compact } => run_predict(&service, &input, compact),
        Command::Scenarios => run_scenarios(&service),
        Command::Inspect => run_inspect(&service),
    };

    if let Err(e) = result {
        eprintln!("febris: {} (status {})", e, e.http_status());
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>, model_dir: Option<PathBuf>) -> FebrisResult<ServiceConfig> {
    let mut config = match path {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = model_dir {
        config.model.dir = dir;
    }
    Ok(config)
}

/// Load the artifact and wire the service. A load failure yields a service
/// in the unavailable state rather than an error.
fn build_service(config: &ServiceConfig) -> InferenceService {
    let loaded = load_predictor(&config.model.dir, config.model.expected_sha256.as_deref());
    InferenceService::from_load_result(
        loaded,
        Box::new(FeverDecisionPolicy::new()),
        Box::new(EmergencyTriage::new()),
    )
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn read_request(input: &str) -> FebrisResult<Value> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| FebrisError::invalid_input("request", format!("cannot read stdin: {e}")))?;
        buf
    } else {
        std::fs::read_to_string(input).map_err(|e| {
            FebrisError::invalid_input("request", format!("cannot read '{input}': {e}"))
        })?
    };

    serde_json::from_str(&raw)
        .map_err(|e| FebrisError::invalid_input("request", format!("malformed JSON: {e}")))
}

fn run_predict(service: &InferenceService, input: &str, compact: bool) -> FebrisResult<()> {
    let request = read_request(input)?;
    let response = service.analyze(&request)?;

    let rendered = if compact {
        serde_json::to_string(&response)
    } else {
        serde_json::to_string_pretty(&response)
    }
    .map_err(|e| FebrisError::InferenceFailure {
        reason: format!("cannot serialize response: {e}"),
    })?;

    println!("{rendered}");
    Ok(())
}

fn run_scenarios(service: &InferenceService) -> FebrisResult<()> {
    let scenarios = validation_scenarios();
    let mut matched = 0;

    for (idx, scenario) in scenarios.iter().enumerate() {
        let response = service.analyze(&scenario.payload)?;
        let got = response.result.decision;
        let ok = got == scenario.expected;
        if ok {
            matched += 1;
        }

        println!(
            "[{}] scenario {} ({}): expected {}, got {} (confidence {:.3}, risk {}, triage {:?})",
            if ok { "PASS" } else { "FAIL" },
            idx + 1,
            scenario.name,
            scenario.expected,
            got,
            response.result.confidence,
            response.result.risk_assessment,
            response.emergency_alert.severity,
        );
    }

    println!();
    println!("{}/{} scenarios matched", matched, scenarios.len());
    info!(matched, total = scenarios.len(), "validation scenarios complete");

    if matched == scenarios.len() {
        Ok(())
    } else {
        Err(FebrisError::InferenceFailure {
            reason: format!(
                "{} of {} validation scenarios did not match",
                scenarios.len() - matched,
                scenarios.len()
            ),
        })
    }
}

fn run_inspect(service: &InferenceService) -> FebrisResult<()> {
    service.check_ready()?;
    let Some(info) = service.artifact_info() else {
        println!("ready:       true (no artifact metadata)");
        return Ok(());
    };

    println!("ready:       {}", service.is_ready());
    println!("source:      {}", info.source);
    println!("fingerprint: {}", info.fingerprint);
    println!("loaded at:   {}", info.loaded_at.to_rfc3339());
    println!("trees:       {}", info.tree_count);
    println!("classes:");
    for (idx, class) in info.classes.iter().enumerate() {
        println!("  {idx}  {class}");
    }
    println!("features:");
    for (idx, name) in info.feature_names.iter().enumerate() {
        println!("  {idx}  {name}");
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
