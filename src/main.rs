//! Riesgo CLI
//!
//! Single entry point for training, scoring, auditing and serving.
//!
//! # Usage
//!
//! ```bash
//! # Train artifacts from a labeled reference CSV
//! riesgo train data/reference.csv --output models/artifacts.json
//!
//! # Score one applicant
//! riesgo score pipeline.yaml --input applicant.json
//!
//! # Fairness audit over the reference population
//! riesgo audit pipeline.yaml --attribute sex
//!
//! # Serve the pipeline over HTTP
//! riesgo serve pipeline.yaml --address 127.0.0.1:5000
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use riesgo::config::{
    load_config, AuditArgs, Cli, Command, OutputFormat, ScoreArgs, ServeArgs, TrainArgs,
};
use riesgo::data::load_reference_population;
use riesgo::encode::ApplicantRecord;
use riesgo::fairness::audit;
use riesgo::model::ModelArtifacts;
use riesgo::schema::FeatureSchema;
use riesgo::server::{ScoringServer, ServerConfig};
use riesgo::train::{train, TrainConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let result = match cli.command {
        Command::Train(args) => run_train(args),
        Command::Score(args) => run_score(args),
        Command::Audit(args) => run_audit(args),
        Command::Serve(args) => run_serve(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_train(args: TrainArgs) -> Result<(), String> {
    println!("Training from {}", args.data.display());

    let population =
        load_reference_population(&args.data).map_err(|e| format!("Dataset error: {e}"))?;

    let config = TrainConfig {
        max_iter: args.max_iter,
        learning_rate: args.learning_rate,
        l2: args.l2,
        holdout_fraction: args.holdout,
        seed: args.seed,
        ..TrainConfig::default()
    };

    let schema = FeatureSchema::credit_default();
    let (artifacts, report) =
        train(&population, &schema, &config).map_err(|e| format!("Training error: {e}"))?;

    artifacts
        .save(&args.output)
        .map_err(|e| format!("Cannot save artifacts: {e}"))?;

    println!("Artifacts saved to {}", args.output.display());
    println!();
    println!("Holdout evaluation ({} rows):", report.n_holdout);
    println!("  Accuracy: {:.3}", report.accuracy);
    println!("  ROC-AUC:  {:.3}", report.roc_auc);
    println!(
        "  Confusion: tp={} fp={} tn={} fn={}",
        report.confusion.true_positive,
        report.confusion.false_positive,
        report.confusion.true_negative,
        report.confusion.false_negative
    );
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let context = config
        .build_context()
        .map_err(|e| format!("Pipeline error: {e}"))?;

    let input = std::fs::read_to_string(&args.input)
        .map_err(|e| format!("Cannot read {}: {e}", args.input.display()))?;
    let record: ApplicantRecord =
        serde_json::from_str(&input).map_err(|e| format!("Invalid applicant record: {e}"))?;

    let response = context
        .score(&record)
        .map_err(|e| format!("Scoring error: {e}"))?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!("Probability of default: {:.2}%", response.probability * 100.0);
            println!("Decision: {}", response.band);
            if !response.reason_codes.is_empty() {
                println!();
                println!("Reason codes:");
                for code in &response.reason_codes {
                    println!("  - {code}");
                }
            }
            if !response.attributions.is_empty() {
                println!();
                println!("Top contributions:");
                for attribution in &response.attributions {
                    println!("  {:>24}: {:+.4}", attribution.feature, attribution.value);
                }
            }
        }
    }
    Ok(())
}

fn run_audit(args: AuditArgs) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let artifacts =
        ModelArtifacts::load(&config.artifacts).map_err(|e| format!("Artifact error: {e}"))?;
    let population = load_reference_population(&config.reference_data)
        .map_err(|e| format!("Dataset error: {e}"))?;

    let snapshot =
        audit(&population, &artifacts, args.attribute).map_err(|e| format!("Audit error: {e}"))?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!(
                "Fairness audit over {} rows (approval threshold {}):",
                snapshot.population_size,
                riesgo::fairness::APPROVAL_THRESHOLD
            );
            for (group, rate) in &snapshot.group_rates {
                println!("  {group:>16}: {:.2}% approved", rate * 100.0);
            }
            println!("  Disparity: {:.2}%", snapshot.disparity * 100.0);
            println!();
            println!("Monitoring only: these rates never influence individual decisions.");
        }
    }
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let context = config
        .build_context()
        .map_err(|e| format!("Pipeline error: {e}"))?;

    let mut server_config = ServerConfig::new(args.address);
    if args.no_cors {
        server_config = server_config.without_cors();
    }
    let server = ScoringServer::new(server_config, context);

    let runtime = tokio::runtime::Runtime::new().map_err(|e| format!("Runtime error: {e}"))?;
    runtime
        .block_on(server.run())
        .map_err(|e| format!("Server error: {e}"))
}
