//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! riesgo train data/reference.csv --output models/artifacts.json
//! riesgo score pipeline.yaml --input applicant.json
//! riesgo audit pipeline.yaml --attribute sex
//! riesgo serve pipeline.yaml --address 127.0.0.1:5000
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::fairness::ProtectedAttribute;

/// Riesgo: credit-default risk scoring with explanations and fairness auditing
#[derive(Parser, Debug, Clone)]
#[command(name = "riesgo")]
#[command(version)]
#[command(about = "Credit-default risk scoring with exact linear explanations and fairness auditing")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train model artifacts from a labeled reference CSV
    Train(TrainArgs),

    /// Score one applicant through the full pipeline
    Score(ScoreArgs),

    /// Run a fairness audit over the reference population
    Audit(AuditArgs),

    /// Serve the scoring pipeline over HTTP
    Serve(ServeArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Path to the labeled reference CSV
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Output path for the artifact bundle
    #[arg(short, long, default_value = "artifacts.json")]
    pub output: PathBuf,

    /// Gradient descent iterations
    #[arg(long, default_value = "1000")]
    pub max_iter: usize,

    /// Learning rate
    #[arg(long, default_value = "0.1")]
    pub learning_rate: f64,

    /// L2 regularization strength
    #[arg(long, default_value = "0.0")]
    pub l2: f64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub holdout: f64,

    /// Seed for the holdout shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for the score command
#[derive(Parser, Debug, Clone)]
pub struct ScoreArgs {
    /// Path to the pipeline YAML configuration
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Path to a JSON applicant record
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the audit command
#[derive(Parser, Debug, Clone)]
pub struct AuditArgs {
    /// Path to the pipeline YAML configuration
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Protected attribute to group by
    #[arg(short, long, default_value = "sex")]
    pub attribute: ProtectedAttribute,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the serve command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Path to the pipeline YAML configuration
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    pub address: SocketAddr,

    /// Disable permissive CORS
    #[arg(long)]
    pub no_cors: bool,
}

/// CLI output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_command() {
        let cli = Cli::parse_from(["riesgo", "train", "data.csv", "--output", "out.json"]);
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.data, PathBuf::from("data.csv"));
                assert_eq!(args.output, PathBuf::from("out.json"));
                assert_eq!(args.max_iter, 1000);
            }
            _ => panic!("expected train command"),
        }
    }

    #[test]
    fn test_parse_audit_attribute() {
        let cli = Cli::parse_from(["riesgo", "audit", "cfg.yaml", "--attribute", "marriage"]);
        match cli.command {
            Command::Audit(args) => assert_eq!(args.attribute, ProtectedAttribute::Marriage),
            _ => panic!("expected audit command"),
        }
    }

    #[test]
    fn test_parse_serve_address() {
        let cli = Cli::parse_from(["riesgo", "serve", "cfg.yaml", "--address", "0.0.0.0:8080"]);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.address, "0.0.0.0:8080".parse().unwrap());
                assert!(!args.no_cors);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["riesgo", "--verbose", "score", "cfg.yaml", "-i", "a.json"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }
}
