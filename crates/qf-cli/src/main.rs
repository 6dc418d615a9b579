//! qf CLI

mod request;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use qf_prob::WeightedChiSquare;
use std::path::PathBuf;

use crate::request::CdfRequest;

#[derive(Parser)]
#[command(name = "qf")]
#[command(about = "qf - distribution of weighted sums of noncentral chi-square variables")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate P(Q <= q) for Q = c·Z + Σ λ_i·χ'²(df_i, ω_i)
    Cdf {
        /// Input request (JSON: terms, normal_coefficient, accuracy, quantiles)
        #[arg(short, long)]
        input: PathBuf,

        /// Quantile to evaluate (repeatable). Replaces the request's quantiles.
        #[arg(short, long = "quantile", allow_hyphen_values = true)]
        quantiles: Vec<f64>,

        /// Maximum absolute error of each probability. Overrides the request.
        #[arg(long)]
        accuracy: Option<f64>,

        /// Iteration ceiling per evaluation
        #[arg(long, default_value_t = qf_prob::MAX_STEPS)]
        max_steps: usize,

        /// Include evaluation diagnostics in the output
        #[arg(long)]
        trace: bool,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Cdf { input, quantiles, accuracy, max_steps, trace, output } => {
            cmd_cdf(&input, &quantiles, accuracy, max_steps, trace, output.as_ref())
        }
        Commands::Version => {
            println!("qf {}", qf_core::VERSION);
            Ok(())
        }
    }
}

fn cmd_cdf(
    input: &PathBuf,
    quantiles: &[f64],
    accuracy: Option<f64>,
    max_steps: usize,
    trace: bool,
    output: Option<&PathBuf>,
) -> Result<()> {
    tracing::info!(path = %input.display(), "loading request");
    let mut request = CdfRequest::from_path(input)?;
    request.apply_overrides(accuracy, quantiles);
    if request.quantiles.is_empty() {
        bail!("no quantiles given: pass --quantile or set \"quantiles\" in the request");
    }

    let engine =
        WeightedChiSquare::new(request.terms.clone(), request.normal_coefficient, request.accuracy())?
            .with_max_steps(max_steps);
    tracing::info!(
        terms = engine.terms().len(),
        normal_coefficient = engine.normal_coefficient(),
        accuracy = engine.accuracy(),
        "distribution ready"
    );

    let mut results = Vec::with_capacity(request.quantiles.len());
    for &q in &request.quantiles {
        let eval = engine.cdf_with_trace(q)?;
        tracing::debug!(quantile = q, probability = eval.probability, cycles = eval.trace.cycles, "cdf");
        let mut entry = serde_json::json!({
            "quantile": q,
            "probability": eval.probability,
        });
        if trace {
            entry["trace"] = serde_json::to_value(eval.trace)?;
        }
        results.push(entry);
    }

    let output_json = serde_json::json!({
        "normal_coefficient": engine.normal_coefficient(),
        "accuracy": engine.accuracy(),
        "mean": engine.mean(),
        "variance": engine.variance(),
        "results": results,
    });
    write_json(output, output_json)
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
