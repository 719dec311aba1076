//! matrix-from-metadata - emit the CI build matrix for a module
//!
//! Annotations go to stdout as workflow commands; the matrix itself is
//! written to the file named by `GITHUB_OUTPUT`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use litmus_matrix::{generate, write_github_output, Annotation, Metadata};

#[derive(Parser)]
#[command(name = "matrix-from-metadata")]
#[command(about = "Derive the acceptance test matrix from metadata.json", long_about = None)]
#[command(version)]
struct Cli {
    /// Module metadata file
    #[arg(long, default_value = "metadata.json")]
    metadata: PathBuf,

    /// Step output name
    #[arg(long, default_value = "matrix")]
    output_name: String,

    /// Step output file provided by the workflow runner
    #[arg(long, env = "GITHUB_OUTPUT", hide_env_values = true)]
    github_output: Option<PathBuf>,
}

fn init_logging() -> Result<()> {
    let log_format = std::env::var("LITMUS_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("litmus=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging()?;

    let metadata = Metadata::from_path(&cli.metadata)
        .with_context(|| format!("Failed to read {}", cli.metadata.display()))?;

    let report = generate(&metadata);
    for annotation in &report.annotations {
        println!("{}", annotation);
    }

    let Some(github_output) = cli.github_output else {
        println!(
            "{}",
            Annotation::Error("GITHUB_OUTPUT environment variable not set".to_string())
        );
        return Ok(ExitCode::FAILURE);
    };

    let json = report.matrix.to_json()?;
    debug!(matrix = %json, "Generated matrix");

    write_github_output(&github_output, &cli.output_name, &json)
        .with_context(|| format!("Failed to write {}", github_output.display()))?;

    info!(
        platforms = report.matrix.platform.len(),
        collections = report.matrix.collection.len(),
        "Matrix written"
    );
    println!("Created matrix with {} cells", report.matrix.cell_count());

    Ok(ExitCode::SUCCESS)
}
