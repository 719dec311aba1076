//! Litmus CLI - run harness operations against a test target
//!
//! Target selection follows the test environment (`TARGET_HOST`,
//! `RSPEC_DEBUG`); flags override it.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use litmus_core::application::Harness;
use litmus_core::domain::{ApplyOptions, CommandResult, ExecutionContext, RunOptions, Target};
use litmus_core::port::id_provider::UuidProvider;
use litmus_core::port::time_provider::SystemTimeProvider;
use litmus_core::AppError;
use litmus_infra_system::bolt_engine::DEFAULT_BOLT_BINARY;
use litmus_infra_system::{BoltCliEngine, YamlInventoryLoader};

/// Exit status for usage mistakes, distinct from any target exit code
const USAGE_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "litmus")]
#[command(about = "Acceptance test harness operations over Bolt", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Target host (default: TARGET_HOST, or localhost)
    #[arg(long, global = true)]
    target: Option<String>,

    /// Inventory file for remote targets
    #[arg(long, global = true, env = "LITMUS_INVENTORY")]
    inventory: Option<String>,

    /// Module path for tasks and local applies
    #[arg(long, global = true, env = "LITMUS_MODULEPATH")]
    modulepath: Option<String>,

    /// Bolt executable
    #[arg(long, global = true, env = "LITMUS_BOLT_BIN", default_value = DEFAULT_BOLT_BINARY)]
    bolt: String,

    /// Print apply diagnostics (also enabled by RSPEC_DEBUG)
    #[arg(long, global = true)]
    debug: bool,

    /// Return failures as results instead of erroring
    #[arg(long, global = true)]
    expect_failures: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a manifest
    Apply {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Fail if the run reports changes
        #[arg(long)]
        catch_changes: bool,

        /// Fail only if the run reports failures
        #[arg(long)]
        catch_failures: bool,

        /// Fail unless the run reports changes
        #[arg(long)]
        expect_changes: bool,
    },

    /// Apply a manifest twice, failing if the second run changes anything
    Idempotent {
        #[command(flatten)]
        manifest: ManifestArgs,
    },

    /// Run a shell command
    Shell {
        /// Command line, passed to the target shell as one string
        command: String,
    },

    /// Upload a file
    Upload {
        source: PathBuf,
        destination: String,
    },

    /// Run a task
    Task {
        /// Task name (e.g., facts, package::install)
        name: String,

        /// Parameters as JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },

    /// Run a local script on the target
    Script {
        path: PathBuf,

        /// Arguments handed to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        arguments: Vec<String>,
    },

    /// Write content to a file on the target
    WriteFile {
        destination: String,

        /// File content (default: read stdin)
        #[arg(long)]
        content: Option<String>,
    },
}

#[derive(Args)]
struct ManifestArgs {
    /// Manifest source code
    manifest: Option<String>,

    /// Existing manifest file on the target
    #[arg(long = "file")]
    manifest_file_location: Option<String>,

    /// Hiera configuration on the target
    #[arg(long)]
    hiera_config: Option<String>,

    /// Prepended to the puppet invocation (e.g., FACTER_role=db)
    #[arg(long)]
    prefix_command: Option<String>,

    /// Pass --debug to puppet
    #[arg(long)]
    puppet_debug: bool,

    #[arg(long)]
    noop: bool,

    /// Pass --trace to puppet
    #[arg(long)]
    trace: bool,
}

impl ManifestArgs {
    fn options(&self, expect_failures: bool) -> ApplyOptions {
        ApplyOptions {
            expect_failures,
            manifest_file_location: self.manifest_file_location.clone(),
            hiera_config: self.hiera_config.clone(),
            prefix_command: self.prefix_command.clone(),
            debug: self.puppet_debug,
            noop: self.noop,
            trace_logs: self.trace,
            ..ApplyOptions::default()
        }
    }
}

#[derive(Tabled)]
struct ResultRow {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl From<&CommandResult> for ResultRow {
    fn from(result: &CommandResult) -> Self {
        Self {
            exit_code: result.exit_code,
            stdout: result.stdout.clone().unwrap_or_default().trim_end().to_string(),
            stderr: result.stderr.clone().unwrap_or_default().trim_end().to_string(),
        }
    }
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

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn build_context(cli: &Cli) -> Result<ExecutionContext> {
    let mut ctx = ExecutionContext::from_env().context("Failed to read the working directory")?;

    if let Some(host) = &cli.target {
        ctx = ctx.with_target(Target::from_host(Some(host)));
    }
    if let Some(inventory) = &cli.inventory {
        ctx = ctx.with_inventory_path(expand(inventory));
    }
    if let Some(modulepath) = &cli.modulepath {
        ctx = ctx.with_modulepath(expand(modulepath));
    }
    if cli.debug {
        ctx = ctx.with_debug(true);
    }
    Ok(ctx)
}

fn build_harness(cli: &Cli) -> Harness {
    let time_provider = Arc::new(SystemTimeProvider);
    let engine = Arc::new(BoltCliEngine::new(expand(&cli.bolt), time_provider.clone()));

    Harness::new(
        engine,
        Arc::new(YamlInventoryLoader::new()),
        time_provider,
        Arc::new(UuidProvider),
    )
}

/// Run the selected operation; `None` means there is no result to print
async fn execute(cli: &Cli, harness: &Harness, ctx: &ExecutionContext) -> Result<Option<CommandResult>> {
    let run_opts = RunOptions {
        expect_failures: cli.expect_failures,
    };

    let result = match &cli.command {
        Commands::Apply {
            manifest,
            catch_changes,
            catch_failures,
            expect_changes,
        } => {
            let opts = ApplyOptions {
                catch_changes: *catch_changes,
                catch_failures: *catch_failures,
                expect_changes: *expect_changes,
                ..manifest.options(cli.expect_failures)
            };
            harness
                .apply_manifest(ctx, manifest.manifest.as_deref(), &opts)
                .await?
        }

        Commands::Idempotent { manifest } => {
            let opts = manifest.options(false);
            harness
                .idempotent_apply(ctx, manifest.manifest.as_deref(), &opts)
                .await?
        }

        Commands::Shell { command } => harness.run_shell(ctx, command, &run_opts).await?,

        Commands::Upload {
            source,
            destination,
        } => {
            harness
                .upload_file(ctx, source, destination, &run_opts)
                .await?
        }

        Commands::Task { name, params } => {
            let params: serde_json::Value =
                serde_json::from_str(params).context("Invalid JSON params")?;
            harness.run_task(ctx, name, &params, &run_opts).await?
        }

        Commands::Script { path, arguments } => {
            harness
                .run_script(ctx, path, &run_opts, arguments)
                .await?
        }

        Commands::WriteFile {
            destination,
            content,
        } => {
            let content = match content {
                Some(content) => content.clone(),
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("Failed to read content from stdin")?;
                    buffer
                }
            };
            harness.write_file(ctx, &content, destination).await?;
            return Ok(None);
        }
    };

    Ok(Some(result))
}

fn print_result(result: &CommandResult, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if result.is_success() {
        println!("{}", "✓ Succeeded".green().bold());
    } else {
        println!(
            "{}",
            format!("✗ Exited with {}", result.exit_code).yellow().bold()
        );
    }
    println!();
    println!("{}", Table::new(vec![ResultRow::from(result)]));
    Ok(())
}

/// Target exit codes outside 0..=255 collapse to a generic failure
fn exit_code_for(result: &CommandResult) -> ExitCode {
    u8::try_from(result.exit_code)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging()?;

    let ctx = build_context(&cli)?;
    let harness = build_harness(&cli);
    debug!(host = %ctx.target, inventory = %ctx.inventory_path.display(), "Context ready");

    match execute(&cli, &harness, &ctx).await {
        Ok(Some(result)) => {
            print_result(&result, cli.json)?;
            Ok(exit_code_for(&result))
        }
        Ok(None) => {
            if !cli.json {
                println!("{}", "✓ Succeeded".green().bold());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            let usage = e
                .downcast_ref::<AppError>()
                .is_some_and(AppError::is_usage);
            if usage {
                Ok(ExitCode::from(USAGE_EXIT_CODE))
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
