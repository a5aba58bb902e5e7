mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use catascope_audit::{AuditEngine, AuditError, AuditOptions, render_report};
use catascope_core::{Error as CoreError, Profile, VocabularyPlan};
use catascope_resolve::{ClientOptions, QueryClient, SparqlHttpClient};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use registry::{RunContext, RunOptions, init_run_logging, start_run, write_report, write_results};
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_PROFILE: &str = include_str!("../assets/mobility_profile.toml");
const DEFAULT_VOCAB: &str = include_str!("../assets/mobility_vocab.toml");

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("audit error: {0}")]
    Audit(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "catascope", version, about = "Catascope CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// SPARQL endpoint URL (flag form).
    #[arg(long, value_name = "ENDPOINT_URL", conflicts_with = "endpoint_pos")]
    endpoint: Option<String>,
    /// SPARQL endpoint URL (positional form).
    #[arg(value_name = "ENDPOINT_URL", required_unless_present = "endpoint")]
    endpoint_pos: Option<String>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional output path for results.json.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Property profile TOML; defaults to the embedded mobilityDCAT-AP
    /// profile.
    #[arg(long, value_name = "PROFILE_TOML")]
    profile: Option<PathBuf>,
    /// Vocabulary check list TOML; defaults to the embedded list.
    #[arg(long, value_name = "VOCAB_TOML")]
    vocab: Option<PathBuf>,
    /// Per-query timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Maximum number of property analyses in flight.
    #[arg(long, default_value_t = 8)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Audit(args) => run_audit(args).await,
    }
}

async fn run_audit(args: AuditArgs) -> Result<(), CliError> {
    let AuditArgs {
        endpoint,
        endpoint_pos,
        run_dir,
        out,
        profile,
        vocab,
        timeout_secs,
        concurrency,
    } = args;

    let endpoint = match (endpoint, endpoint_pos) {
        (Some(value), None) => value,
        (None, Some(value)) => value,
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidConfig(
                "use either --endpoint or positional endpoint URL".to_string(),
            ));
        }
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "endpoint URL is required".to_string(),
            ));
        }
    };

    if timeout_secs == 0 {
        return Err(CliError::InvalidConfig(
            "timeout must be positive".to_string(),
        ));
    }
    if concurrency == 0 {
        return Err(CliError::InvalidConfig(
            "concurrency must be positive".to_string(),
        ));
    }

    let (profile, profile_source) = load_profile(profile.as_deref())?;
    let (plan, vocab_source) = load_vocab(vocab.as_deref())?;

    let ctx = RunContext {
        run_id: Uuid::new_v4().to_string(),
        started_at: Utc::now(),
        endpoint: endpoint.clone(),
        results_version: catascope_core::RESULTS_VERSION.to_string(),
        run_dir,
        out,
        options: RunOptions {
            timeout_secs,
            concurrency,
            profile_source,
            vocab_source,
        },
    };

    let paths = start_run(&ctx)?;
    init_run_logging(&paths.logs_path)?;
    tracing::info!(run_id = %ctx.run_id, endpoint = %ctx.endpoint, "starting audit");

    let mut client_options = ClientOptions::new(&endpoint);
    client_options.timeout = Duration::from_secs(timeout_secs);
    let client: Arc<dyn QueryClient> = Arc::new(SparqlHttpClient::new(&client_options)?);

    let engine = AuditEngine::new(AuditOptions {
        max_in_flight: concurrency,
    });
    let results = match engine.run(client, &profile, &plan).await {
        Ok(results) => results,
        Err(AuditError::NoCatalogs) => {
            println!("no catalogs found at {endpoint}");
            return Ok(());
        }
        Err(err) => return Err(CliError::Audit(err.to_string())),
    };

    write_results(&paths, &results, ctx.out.as_deref())?;
    let report = render_report(&results, &profile, &plan);
    write_report(&paths, &report)?;

    println!("found {} catalogs", results.catalog_count);
    if !results.warnings.is_empty() {
        println!("{} warning(s); see report", results.warnings.len());
    }
    println!("results: {}", paths.results_path.display());
    println!("report: {}", paths.report_path.display());

    Ok(())
}

fn load_profile(path: Option<&Path>) -> Result<(Profile, String), CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok((Profile::from_toml(&text)?, path.display().to_string()))
        }
        None => Ok((
            Profile::from_toml(DEFAULT_PROFILE)?,
            "embedded:mobility-dcat-ap".to_string(),
        )),
    }
}

fn load_vocab(path: Option<&Path>) -> Result<(VocabularyPlan, String), CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok((VocabularyPlan::from_toml(&text)?, path.display().to_string()))
        }
        None => Ok((
            VocabularyPlan::from_toml(DEFAULT_VOCAB)?,
            "embedded:mobility-dcat-ap".to_string(),
        )),
    }
}
