//! `subdns` — manage subdomain allocations under a shared DNS zone.
//!
//! Exit codes: 0 for success (deployment complete), 1 for a partial
//! deployment, 2 for rejections and failures.

mod adapters;
mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subdns_core::error::{ValidationCode, ValidationError};
use subdns_core::types::{DeploymentOutcome, DeploymentRecord, RequestDocument};
use subdns_core::{CoreError, CoreResult, RegistryService, ServiceContext};
use subdns_provider::{CloudflareProvider, RateLimiter};

use adapters::{FileAllocationStore, FileDeploymentStore, GithubIdentityVerifier};
use config::CliConfig;

const EXIT_OK: u8 = 0;
const EXIT_PARTIAL: u8 = 1;
const EXIT_FAILED: u8 = 2;

/// Cloudflare's per-token budget is 1200 requests per 5 minutes; stay well
/// under it.
const RATE_LIMIT_CAPACITY: u32 = 4;
const RATE_LIMIT_REFILL_PER_SEC: u32 = 2;

#[derive(Parser)]
#[command(name = "subdns", version, about = "Subdomain registry over a managed DNS zone")]
struct Cli {
    /// Registry configuration file.
    #[arg(long, short, global = true, default_value = "subdns.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a request document without touching DNS or state.
    Validate {
        /// Request document (JSON).
        file: PathBuf,
    },
    /// Validate, authorize and reconcile a request document.
    Deploy {
        /// Request document (JSON).
        file: PathBuf,
    },
    /// Show a label's allocation and deployment history.
    Status { label: String },
    /// Tear down a label's records and free it.
    Remove {
        label: String,
        /// GitHub username of the allocation's owner.
        #[arg(long)]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = match CliConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let result = match cli.command {
        Command::Validate { file } => validate(&file, &config),
        Command::Deploy { file } => deploy(&file, &config).await,
        Command::Status { label } => status(&label, &config).await,
        Command::Remove { label, owner } => remove(&label, &owner, &config).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn read_document(path: &Path) -> CoreResult<RequestDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::StorageError(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        CoreError::Validation(ValidationError::new(
            ValidationCode::MalformedDocument,
            path.display().to_string(),
            e.to_string(),
        ))
    })
}

fn validate(file: &Path, config: &CliConfig) -> CoreResult<u8> {
    let document = read_document(file)?;
    let request = subdns_core::validate_document(&document, &config.registry)?;
    println!(
        "ok: '{}' under '{}' for '{}' ({} records)",
        request.label,
        request.zone,
        request.owner.username,
        request.records.len()
    );
    Ok(EXIT_OK)
}

async fn deploy(file: &Path, config: &CliConfig) -> CoreResult<u8> {
    let document = read_document(file)?;
    let service = registry_service(config)?;
    let record = service.submit(document).await?;
    report(&record);
    Ok(exit_code_for(&record))
}

async fn status(label: &str, config: &CliConfig) -> CoreResult<u8> {
    let service = registry_service(config)?;
    let status = service.status(label).await?;
    let rendered = serde_json::to_string_pretty(&status)
        .map_err(|e| CoreError::SerializationError(e.to_string()))?;
    println!("{rendered}");
    Ok(EXIT_OK)
}

async fn remove(label: &str, owner: &str, config: &CliConfig) -> CoreResult<u8> {
    let service = registry_service(config)?;
    let record = service.remove(label, owner).await?;
    report(&record);
    Ok(exit_code_for(&record))
}

fn registry_service(config: &CliConfig) -> CoreResult<RegistryService> {
    let api_token = std::env::var("CLOUDFLARE_API_TOKEN").map_err(|_| {
        CoreError::StorageError("CLOUDFLARE_API_TOKEN is not set".to_string())
    })?;
    let provider = CloudflareProvider::new(api_token).with_rate_limiter(Arc::new(
        RateLimiter::new(RATE_LIMIT_CAPACITY, RATE_LIMIT_REFILL_PER_SEC),
    ));

    let state_dir = config.state_dir();
    let ctx = Arc::new(ServiceContext::new(
        Arc::new(provider),
        Arc::new(FileAllocationStore::new(&state_dir)),
        Arc::new(FileDeploymentStore::new(&state_dir)),
        Arc::new(GithubIdentityVerifier::new(
            reqwest::Client::new(),
            config.min_account_age_days,
        )),
        config.registry.clone(),
    ));
    Ok(RegistryService::new(ctx))
}

fn report(record: &DeploymentRecord) {
    for line in &record.applied {
        println!("applied: {line}");
    }
    for failure in &record.failed {
        println!("failed:  {} ({})", failure.operation, failure.reason);
    }
    for line in &record.skipped {
        println!("skipped: {line}");
    }
    println!(
        "outcome: {:?} ({} applied, {} failed, {} skipped)",
        record.outcome,
        record.applied.len(),
        record.failed.len(),
        record.skipped.len()
    );
}

fn exit_code_for(record: &DeploymentRecord) -> u8 {
    match record.outcome {
        DeploymentOutcome::Complete => EXIT_OK,
        DeploymentOutcome::Partial => EXIT_PARTIAL,
        DeploymentOutcome::Failed => EXIT_FAILED,
    }
}
