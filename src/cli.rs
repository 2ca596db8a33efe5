use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_BUCKET, DEFAULT_OBJECT_KEY, DEFAULT_TIMEOUT_SECS, PublishConfig};
use crate::discovery::build_manifest;
use crate::error::PublisherError;
use crate::manifest::Manifest;
use crate::publisher::{run_pipeline, verify_publish};
use crate::storage::S3Store;

#[derive(Parser)]
#[command(name = "modelpub")]
#[command(about = "Aggregates per-model config.json files into a manifest and publishes it to S3")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the manifest locally without touching the bucket
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build, upload, make public-read and verify the manifest
    Publish {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Compare the published manifest against the local model directories
    Verify {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory holding one sub-directory per model
    #[arg(long, default_value = "models")]
    pub base_dir: PathBuf,

    /// Order entries by slug instead of directory listing order
    #[arg(long)]
    pub sort: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Destination bucket
    #[arg(long, env = "MODELPUB_BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Object key for the manifest
    #[arg(long, env = "MODELPUB_KEY", default_value = DEFAULT_OBJECT_KEY)]
    pub key: String,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom S3 endpoint URL (MinIO, LocalStack)
    #[arg(long, env = "MODELPUB_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl From<TargetArgs> for PublishConfig {
    fn from(args: TargetArgs) -> Self {
        let mut config = PublishConfig::new(args.bucket, args.key).with_timeout(args.timeout_secs);
        if let Some(region) = args.region {
            config = config.with_region(region);
        }
        if let Some(endpoint) = args.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(profile) = args.profile {
            config = config.with_profile(profile);
        }
        config
    }
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { source, output } => build_command(source, output),
        Commands::Publish { source, target } => publish_command(source, target.into()),
        Commands::Verify { source, target } => verify_command(source, target.into()),
    }
}

/// Logs go to stderr so `build` can stream the manifest on stdout.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "modelpub=debug" } else { "modelpub=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_manifest(source: &SourceArgs) -> Result<Manifest> {
    let mut manifest = build_manifest(&source.base_dir)
        .with_context(|| format!("Failed to build manifest from {}", source.base_dir.display()))?;
    if source.sort {
        manifest.sort_by_slug();
    }
    Ok(manifest)
}

fn build_command(source: SourceArgs, output: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(&source)?;

    match output {
        Some(path) => {
            manifest.write_to(&path)?;
            println!("Wrote {} entries to {}", manifest.len(), path.display());
        }
        None => {
            let manifest_json = manifest
                .to_json_pretty()
                .context("Failed to serialize manifest to JSON")?;
            println!("{}", manifest_json);
        }
    }

    Ok(())
}

fn publish_command(source: SourceArgs, config: PublishConfig) -> Result<()> {
    debug!(?config, "Publishing manifest");

    let report = block_on(async {
        let store = S3Store::from_config(&config).await;
        run_pipeline(&store, &source.base_dir, &config.key, source.sort).await
    })??;

    let report = report.into_result()?;
    println!(
        "{} file uploaded and made public successfully! ({} entries, {})",
        report.key,
        report.entries,
        config.public_url()
    );

    Ok(())
}

fn verify_command(source: SourceArgs, config: PublishConfig) -> Result<()> {
    let manifest = load_manifest(&source)?;

    let verified = block_on(async {
        let store = S3Store::from_config(&config).await;
        verify_publish(&store, &manifest, &config.key).await
    })??;

    if !verified {
        return Err(PublisherError::VerificationMismatch {
            bucket: config.bucket,
            key: config.key,
        }
        .into());
    }

    println!(
        "{} in bucket {} matches the local data ({} entries)",
        config.key,
        config.bucket,
        manifest.len()
    );

    Ok(())
}

/// Every step runs in order on this thread; the runtime only exists to drive
/// the S3 client.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
