use anyhow::{Context, Result};
use clap::Parser;
use db_cleanup_core::{
    CiContext, CleanupOutcome, DatabaseCleanupOperation, GithubOutputFile, OutputSink,
    ProviderClient, ProviderConfig, StdoutSink,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod error;

use cli::Cli;
use error::CliDiagnostic;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        CliDiagnostic::from_error(&e).print();
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag.
    // Info is the floor: those lines are the step's log.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "db_cleanup=info,db_cleanup_core=info",
            1 => "db_cleanup=debug,db_cleanup_core=debug",
            _ => "db_cleanup=trace,db_cleanup_core=trace,reqwest=debug",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose > 0)
                .with_thread_ids(false)
                .with_thread_names(false)
                .without_time()
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

fn load_config(cli: &Cli) -> Result<ProviderConfig> {
    let config = match &cli.config_file {
        Some(path) => {
            debug!("Loading provider config from {:?}", path);
            ProviderConfig::load_from_path(path)?
        }
        None => ProviderConfig::default(),
    };
    Ok(config
        .with_overrides(cli.api_url.clone(), cli.timeout_secs)
        .validate()?)
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    debug!("Provider API: {}", config.base_url());

    let mut context = CiContext::from_env()?;
    cli.apply_inputs(&mut context.inputs);

    let outcome = DatabaseCleanupOperation::new(context)
        .with_timeout(config.timeout())
        .execute(|token| ProviderClient::new(&config, token))
        .await?;

    publish(&outcome)?;
    Ok(())
}

fn publish(outcome: &CleanupOutcome) -> Result<()> {
    let sink: Box<dyn OutputSink> = match GithubOutputFile::from_env() {
        Some(file) => Box::new(file),
        None => {
            debug!("GITHUB_OUTPUT not set, printing outputs");
            Box::new(StdoutSink)
        }
    };

    outcome
        .publish(sink.as_ref())
        .context("Failed to publish outputs")?;

    info!(
        "Outputs: deleted={} database_name={}",
        outcome.deleted, outcome.database_name
    );
    Ok(())
}
