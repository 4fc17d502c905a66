use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::fs;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use boostr::config::Config;
use boostr::context::BoostContext;
use boostr::remote::HhClient;
use boostr::runner::{self, RunOutcome};

mod cli;

use cli::Cli;
use cli::commands::Commands;

fn setup_logging(config: &Config) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // --debug, then log-level, then RUST_LOG
    if config.debug || config.log_level.is_some() {
        builder.parse_filters(config.effective_log_level());
    }

    if let Some(log_file) = &config.log_file {
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }
        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();

    if let Some(log_file) = &config.log_file {
        info!("Logging initialized, writing to: {}", log_file.display());
    }
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    match cli.selected() {
        Commands::Run => run_boostr(config),
        Commands::Check => check_config(config),
    }
}

fn check_config(config: &Config) -> Result<()> {
    let schedule = &config.schedule;
    let policy = &config.eligibility;

    println!("{}", "Configuration is valid".green());
    println!("  {} {}", "Endpoint:".cyan(), config.account.endpoint);
    println!("  {} {}", "Login:".cyan(), config.account.login);
    println!("  {} {}", "Chrome:".cyan(), config.account.chrome_version);
    println!(
        "  {} every {}s (retry after {}s)",
        "Boost:".cyan(),
        schedule.refresh_interval_secs,
        schedule.refresh_backoff_secs
    );
    if schedule.discover_interval_secs == 0 {
        println!(
            "  {} once (retry after {}s)",
            "Discovery:".cyan(),
            schedule.discover_backoff_secs
        );
    } else {
        println!(
            "  {} every {}s (retry after {}s)",
            "Discovery:".cyan(),
            schedule.discover_interval_secs,
            schedule.discover_backoff_secs
        );
    }

    if !policy.allowed.is_empty() {
        println!(
            "  {} ids {:?}, titles containing {:?}",
            "Only boosting:".yellow(),
            policy.allowed.ids,
            policy.allowed.substrings
        );
    } else if !policy.ignored.is_empty() {
        println!(
            "  {} ids {:?}, titles containing {:?}, public: {}, private: {}",
            "Ignoring:".yellow(),
            policy.ignored.ids,
            policy.ignored.substrings,
            policy.ignored.public,
            policy.ignored.private
        );
    }
    Ok(())
}

fn run_boostr(config: &Config) -> Result<()> {
    info!("Starting application");

    let client = Arc::new(HhClient::new(&config.account, config.http_debug).context("Failed to build HTTP client")?);
    let cancel = CancellationToken::new();
    let ctx = BoostContext::from_config(config, cancel.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        tokio::spawn(cancel_on_signal(cancel));

        let task = tokio::spawn(async move { runner::run(&ctx, client.clone(), client).await });
        let summary = task.await.context("Boost runner panicked")?;

        match summary.outcome {
            RunOutcome::NothingToDo => info!("Nothing to boost"),
            RunOutcome::Cancelled => info!("Shutting down"),
        }
        info!(
            "Scheduled {} resume(s), {} successful boost(s), {} failed attempt(s)",
            summary.scheduled, summary.boosts, summary.failures
        );
        Ok::<(), eyre::Report>(())
    })
}

/// Cancel `cancel` on Ctrl-C or SIGTERM.
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Received shutdown signal");
    cancel.cancel();
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration, then layer the command-line overrides on top
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.apply_overrides(cli.login.as_deref(), cli.password.as_deref(), cli.debug);

    setup_logging(&config).context("Failed to setup logging")?;
    for (path, reason) in &config.skipped {
        warn!("Failed to load {}: {}", path.display(), reason);
    }
    match &config.source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    config.validate().context("Invalid configuration")?;

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
