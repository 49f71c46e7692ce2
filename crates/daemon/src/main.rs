//! Deadman Switch Daemon - Main Entry Point
//!
//! Verifies the machine stays under its operator's control and powers it
//! off (graceful unmount/crypto-close first, forced poweroff always) when
//! network reachability is lost for too long or the attached USB device
//! set changes from the arm-time baseline.

mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deadman_core::application::{EngineExit, MonitorEngine};
use deadman_core::port::time_provider::SystemTimeProvider;
use deadman_infra_system::{LsusbSnapshotter, PingProber, ShellCommandRunner};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status for refusing to arm (network down before arming, or no
/// baseline could be captured).
const EXIT_REFUSED_TO_ARM: u8 = 1;
/// Exit status for invalid configuration.
const EXIT_BAD_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "deadmand")]
#[command(about = "Dead man's switch: auto-poweroff on network loss or USB tamper", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file (tilde-expanded)
    #[arg(long, env = "DEADMAN_CONFIG")]
    config: Option<String>,

    /// Dry run: log every decision, execute nothing destructive
    #[arg(long)]
    test_mode: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging();

    info!("Deadman Switch Daemon v{} starting", VERSION);

    let mut config = match settings::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Configuration rejected");
            return ExitCode::from(EXIT_BAD_CONFIG);
        }
    };

    // The flag only ever forces the safe direction.
    if cli.test_mode {
        config.test_mode = true;
    }

    if config.test_mode {
        info!("Test mode: no destructive action will be taken");
    }

    match run(config).await {
        Ok(EngineExit::ValidationFailed) => ExitCode::from(EXIT_REFUSED_TO_ARM),
        Ok(EngineExit::Triggered(reason)) => {
            // Only reachable in test mode; a live trigger powers off the
            // machine underneath us.
            info!(reason = %reason, "Trigger handled, exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "Could not arm");
            ExitCode::from(EXIT_REFUSED_TO_ARM)
        }
    }
}

async fn run(config: deadman_core::MonitorConfig) -> Result<EngineExit> {
    let prober = Arc::new(PingProber::new(config.probe_timeout()));
    let snapshotter = Arc::new(LsusbSnapshotter::new());
    let runner = Arc::new(ShellCommandRunner::new());
    let time = Arc::new(SystemTimeProvider);

    let engine = MonitorEngine::new(config, prober, snapshotter, runner, time);
    Ok(engine.run().await?)
}

fn init_logging() {
    let log_format = std::env::var("DEADMAN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("deadman=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
