//! lookout - agent workspace monitor
//!
//! Polls the note workspaces of a roster of agents and serves their live
//! status and activity feed as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Serve on the configured port (default 7800)
//! lookout
//!
//! # Watch a different base directory on another port
//! lookout --base-dir ~/agents --port 9000
//!
//! # One poll cycle, print statuses, exit
//! lookout --once
//!
//! # With verbose logging
//! lookout -v
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use lookout_config::{LookoutConfig, ModelTable, expand_tilde};
use lookout_core::{LogGuard, LookoutError, Result, init_logging};
use lookout_engine::{DashboardState, Scheduler};
use tracing::{error, info};

/// Agent workspace monitor
///
/// Watches agent note workspaces and serves per-agent status and an
/// activity feed over HTTP.
#[derive(Parser, Debug)]
#[command(name = "lookout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.lookout/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the agent workspaces
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Port for the JSON API
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for log files (defaults to ~/.lookout/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Prime, poll once, print agent statuses as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(()) => {
            info!("lookout exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "lookout failed");
            eprintln!("Error: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

/// Load the config file and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<LookoutConfig> {
    let mut config = LookoutConfig::load(cli.config.as_deref())?;
    if let Some(base_dir) = &cli.base_dir {
        config.base_dir = expand_tilde(base_dir);
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

fn listen_addr(config: &LookoutConfig) -> Result<SocketAddr> {
    let ip: IpAddr = config.bind_address.parse().map_err(|_| {
        LookoutError::config_validation(format!(
            "bind_address is not an IP address: {}",
            config.bind_address
        ))
    })?;
    Ok(SocketAddr::new(ip, config.port))
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    info!(
        base_dir = %config.base_dir.display(),
        agents = config.agents.len(),
        poll_interval_secs = config.poll_interval_secs,
        "Starting lookout"
    );

    let models = ModelTable::load(&config.models_file, &config.default_model);
    let state = Arc::new(DashboardState::new(
        config.roster(),
        config.activity_log_capacity,
    ));
    let scheduler = Scheduler::new(&config, models, Arc::clone(&state));

    if cli.once {
        scheduler.prime();
        scheduler.poll_once(Utc::now());
        let json = serde_json::to_string_pretty(&state.statuses())
            .map_err(|e| LookoutError::internal(format!("cannot serialise statuses: {e}")))?;
        println!("{}", json);
        return Ok(());
    }

    let addr = listen_addr(&config)?;
    let handle = scheduler.start().await;
    let served = lookout_server::serve(addr, state).await;
    handle.abort();
    served
}
