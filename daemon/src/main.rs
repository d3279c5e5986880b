//! Relay gate daemon: entry point for running the verification gate.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use gate_ledger::VerificationLedger;
use gate_node::config::{default_data_dir, DEFAULT_MAP_SIZE_MB};
use gate_node::{BackendConfig, GateConfig, GateNode};
use gate_types::{Timestamp, UserId};
use gate_utils::LogFormat;

#[derive(Parser)]
#[command(name = "relay-gate", about = "World ID gated relay kiosk verification service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "RELAY_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Address for the HTTP API.
    #[arg(long, env = "RELAY_GATE_LISTEN_ADDR")]
    listen_addr: Option<SocketAddr>,

    /// Minimum seconds between two verifications of the same user (0 disables).
    #[arg(long, env = "RELAY_GATE_COOLDOWN_SECS")]
    cooldown_secs: Option<u64>,

    /// Do not maintain the global verification counter.
    #[arg(long, env = "RELAY_GATE_NO_COUNTER")]
    no_counter: bool,

    /// Storage backend: "lmdb", "memory" or "rest".
    #[arg(long, env = "RELAY_GATE_BACKEND")]
    backend: Option<String>,

    /// LMDB data directory (lmdb backend).
    #[arg(long, env = "RELAY_GATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// REST store base URL (rest backend).
    #[arg(long, env = "RELAY_GATE_REST_URL")]
    rest_url: Option<String>,

    /// REST store bearer token (rest backend).
    #[arg(long, env = "RELAY_GATE_REST_TOKEN", hide_env_values = true)]
    rest_token: Option<String>,

    /// World ID app id.
    #[arg(long, env = "RELAY_GATE_APP_ID")]
    app_id: Option<String>,

    /// World ID action.
    #[arg(long, env = "RELAY_GATE_ACTION")]
    action: Option<String>,

    /// Allowed browser origins (comma-separated).
    #[arg(long, env = "RELAY_GATE_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "RELAY_GATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "RELAY_GATE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP gate until SIGINT/SIGTERM.
    Serve,
    /// Show a user's last verification, remaining cooldown and the global count.
    Inspect {
        /// Nullifier hash identifying the user.
        nullifier: String,
    },
}

/// File config (or defaults) with CLI flags and env vars applied on top.
fn build_config(cli: &Cli) -> anyhow::Result<GateConfig> {
    let mut config = match cli.config {
        Some(ref path) => GateConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => GateConfig::default(),
    };

    if let Some(addr) = cli.listen_addr {
        config.listen_addr = addr;
    }
    if let Some(secs) = cli.cooldown_secs {
        config.cooldown_secs = secs;
    }
    if cli.no_counter {
        config.count_verifications = false;
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if cli.log_json {
        config.log_format = LogFormat::Json;
    }
    if !cli.allowed_origins.is_empty() {
        config.allowed_origins = cli.allowed_origins.clone();
    }
    if let Some(ref app_id) = cli.app_id {
        config.verifier.app_id = app_id.clone();
    }
    if let Some(ref action) = cli.action {
        config.verifier.action = action.clone();
    }

    let kind = cli.backend.as_deref().unwrap_or(config.backend.kind());
    config.backend = match kind {
        "lmdb" => {
            let (path, map_size_mb) = match config.backend {
                BackendConfig::Lmdb {
                    ref path,
                    map_size_mb,
                } => (path.clone(), map_size_mb),
                _ => (default_data_dir(), DEFAULT_MAP_SIZE_MB),
            };
            BackendConfig::Lmdb {
                path: cli.data_dir.clone().unwrap_or(path),
                map_size_mb,
            }
        }
        "memory" => BackendConfig::Memory,
        "rest" => {
            let (url, token, request_timeout_secs) = match config.backend {
                BackendConfig::Rest {
                    ref url,
                    ref token,
                    request_timeout_secs,
                } => (Some(url.clone()), Some(token.clone()), request_timeout_secs),
                _ => (None, None, 5),
            };
            BackendConfig::Rest {
                url: cli
                    .rest_url
                    .clone()
                    .or(url)
                    .context("rest backend needs --rest-url")?,
                token: cli
                    .rest_token
                    .clone()
                    .or(token)
                    .context("rest backend needs --rest-token")?,
                request_timeout_secs,
            }
        }
        other => anyhow::bail!("unknown backend {other:?}, expected lmdb, memory or rest"),
    };

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    gate_utils::init_logging(config.log_format, &config.log_level);

    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Serve => {
            let node = GateNode::new(config).await?;
            node.run().await?;
            tracing::info!("relay gate exited cleanly");
        }
        Command::Inspect { nullifier } => {
            let user = UserId::parse(nullifier).context("invalid nullifier")?;
            let backend = gate_node::open_backend(&config.backend).await?;
            let ledger = VerificationLedger::new(backend.clone());
            let report =
                gate_node::inspect(&ledger, config.cooldown(), &user, Timestamp::now()).await;
            backend.close().await?;
            println!("{}", report?);
        }
    }

    Ok(())
}
