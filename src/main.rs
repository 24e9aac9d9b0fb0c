//! KratOs Connection Query Tool
//!
//! Runs peer queries against a JSON snapshot of ConnDB, ConnHub and
//! ConnStaging, printing the resulting peers as JSON on stdout.
//!
//! ```text
//! kratos-conn-query --snapshot peers.json connectable --pool dbAndStaging --backoff --sort
//! kratos-conn-query --snapshot peers.json connected --health pinged
//! kratos-conn-query --snapshot peers.json stats
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use kratos_conn_query::{
    now_millis, passes_group_debounce, sort_by_state_change, ConnQueryConfig, HealthFilter, Peer,
    PoolSelector, SourceSnapshot, TimestampMs,
};

/// KratOs peer connection queries
#[derive(Parser, Debug)]
#[command(name = "kratos-conn-query")]
#[command(author = "KratOs Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read-only peer queries over KratOs peer store snapshots", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "conn-query.toml")]
    config: PathBuf,

    /// JSON snapshot of the db, hub and staging stores
    #[arg(short, long, env = "KRATOS_PEER_SNAPSHOT")]
    snapshot: PathBuf,

    /// Reference timestamp in ms since epoch (defaults to now)
    #[arg(long)]
    now: Option<TimestampMs>,

    /// Override backoff step (ms)
    #[arg(long)]
    backoff_step_ms: Option<u64>,

    /// Override backoff cap (ms)
    #[arg(long)]
    backoff_max_ms: Option<u64>,

    /// Override group debounce gap (ms)
    #[arg(long)]
    group_min_gap_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "KRATOS_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every known peer, connected or not
    All(FilterArgs),

    /// Peers currently connected
    Connected(FilterArgs),

    /// Peers currently being connected to
    Connecting(FilterArgs),

    /// Peers connected or connecting
    InConnection(FilterArgs),

    /// Dial candidates not already in connection
    Connectable {
        /// Pool to draw from (db, staging, dbAndStaging)
        #[arg(long)]
        pool: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Store sizes and connection counts
    Stats,
}

/// Post-processing applied to a peer list, in declaration order
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Keep only peers matching a health predicate
    #[arg(long, value_enum)]
    health: Option<HealthFilter>,

    /// Keep only peers whose exponential backoff has elapsed
    #[arg(long)]
    backoff: bool,

    /// Suppress the whole list unless the group debounce has elapsed
    #[arg(long)]
    debounce: bool,

    /// Sort by stateChange, oldest first
    #[arg(long)]
    sort: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout carries the JSON output)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = if args.config.exists() {
        ConnQueryConfig::load(&args.config)?
    } else {
        warn!("Config file {:?} not found, using defaults", args.config);
        ConnQueryConfig::default()
    };

    // Override config with CLI args
    let config = config
        .with_backoff_step_ms(args.backoff_step_ms)
        .with_backoff_max_ms(args.backoff_max_ms)
        .with_group_min_gap_ms(args.group_min_gap_ms);

    config.validate()?;
    debug!("Configuration: {:?}", config);

    let now = args.now.unwrap_or_else(now_millis);
    let query = SourceSnapshot::load(&args.snapshot)?.into_query();

    let (peers, filters) = match args.command {
        Command::Stats => {
            let stats = query.stats();
            info!(
                "Stats: {} connected, {} connecting, {} connectable",
                stats.connected, stats.connecting, stats.connectable
            );
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }
        Command::All(filters) => (query.all_peers(), filters),
        Command::Connected(filters) => (query.connected_peers(), filters),
        Command::Connecting(filters) => (query.connecting_peers(), filters),
        Command::InConnection(filters) => (query.in_connection_peers(), filters),
        Command::Connectable { pool, filters } => {
            let pool = match pool {
                Some(pool) => pool.parse::<PoolSelector>()?,
                None => config.default_pool,
            };
            (query.connectable_peers(pool), filters)
        }
    };

    let peers = apply_filters(peers, &filters, &config, now);
    info!("{} peers selected", peers.len());
    println!("{}", serde_json::to_string_pretty(&peers)?);

    Ok(())
}

fn apply_filters(
    mut peers: Vec<Peer>,
    filters: &FilterArgs,
    config: &ConnQueryConfig,
    now: TimestampMs,
) -> Vec<Peer> {
    if let Some(health) = filters.health {
        peers.retain(|peer| health.matches(peer));
    }

    if filters.backoff {
        peers = config.backoff_policy().filter(peers, now);
    }

    if filters.debounce {
        peers = passes_group_debounce(config.group_min_gap_ms, now)(peers);
    }

    if filters.sort {
        peers = sort_by_state_change(peers);
    }

    peers
}
