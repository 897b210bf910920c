//! linecmd Server Binary
//!
//! Starts the TCP command server.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use linecmd::config::SyncStrategy;
use linecmd::protocol::TokenMode;
use linecmd::{store, Config, HandlerRegistry, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// linecmd Server
#[derive(Parser, Debug)]
#[command(name = "linecmd-server")]
#[command(about = "Line-oriented TCP command server")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, env = "LINECMD_LISTEN", default_value = "0.0.0.0:10000")]
    listen: String,

    /// Session lifetime in milliseconds, counted from accept
    #[arg(short = 't', long, env = "LINECMD_SESSION_TIMEOUT_MS", default_value = "10000")]
    session_timeout_ms: u64,

    /// Maximum concurrent sessions
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Journal directory; omit to keep data in memory
    #[arg(short, long, env = "LINECMD_DATA_DIR")]
    data_dir: Option<String>,

    /// fsync the journal every N entries (1 = every write)
    #[arg(long, default_value = "1")]
    sync_every: usize,

    /// How request lines are tokenized
    #[arg(long, value_enum, default_value = "delimited")]
    tokens: Tokens,

    /// Database owner recorded on createdb
    #[arg(short, long, env = "DBUSER", default_value = "linecmd")]
    user: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Tokens {
    /// command:arg1:arg2
    Delimited,
    /// the whole line is the command
    Whole,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linecmd=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("linecmd Server v{}", linecmd::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = match args.sync_every {
        0 | 1 => SyncStrategy::EveryWrite,
        count => SyncStrategy::EveryNEntries { count },
    };
    let token_mode = match args.tokens {
        Tokens::Delimited => TokenMode::Delimited(':'),
        Tokens::Whole => TokenMode::Whole,
    };

    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .session_timeout_ms(args.session_timeout_ms)
        .max_connections(args.max_connections)
        .token_mode(token_mode)
        .sync_strategy(sync_strategy)
        .owner(&args.user);
    if let Some(dir) = &args.data_dir {
        tracing::info!("Data directory: {}", dir);
        builder = builder.data_dir(dir);
    }
    let config = builder.build();

    // Open store
    let service = match store::open_store(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start db service: {}", e);
            std::process::exit(1);
        }
    };

    let registry = Arc::new(HandlerRegistry::with_builtins());
    tracing::info!("Registered commands: {:?}", registry.names());

    let server = Server::new(config, registry, service);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
