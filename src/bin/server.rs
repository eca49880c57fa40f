//! wserver Binary
//!
//! Runs the thread-pool HTTP server.

use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use wserver::config::{DEFAULT_BUFFER_SIZE, DEFAULT_NUM_THREADS, DEFAULT_PORT};
use wserver::{BasicHandler, Server, ServerConfig};

/// wserver
#[derive(Parser, Debug)]
#[command(name = "wserver")]
#[command(about = "Thread-pool HTTP server")]
#[command(version)]
struct Args {
    /// Directory to run out of
    #[arg(short = 'd', long, default_value = ".")]
    root_dir: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of acceptor worker threads
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_NUM_THREADS)]
    num_threads: usize,

    /// Per-connection buffer size in bytes
    #[arg(short = 'b', long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wserver=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let config = ServerConfig::builder()
        .root_dir(&args.root_dir)
        .port(args.port)
        .num_threads(args.num_threads)
        .buffer_size(args.buffer_size)
        .build();

    // Reject bad values before touching the file system or the network
    if let Err(e) = config.validate() {
        eprintln!("wserver: {}", e);
        eprintln!("usage: wserver [-d basedir] [-p port] [-t num_threads] [-b buffer_size]");
        process::exit(1);
    }

    tracing::info!("wserver v{}", wserver::VERSION);
    tracing::info!("Root directory: {}", config.root_dir.display());

    if let Err(e) = std::env::set_current_dir(&config.root_dir) {
        tracing::error!("Cannot enter {}: {}", config.root_dir.display(), e);
        process::exit(1);
    }

    let server = match Server::bind(config, BasicHandler::new()) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        process::exit(1);
    }

    tracing::info!("Server stopped");
}
