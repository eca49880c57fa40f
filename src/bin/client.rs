//! wclient Binary
//!
//! Fires `num_threads` concurrent GET requests at one server and prints
//! every response.

use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use wserver::{ClientConfig, FanOut};

/// wclient
#[derive(Parser, Debug)]
#[command(name = "wclient")]
#[command(about = "Concurrent HTTP load generator")]
#[command(version)]
struct Args {
    /// Server host name or address
    host: String,

    /// Server port
    port: u16,

    /// Path to request
    path: String,

    /// Number of concurrent requests
    num_threads: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let config = ClientConfig::new(args.host, args.port, args.path, args.num_threads);
    let driver = match FanOut::new(config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("wclient: {}", e);
            eprintln!("usage: wclient <host> <port> <path> <num_threads>");
            process::exit(1);
        }
    };

    match driver.run() {
        Ok(report) if report.all_succeeded() => {}
        Ok(report) => {
            eprintln!(
                "wclient: {} of {} requests failed",
                report.failed(),
                report.outcomes.len()
            );
            process::exit(1);
        }
        Err(e) => {
            tracing::error!("Client error: {}", e);
            process::exit(1);
        }
    }
}
