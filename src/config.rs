//! Configuration for wserver
//!
//! Server and client settings, captured once at startup and shared
//! read-only with every worker.

use std::path::PathBuf;

use crate::error::{Result, WserverError};

/// Default port the server listens on
pub const DEFAULT_PORT: u16 = 10000;

/// Default number of acceptor workers
pub const DEFAULT_NUM_THREADS: usize = 4;

/// Default per-exchange buffer size (bytes)
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the server process
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory the server runs out of
    pub root_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Host or address to bind the listening socket to
    pub bind_host: String,

    /// TCP port to listen on (0 lets the OS choose)
    pub port: u16,

    // -------------------------------------------------------------------------
    // Worker Configuration
    // -------------------------------------------------------------------------
    /// Number of acceptor workers in the pool
    pub num_threads: usize,

    /// Per-connection read buffer capacity (bytes)
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            num_threads: DEFAULT_NUM_THREADS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Check values that must be rejected before any socket is opened
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(WserverError::Config(
                "num_threads must be greater than 0".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(WserverError::Config(
                "buffer_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Address string handed to the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the directory the server runs out of
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the bind host
    pub fn bind_host(mut self, host: impl Into<String>) -> Self {
        self.config.bind_host = host.into();
        self
    }

    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the number of acceptor workers
    pub fn num_threads(mut self, count: usize) -> Self {
        self.config.num_threads = count;
        self
    }

    /// Set the per-connection buffer size (in bytes)
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the fan-out client. Every field is required.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Target host name or address
    pub host: String,

    /// Target port
    pub port: u16,

    /// Path requested by every worker
    pub path: String,

    /// Number of concurrent request workers
    pub num_threads: usize,

    /// Name sent in the `host:` header; the local machine's hostname
    pub client_hostname: String,
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        num_threads: usize,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            num_threads,
            client_hostname: local_hostname(),
        }
    }

    /// Override the name sent in the `host:` header
    pub fn with_client_hostname(mut self, name: impl Into<String>) -> Self {
        self.client_hostname = name.into();
        self
    }

    /// Check values that must be rejected before any network activity
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(WserverError::Config("host must not be empty".to_string()));
        }
        if self.path.is_empty() {
            return Err(WserverError::Config("path must not be empty".to_string()));
        }
        if self.num_threads == 0 {
            return Err(WserverError::Config(
                "num_threads must be greater than 0".to_string(),
            ));
        }
        if self.client_hostname.is_empty() {
            return Err(WserverError::Config(
                "client hostname must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` of the target server
    pub fn target_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hostname of the machine this process runs on
pub fn local_hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}
