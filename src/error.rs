//! Error types for wserver
//!
//! One error type for both programs. Whether a fault is fatal or scoped to
//! one connection is decided by the caller, not by the primitive.

use std::io;

use thiserror::Error;

/// Result type alias using WserverError
pub type Result<T> = std::result::Result<T, WserverError>;

/// Unified error type for wserver operations
#[derive(Debug, Error)]
pub enum WserverError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Socket Setup / Admission Errors
    // -------------------------------------------------------------------------
    #[error("bind to {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Worker Errors
    // -------------------------------------------------------------------------
    #[error("worker spawn failed: {0}")]
    Spawn(#[source] io::Error),

    #[error("worker panicked: {0}")]
    WorkerPanicked(String),

    // -------------------------------------------------------------------------
    // Exchange Errors
    // -------------------------------------------------------------------------
    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WserverError {
    /// Turn a caught panic payload into a readable error
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        WserverError::WorkerPanicked(message)
    }
}
