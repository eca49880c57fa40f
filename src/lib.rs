//! # wserver
//!
//! A minimal concurrent HTTP request-service pair:
//! - A server that runs a fixed pool of acceptor workers over one
//!   listening socket, serializing only the accept call
//! - A load-generating client that fans out concurrent requests and
//!   renders each raw response
//!
//! ## Architecture Overview
//!
//! ```text
//!            ┌──────────────────────────────┐
//!            │      Listening Socket        │
//!            └──────────────┬───────────────┘
//!                           │  accept (under AcceptLock)
//!        ┌──────────────────┼──────────────────┐
//!        ▼                  ▼                  ▼
//!  ┌───────────┐      ┌───────────┐      ┌───────────┐
//!  │ worker 0  │      │ worker 1  │ ...  │ worker N  │
//!  └─────┬─────┘      └─────┬─────┘      └─────┬─────┘
//!        │ handle → close   │                  │
//!        ▼                  ▼                  ▼
//!  ┌─────────────────────────────────────────────────┐
//!  │                RequestHandler                   │
//!  └─────────────────────────────────────────────────┘
//! ```
//!
//! The client side mirrors it: `FanOut` spawns one `RequestWorker` per
//! configured thread, each owning its own connection, and joins them all.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod network;
pub mod protocol;
pub mod handler;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WserverError, Result};
pub use config::{ClientConfig, ServerConfig};
pub use network::{Connection, Server, ServerHandle};
pub use handler::{BasicHandler, RequestHandler};
pub use client::{FanOut, FanOutReport, RequestWorker};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of wserver
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
