//! Network Module
//!
//! Socket primitives, the connection handle, and the server dispatcher.
//!
//! ## Architecture
//! - One listening socket shared by a fixed pool of worker threads
//! - Accept serialized by a single lock; handling runs outside it
//! - Each accepted connection owned by exactly one worker until closed

mod io;
mod connection;
mod stats;
mod server;

pub use io::{accept, open_client, open_listener, read_line};
pub use connection::Connection;
pub use stats::DispatchStats;
pub use server::{AcceptLock, Server, ServerHandle};
