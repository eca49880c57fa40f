//! Request Handler Module
//!
//! The boundary between the dispatcher and HTTP processing. The dispatcher
//! lends each accepted connection to a handler and closes it afterwards.

mod basic;

pub use basic::BasicHandler;

use crate::error::Result;
use crate::network::Connection;

/// Turns one connection into a completed HTTP exchange
///
/// The connection is borrowed for the duration of the call, so a handler
/// cannot keep it past its own return. Closing is the dispatcher's job.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, conn: &mut Connection) -> Result<()>;
}

impl<F> RequestHandler for F
where
    F: Fn(&mut Connection) -> Result<()> + Send + Sync + 'static,
{
    fn handle(&self, conn: &mut Connection) -> Result<()> {
        self(conn)
    }
}
