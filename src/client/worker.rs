//! Request Worker
//!
//! One connection, one GET, one rendered response.

use std::io::Write;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::network::{open_client, Connection};
use crate::protocol::{build_request, render_response, RenderSummary};

/// Read buffer for each client connection (bytes)
pub const CLIENT_BUFFER_SIZE: usize = 8192;

/// Performs exactly one request/response cycle against the configured target
#[derive(Debug, Clone)]
pub struct RequestWorker {
    id: usize,
    config: Arc<ClientConfig>,
}

impl RequestWorker {
    pub fn new(id: usize, config: Arc<ClientConfig>) -> Self {
        Self { id, config }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Connect, send, render into `out`, close
    ///
    /// The connection is closed on every path out of this function.
    pub fn run<W: Write + ?Sized>(&self, out: &mut W) -> Result<RenderSummary> {
        let mut conn = open_client(&self.config.host, self.config.port, CLIENT_BUFFER_SIZE)?;
        tracing::debug!("Worker {} connected to {}", self.id, conn.peer_addr());

        let exchanged = self.exchange(&mut conn, out);
        let closed = conn.close();

        let summary = exchanged?;
        closed?;
        Ok(summary)
    }

    /// Send the request and render the whole response
    pub fn exchange<W: Write + ?Sized>(
        &self,
        conn: &mut Connection,
        out: &mut W,
    ) -> Result<RenderSummary> {
        let request = build_request(&self.config.path, &self.config.client_hostname);
        conn.write_all(&request)?;

        let summary = render_response(conn, out)?;
        tracing::trace!(
            "Worker {} rendered {} header and {} body lines",
            self.id,
            summary.header_lines,
            summary.body_lines
        );
        Ok(summary)
    }
}
