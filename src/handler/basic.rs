//! Basic request handler
//!
//! Reads one request head and answers it with a short plain-text response.
//! It never touches the file system.

use crate::error::{Result, WserverError};
use crate::network::Connection;
use crate::protocol::{read_request_head, Response, Status};

use super::RequestHandler;

/// Default handler installed by the `wserver` binary
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicHandler;

impl BasicHandler {
    pub fn new() -> Self {
        Self
    }

    fn respond(&self, conn: &mut Connection) -> Result<Status> {
        let max_line = conn.buffer_size();
        let response = match read_request_head(conn, max_line) {
            Ok(head) if head.method.eq_ignore_ascii_case("GET") => {
                tracing::trace!("{} GET {}", conn.peer_addr(), head.target);
                Response::new(Status::Ok, format!("requested {}\n", head.target))
            }
            Ok(head) => Response::new(
                Status::NotImplemented,
                format!("method {} is not implemented\n", head.method),
            ),
            Err(WserverError::Protocol(reason)) => {
                Response::new(Status::BadRequest, format!("{}\n", reason))
            }
            Err(e) => return Err(e),
        };

        conn.write_all(&response.to_bytes())?;
        Ok(response.status)
    }
}

impl RequestHandler for BasicHandler {
    fn handle(&self, conn: &mut Connection) -> Result<()> {
        let status = self.respond(conn)?;
        tracing::debug!("{} -> {}", conn.peer_addr(), status.code());
        Ok(())
    }
}
