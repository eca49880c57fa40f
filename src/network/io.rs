//! Socket primitives
//!
//! Fallible replacements for the usual "or-die" helpers. Each returns a
//! `Result`; the caller decides whether a failure ends the process or just
//! one worker.

use std::io::{self, BufRead, Read};
use std::net::{TcpListener, TcpStream};

use crate::error::{Result, WserverError};

use super::Connection;

/// Open a listening socket on `host:port`
pub fn open_listener(host: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr).map_err(|source| WserverError::Bind { addr, source })
}

/// Accept one connection, retrying calls interrupted by a signal
pub fn accept(listener: &TcpListener) -> Result<TcpStream> {
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Ok(stream),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(WserverError::Accept(e)),
        }
    }
}

/// Open a client connection to `host:port`
pub fn open_client(host: &str, port: u16, buffer_size: usize) -> Result<Connection> {
    let addr = format!("{}:{}", host, port);
    let stream = TcpStream::connect(&addr)
        .map_err(|source| WserverError::Connect { addr, source })?;
    Ok(Connection::new(stream, buffer_size))
}

/// Read one line (terminator included) of at most `max_len` bytes into `buf`
///
/// `buf` is cleared first. Returns 0 at end-of-stream. A line that does not
/// end within `max_len` bytes is a protocol error.
pub fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> Result<usize>
where
    R: BufRead + ?Sized,
{
    buf.clear();
    let n = Read::take(&mut *reader, max_len as u64).read_until(b'\n', buf)?;

    if n == max_len && buf.last() != Some(&b'\n') && !reader.fill_buf()?.is_empty() {
        return Err(WserverError::Protocol(format!(
            "line exceeds {} bytes",
            max_len
        )));
    }
    Ok(n)
}
