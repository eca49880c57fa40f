//! Connection Handle
//!
//! Exclusive owner of one established TCP stream.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::error::Result;

use super::io::read_line;

/// One accepted (server side) or established (client side) connection
///
/// A `Connection` is never shared between workers. Closing consumes it, so
/// the descriptor is released exactly once: either by [`Connection::close`]
/// or, on an early-return path, by the drop of the inner stream.
#[derive(Debug)]
pub struct Connection {
    /// Buffered stream; writes go straight to the socket through `get_ref`
    stream: BufReader<TcpStream>,

    /// Read buffer capacity and line length limit
    buffer_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Wrap a stream with a read buffer of `buffer_size` bytes
    ///
    /// `buffer_size` also caps the length of a single line.
    pub fn new(stream: TcpStream, buffer_size: usize) -> Self {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Latency tweak only; the connection is still usable without it.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {}: {}", peer_addr, e);
        }

        Self {
            stream: BufReader::with_capacity(buffer_size, stream),
            buffer_size,
            peer_addr,
        }
    }

    /// Read one line (including its terminator) into `buf`
    ///
    /// `buf` is cleared first. Returns the number of bytes read; 0 means the
    /// peer closed its side. A line longer than the buffer size is a
    /// protocol error.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        read_line(&mut self.stream, buf, self.buffer_size)
    }

    /// Longest line `read_line` accepts
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Write all of `bytes`, retrying short writes until done
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut socket = self.stream.get_ref();
        socket.write_all(bytes)?;
        socket.flush()?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Shut the socket down and release it
    pub fn close(self) -> Result<()> {
        match self.stream.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Peer already gone; the descriptor is still released on drop.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl BufRead for Connection {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.stream.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.stream.consume(amt)
    }
}
