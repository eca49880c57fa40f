//! Request framing
//!
//! Building the client's GET and reading a request head on the server.

use std::io::BufRead;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, WserverError};
use crate::network::read_line;

/// Upper bound on request-head lines before the request is rejected
pub const MAX_HEAD_LINES: usize = 100;

/// Build the fixed GET request for `path`, addressed to `host`
///
/// Always `GET <path> HTTP/1.1\n` followed by `host: <host>\n\r\n`.
pub fn build_request(path: &str, host: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(32 + path.len() + host.len());
    buf.put_slice(b"GET ");
    buf.put_slice(path.as_bytes());
    buf.put_slice(b" HTTP/1.1\n");
    buf.put_slice(b"host: ");
    buf.put_slice(host.as_bytes());
    buf.put_slice(b"\n\r\n");
    buf.freeze()
}

/// Parsed request line plus raw header lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: String,
    /// Header lines with their terminators stripped, in arrival order
    pub headers: Vec<String>,
}

impl RequestHead {
    /// Value of the first header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Read a request head: the request line, then header lines up to a blank
/// line or end-of-stream
///
/// Every line, the request line included, must fit in `max_line` bytes.
pub fn read_request_head<R>(reader: &mut R, max_line: usize) -> Result<RequestHead>
where
    R: BufRead + ?Sized,
{
    let mut line = Vec::new();

    if read_line(&mut *reader, &mut line, max_line)? == 0 {
        return Err(WserverError::Protocol("empty request".to_string()));
    }
    let request_line = trim_line(&line);

    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) if parts.next().is_none() => {
            (m.to_string(), t.to_string(), v.to_string())
        }
        _ => {
            return Err(WserverError::Protocol(format!(
                "malformed request line: {:?}",
                request_line
            )))
        }
    };

    let mut headers = Vec::new();
    loop {
        if read_line(&mut *reader, &mut line, max_line)? == 0 {
            break;
        }
        let header = trim_line(&line);
        if header.is_empty() {
            break;
        }
        if headers.len() == MAX_HEAD_LINES {
            return Err(WserverError::Protocol(format!(
                "more than {} header lines",
                MAX_HEAD_LINES
            )));
        }
        headers.push(header);
    }

    Ok(RequestHead {
        method,
        target,
        version,
        headers,
    })
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
