//! Response types

use bytes::{BufMut, Bytes, BytesMut};

/// Status codes the server produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotImplemented,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotImplemented => 501,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotImplemented => "Not Implemented",
        }
    }
}

/// A complete response with a plain-text body
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub body: String,
}

impl Response {
    pub fn new(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Serialize to wire bytes: status line, headers, CRLF, body
    pub fn to_bytes(&self) -> Bytes {
        let head = format!(
            "HTTP/1.0 {} {}\r\nServer: wserver/{}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            crate::VERSION,
            self.body.len()
        );

        let mut buf = BytesMut::with_capacity(head.len() + self.body.len());
        buf.put_slice(head.as_bytes());
        buf.put_slice(self.body.as_bytes());
        buf.freeze()
    }
}
