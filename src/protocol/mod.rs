//! Protocol Module
//!
//! The small slice of HTTP/1.x framing both programs need.
//!
//! ## Request Format (as sent by the client)
//! ```text
//! GET <path> HTTP/1.1\n
//! host: <hostname>\n
//! \r\n
//! ```
//! The request and host lines end in a bare line feed; only the final
//! separator is CRLF. The server accepts either terminator.
//!
//! ## Response Rendering
//! Line oriented. Every line before the first line equal to `\r\n` is a
//! header; everything after it, up to end-of-stream, is body.

mod request;
mod response;
mod render;

pub use request::{build_request, read_request_head, RequestHead, MAX_HEAD_LINES};
pub use response::{Response, Status};
pub use render::{render_response, RenderSummary, HEADER_PREFIX, HEADER_TERMINATOR};
