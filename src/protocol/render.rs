//! Response rendering
//!
//! Deliberately not an HTTP parser: no status line, content-length or
//! chunked handling. Lines are copied out until end-of-stream.

use std::io::{BufRead, Write};

use crate::error::Result;

/// Prefix written in front of every header line
pub const HEADER_PREFIX: &[u8] = b"Header: ";

/// Line that ends the header section
pub const HEADER_TERMINATOR: &[u8] = b"\r\n";

/// What a render pass saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub header_lines: usize,
    pub body_lines: usize,
    /// Whether the blank `\r\n` separator was read before end-of-stream
    pub saw_terminator: bool,
}

/// Copy a response from `reader` to `out`, one line per write
///
/// Header lines get [`HEADER_PREFIX`]; the terminator itself is not printed;
/// body lines are written verbatim. Each line goes out in a single
/// `write_all` so concurrent renderers interleave only at line granularity
/// on sinks that lock per write.
pub fn render_response<R, W>(reader: &mut R, out: &mut W) -> Result<RenderSummary>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = RenderSummary::default();
    let mut line = Vec::new();
    let mut rendered = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            out.flush()?;
            return Ok(summary);
        }
        if line == HEADER_TERMINATOR {
            summary.saw_terminator = true;
            break;
        }

        rendered.clear();
        rendered.extend_from_slice(HEADER_PREFIX);
        rendered.extend_from_slice(&line);
        out.write_all(&rendered)?;
        summary.header_lines += 1;
    }

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        out.write_all(&line)?;
        summary.body_lines += 1;
    }

    out.flush()?;
    Ok(summary)
}
