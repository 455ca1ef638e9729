//! NNTP response construction
//!
//! Every helper appends to a connection's outbound [`ByteQueue`]. Status
//! lines and multi-line payloads are terminated with CRLF; payload lines
//! starting with `.` are dot-stuffed (RFC 3977 §3.1.1).

use tracing::debug;

use crate::queue::ByteQueue;

/// Line ending: "\r\n"
pub const CRLF: &[u8] = b"\r\n";

/// Multiline response terminator line
pub const TERMINATOR: &[u8] = b".\r\n";

/// Fields announced by LIST OVERVIEW.FMT, in XOVER column order
pub const OVERVIEW_FMT: &[&str] = &[
    "Subject:",
    "From:",
    "Date:",
    "Message-ID:",
    "References:",
    ":bytes",
    ":lines",
];

/// Construct a response with status code and message
#[inline]
pub fn response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Queue a status line
pub fn push_status(out: &mut ByteQueue, code: u16, message: &str) {
    debug!("> {} {}", code, message);
    out.append_str(&response(code, message));
}

/// Queue one payload line, dot-stuffed
pub fn push_line(out: &mut ByteQueue, line: &str) {
    if line.starts_with('.') {
        out.append(b".");
    }
    out.append_str(line);
    out.append(CRLF);
}

/// Queue a block of text as payload lines
///
/// Bare `\n` and `\r\n` both end a line; a trailing newline does not
/// produce an extra empty line.
pub fn push_text(out: &mut ByteQueue, text: &str) {
    let text = text.strip_suffix('\n').unwrap_or(text);
    for line in text.split('\n') {
        push_line(out, line.strip_suffix('\r').unwrap_or(line));
    }
}

/// Queue the multi-line terminator
pub fn push_terminator(out: &mut ByteQueue) {
    out.append(TERMINATOR);
}
