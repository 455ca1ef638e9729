//! NNTP wire protocol helpers
//!
//! Status codes and response construction shared by the session layer.

pub mod codes;
mod responses;

pub use responses::{
    CRLF, OVERVIEW_FMT, TERMINATOR, push_line, push_status, push_terminator, push_text, response,
};
