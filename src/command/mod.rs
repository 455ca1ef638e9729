//! Command processing module
//!
//! Splits client lines into commands and arguments and parses the
//! argument forms the session layer needs.

mod classifier;
mod types;

pub use classifier::{Command, CommandLine};
pub use types::{ArticleSpec, parse_range};
