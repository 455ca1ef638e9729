//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::constants::server::{DEFAULT_HOST, DEFAULT_PORT};
use crate::engine::ServerConfig;
use crate::session::Features;

fn parse_threads(s: &str) -> Result<usize, String> {
    let threads: usize = s
        .parse()
        .map_err(|e| format!("Invalid thread count: {}", e))?;
    if threads == 0 {
        return Err("thread count must be at least 1".to_string());
    }
    Ok(threads)
}

/// Serve discussion threads as NNTP newsgroups
#[derive(Parser, Debug, Clone)]
#[command(name = "newsgate", version, about)]
pub struct Args {
    /// Host to listen on
    #[arg(short = 'l', long = "listen", default_value = DEFAULT_HOST, env = "NEWSGATE_LISTEN")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "NEWSGATE_PORT")]
    pub port: u16,

    /// Number of worker threads
    #[arg(short, long, default_value = "1", value_parser = parse_threads, env = "NEWSGATE_THREADS")]
    pub threads: usize,

    /// Only advertise IHAVE (disables streaming)
    #[arg(short = 'I', long, conflicts_with = "streaming_only")]
    pub ihave_only: bool,

    /// Only advertise streaming (disables IHAVE)
    #[arg(short = 'S', long)]
    pub streaming_only: bool,

    /// Log every received command and sent status line
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Configuration file
    #[arg(short, long, env = "NEWSGATE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Transfer features left enabled by `-I`/`-S`
    #[must_use]
    pub fn features(&self) -> Features {
        Features {
            ihave: !self.streaming_only,
            streaming: !self.ihave_only,
        }
    }

    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            threads: self.threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("newsgate").chain(argv.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.host, "localhost");
        assert_eq!(args.port, 119);
        assert_eq!(args.threads, 1);
        assert!(!args.debug);
        assert!(args.config.is_none());
        assert_eq!(args.features(), Features::default());
    }

    #[test]
    fn test_listen_settings() {
        let args = parse(&["-l", "0.0.0.0", "-p", "1119", "-t", "4"]).unwrap();
        let server = args.server_config();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 1119);
        assert_eq!(server.threads, 4);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(parse(&["-t", "0"]).is_err());
        assert!(parse(&["-t", "many"]).is_err());
    }

    #[test]
    fn test_ihave_only() {
        let features = parse(&["-I"]).unwrap().features();
        assert!(features.ihave);
        assert!(!features.streaming);
    }

    #[test]
    fn test_streaming_only() {
        let features = parse(&["--streaming-only"]).unwrap().features();
        assert!(!features.ihave);
        assert!(features.streaming);
    }

    #[test]
    fn test_ihave_and_streaming_only_conflict() {
        let err = parse(&["-I", "-S"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_unknown_flag_fails() {
        let err = parse(&["--bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
