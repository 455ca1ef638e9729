//! # newsgate
//!
//! A read-only NNTP server that presents threads from a remote discussion
//! site as newsgroups. Threads are fetched on demand when a client selects
//! a group, kept in a spool on disk, numbered per group, and rendered as
//! RFC 5322 articles. Peer transfer commands (CHECK, TAKETHIS, IHAVE) are
//! accepted and discarded, which makes the server usable as a feed sink for
//! benchmarking.
//!
//! ## Layout
//!
//! - [`engine`]: worker threads, acceptors, deferred connection close
//! - [`session`]: per-connection NNTP state machine
//! - [`source`]: remote retrieval and the spool refresh policy
//! - [`spool`], [`newsrc`], [`store`]: content index, article numbering, persistence
//! - [`render`]: article and overview generation
//! - [`queue`]: chunked byte queue used for all socket buffering

pub mod args;
pub mod command;
pub mod config;
pub mod constants;
pub mod content;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod network;
pub mod newsrc;
pub mod protocol;
pub mod queue;
pub mod render;
pub mod runtime;
pub mod session;
pub mod source;
pub mod spool;
pub mod store;

pub use args::Args;
pub use config::{Config, ConfigSource, load_config, load_config_with_fallback};
pub use engine::{Server, ServerConfig};
pub use error::{FetchError, RenderError, StoreError};
pub use metrics::{GlobalStats, WorkerCounters};
pub use render::{ContentRenderer, RfcRenderer};
pub use session::{Features, ProtocolHandler};
pub use source::{ContentSource, RedditSource, Refresher};
pub use store::{SharedStore, Store};
