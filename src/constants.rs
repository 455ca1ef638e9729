//! Constants used throughout the gateway
//!
//! This module centralizes magic numbers and default values
//! to improve maintainability and reduce duplication.

use std::time::Duration;

/// Buffer size constants
pub mod buffer {
    /// Size of one ByteQueue block (16KB)
    ///
    /// Every connection owns two queues (read and write), each a chain of
    /// these blocks. A block is only allocated once data needs it.
    pub const BLOCK: usize = 16 * 1024;

    /// Write queue length above which a connection flushes immediately
    /// instead of waiting for the end of the current command
    pub const EAGER_FLUSH: usize = 1024;
}

/// Listening socket constants
pub mod socket {
    /// Pending connection backlog for every listening socket
    pub const LISTEN_BACKLOG: i32 = 128;
}

/// Spool retention constants
pub mod spool {
    /// Articles older than this are expunged (14 days)
    pub const MAX_AGE_SECS: i64 = 60 * 60 * 24 * 14;

    /// Default file holding the content index
    pub const DEFAULT_SPOOL_PATH: &str = "spool";

    /// Default file holding the per-group article numbers
    pub const DEFAULT_NEWSRC_PATH: &str = "newsrc";
}

/// Origin service constants
pub mod source {
    /// Default origin base URL
    pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

    /// Some origins refuse requests without a user agent
    pub const DEFAULT_USER_AGENT: &str = "nntpreader/1.0";
}

/// Article rendering constants
pub mod article {
    /// Right-hand side of every generated message-id
    pub const DEFAULT_MESSAGE_ID_DOMAIN: &str = "reddit";

    /// Value of the Path header on generated articles
    pub const DEFAULT_PATH: &str = "reddit!not-for-mail";

    /// RFC 5322 date format used in Date headers and overview lines
    pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";
}

/// Statistics constants
pub mod stats {
    use super::Duration;

    /// How often every worker folds its local counters into the global totals
    pub const WORKER_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

    /// Default interval between aggregate stats reports
    pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 60;
}

/// Server identity
pub mod server {
    /// Name announced in the greeting and CAPABILITIES
    pub const IMPLEMENTATION: &str = "newsgate";

    /// Default listen host
    pub const DEFAULT_HOST: &str = "localhost";

    /// Default listen port
    pub const DEFAULT_PORT: u16 = 119;
}
