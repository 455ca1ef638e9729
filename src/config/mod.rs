//! Configuration module
//!
//! This module handles all configuration types and loading
//! for the gateway. Every setting has a default, so the server
//! runs without any configuration file.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{ConfigSource, load_config, load_config_with_fallback};
pub use types::{ArticleConfig, Config, SourceConfig, SpoolConfig, StatsConfig};

pub use defaults::{
    base_url, max_age_days, message_id_domain, newsrc_path, path_header, report_interval_secs,
    spool_path, user_agent,
};
