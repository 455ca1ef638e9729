//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use std::path::PathBuf;

use crate::constants;

/// Default content index file
#[inline]
pub fn spool_path() -> PathBuf {
    PathBuf::from(constants::spool::DEFAULT_SPOOL_PATH)
}

/// Default article number file
#[inline]
pub fn newsrc_path() -> PathBuf {
    PathBuf::from(constants::spool::DEFAULT_NEWSRC_PATH)
}

/// Default retention window (14 days)
#[inline]
pub fn max_age_days() -> u32 {
    (constants::spool::MAX_AGE_SECS / 86_400) as u32
}

/// Default origin base URL
#[inline]
pub fn base_url() -> String {
    constants::source::DEFAULT_BASE_URL.to_string()
}

/// Default user agent for origin requests
#[inline]
pub fn user_agent() -> String {
    constants::source::DEFAULT_USER_AGENT.to_string()
}

/// Default message-id domain
#[inline]
pub fn message_id_domain() -> String {
    constants::article::DEFAULT_MESSAGE_ID_DOMAIN.to_string()
}

/// Default Path header
#[inline]
pub fn path_header() -> String {
    constants::article::DEFAULT_PATH.to_string()
}

/// Default stats report interval
#[inline]
pub fn report_interval_secs() -> u64 {
    constants::stats::DEFAULT_REPORT_INTERVAL_SECS
}
