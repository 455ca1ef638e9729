//! Configuration validation
//!
//! Checks semantic constraints serde cannot express before the server starts.

use anyhow::Result;

use super::types::Config;

impl Config {
    /// Validate configuration for correctness
    pub fn validate(&self) -> Result<()> {
        if self.spool.max_age_days == 0 {
            return Err(anyhow::anyhow!(
                "spool.max_age_days must be at least 1 (got 0)"
            ));
        }

        let base = self.source.base_url.as_str();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "source.base_url must be an http(s) URL (got '{}')",
                base
            ));
        }

        let domain = self.articles.message_id_domain.as_str();
        if domain.is_empty() || domain.contains(['<', '>', '@', ' ']) {
            return Err(anyhow::anyhow!(
                "articles.message_id_domain '{}' is not usable in a message-id",
                domain
            ));
        }

        if self.spool.spool_path == self.spool.newsrc_path {
            return Err(anyhow::anyhow!(
                "spool.spool_path and spool.newsrc_path must differ"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_max_age_rejected() {
        let mut config = Config::default();
        config.spool.max_age_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let mut config = Config::default();
        config.source.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_bad_message_id_domain_rejected() {
        let mut config = Config::default();
        config.articles.message_id_domain = "a@b".to_string();
        assert!(config.validate().is_err());
        config.articles.message_id_domain = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_paths_rejected() {
        let mut config = Config::default();
        config.spool.newsrc_path = config.spool.spool_path.clone();
        assert!(config.validate().is_err());
    }
}
