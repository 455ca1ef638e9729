use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::ContentSource;
use crate::config::SourceConfig;
use crate::error::FetchError;

/// Fetches listings and threads over HTTPS
#[derive(Debug, Clone)]
pub struct RedditSource {
    client: reqwest::Client,
    base_url: String,
}

impl RedditSource {
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(30));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| FetchError::Request {
            url: config.base_url.clone(),
            source,
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    async fn get_json(&self, url: String) -> Result<Value, FetchError> {
        debug!(url = %url, "Fetching");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| FetchError::Request { url, source })
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    async fn fetch_listing(&self, group: &str) -> Result<Value, FetchError> {
        check_group(group)?;
        self.get_json(listing_url(&self.base_url, group)).await
    }

    async fn fetch_thread(&self, group: &str, id: &str) -> Result<Value, FetchError> {
        check_group(group)?;
        if !is_valid_group(id) {
            return Err(FetchError::Other(format!("invalid thread id '{}'", id)));
        }
        self.get_json(thread_url(&self.base_url, group, id)).await
    }
}

fn check_group(group: &str) -> Result<(), FetchError> {
    if is_valid_group(group) {
        Ok(())
    } else {
        Err(FetchError::Other(format!("invalid group name '{}'", group)))
    }
}

/// Whether `name` is safe to splice into an origin URL path
#[must_use]
pub fn is_valid_group(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'+'))
}

#[must_use]
pub fn listing_url(base: &str, group: &str) -> String {
    format!("{}/r/{}.json", base.trim_end_matches('/'), group)
}

#[must_use]
pub fn thread_url(base: &str, group: &str, id: &str) -> String {
    format!(
        "{}/r/{}/comments/{}.json",
        base.trim_end_matches('/'),
        group,
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            listing_url("https://www.reddit.com", "rust"),
            "https://www.reddit.com/r/rust.json"
        );
        assert_eq!(
            listing_url("http://127.0.0.1:9000/", "rust"),
            "http://127.0.0.1:9000/r/rust.json"
        );
        assert_eq!(
            thread_url("https://www.reddit.com", "rust", "abc12"),
            "https://www.reddit.com/r/rust/comments/abc12.json"
        );
    }

    #[test]
    fn test_group_name_validation() {
        assert!(is_valid_group("rust"));
        assert!(is_valid_group("Ask_Science"));
        assert!(is_valid_group("rust+golang"));
        assert!(!is_valid_group(""));
        assert!(!is_valid_group("../etc"));
        assert!(!is_valid_group("a/b"));
        assert!(!is_valid_group("a b"));
        assert!(!is_valid_group("a?x=1"));
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(RedditSource::new(&SourceConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_group_rejected_before_request() {
        let source = RedditSource::new(&SourceConfig::default()).unwrap();
        let err = source.fetch_listing("a/b").await.unwrap_err();
        assert!(matches!(err, FetchError::Other(_)));
    }
}
