//! Error types for the content indices, origin retrieval and rendering
//!
//! Protocol and not-found conditions are never errors here; they become
//! reply codes in the session layer.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the content and group indices
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object has no usable `data.name`
    #[error("content object has no id")]
    MissingId,

    /// Only posts and comments are ever numbered
    #[error("refusing to store {kind} object {id}")]
    UnsupportedKind { kind: String, id: String },

    /// Value is not shaped like `{"kind": ..., "data": {...}}`
    #[error("malformed content object: {0}")]
    Malformed(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the origin service
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response shape from {url}: {reason}")]
    Shape { url: String, reason: String },

    /// Used by non-HTTP sources
    #[error("{0}")]
    Other(String),
}

/// A content object lacks something a renderable article needs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("object {id} has no {field}")]
    MissingField { id: String, field: &'static str },

    #[error("object {id} of kind {kind} is not an article")]
    NotAnArticle { id: String, kind: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::UnsupportedKind {
            kind: "t5".to_string(),
            id: "t5_abc".to_string(),
        };
        assert_eq!(err.to_string(), "refusing to store t5 object t5_abc");
        assert_eq!(StoreError::MissingId.to_string(), "content object has no id");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://example.com/r/news.json".to_string(),
            status: 429,
        };
        assert_eq!(
            err.to_string(),
            "https://example.com/r/news.json answered HTTP 429"
        );
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::MissingField {
            id: "t1_x".to_string(),
            field: "author",
        };
        assert_eq!(err.to_string(), "object t1_x has no author");
    }
}
