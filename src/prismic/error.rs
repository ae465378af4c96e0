use std::error::Error as _;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Query predicate rejected by the Content API (`"type": "parsing-error"`).
    #[error("ParsingError: {message}")]
    Parsing { message: String },
    #[error("Prismic API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("request to Prismic failed")]
    Http(#[from] reqwest::Error),
    #[error("unexpected Prismic response: {0}")]
    Response(String),
    #[error("could not fetch asset source {url} (HTTP {status})")]
    AssetFetch { url: String, status: u16 },
}

impl StoreError {
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Parsing { .. } => Some(400),
            StoreError::Api { status, .. } => Some(*status),
            StoreError::Http(e) => e.status().map(|s| s.as_u16()),
            StoreError::Response(_) | StoreError::AssetFetch { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            StoreError::Api { body, .. } => Some(body),
            StoreError::Parsing { message } => Some(message),
            _ => None,
        }
    }

    /// Source chain rendered as `a: b: c`, empty when there is none.
    pub fn cause(&self) -> String {
        let mut parts = Vec::new();
        let mut source = self.source();
        while let Some(err) = source {
            parts.push(err.to_string());
            source = err.source();
        }
        parts.join(": ")
    }

    /// Write token missing, expired or lacking permission.
    pub fn is_forbidden(&self) -> bool {
        match self {
            StoreError::AssetFetch { .. } => false,
            _ => {
                self.status() == Some(403)
                    || self.to_string().contains("403")
                    || self.cause().contains("403")
            }
        }
    }
}
