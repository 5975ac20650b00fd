//! Error types for remote fetches and config loading.

use std::path::PathBuf;

/// Why a single collection request produced no items.
///
/// Absorbed by [`crate::widget::SearchWidget::fetch_collection`]; callers of the
/// widget never see it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not a list of content items: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for '{key}': expected {expected}")]
    InvalidValue { key: &'static str, expected: &'static str },
}
