//! Error types for the import pipeline.

use std::path::PathBuf;

/// Failure to fetch a remote resource (article, embed frame or asset).
///
/// Errors are stored inside cached embed entries and shared between
/// documents, so they carry rendered messages instead of the client error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }
        Self::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Why an embed could not be resolved. The placeholder is removed from the
/// body when this happens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed embed redirector '{0}'")]
    Parse(String),

    #[error("no embed target found in frame {0}")]
    NoEmbedTarget(String),

    #[error("embed job for {0} stopped before completing")]
    Aborted(String),
}

/// Errors that abort the conversion of a single document.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("failed to fetch article: {0}")]
    Fetch(#[from] FetchError),

    #[error("article is missing required metadata '{0}'")]
    MissingRequiredMetadata(&'static str),

    #[error("document has no content container '{0}'")]
    MissingContent(&'static str),

    #[error("cannot derive a directory name for '{0}'")]
    EmptySlug(String),

    #[error("failed to serialize front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_error_wraps_fetch_message() {
        let err = EmbedError::from(FetchError::Status {
            url: "https://medium.com/media/abc".to_string(),
            status: 404,
        });
        assert_eq!(
            err.to_string(),
            "request to https://medium.com/media/abc returned HTTP 404"
        );
    }

    #[test]
    fn test_missing_metadata_names_the_tag() {
        let err = PipelineError::MissingRequiredMetadata("meta[name='description']");
        assert!(err.to_string().contains("meta[name='description']"));
    }
}
