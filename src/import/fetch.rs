//! Fetching remote resources.
//!
//! The pipeline only ever sees the [`Fetcher`] trait, so tests can swap the
//! HTTP client for an in-memory table of responses.

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::error::FetchError;
use crate::config::HttpConfig;

/// Something that can turn a URL into bytes.
///
/// Implementations must not retry: a single failure is final for the job
/// that asked.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;
}

/// Fetch a URL and decode the body as (lossy) UTF-8.
pub async fn fetch_text(fetcher: &dyn Fetcher, url: &str) -> Result<String, FetchError> {
    let bytes = fetcher.fetch(url).await?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        let url = url.to_string();
        async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::from_reqwest(&url, e))?;
            tracing::debug!(url = %url, bytes = body.len(), "fetched");

            Ok(body.to_vec())
        }
        .boxed()
    }
}
