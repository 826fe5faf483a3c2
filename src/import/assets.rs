//! Per-document image downloads.
//!
//! File names are handed out while rendering, before anything is fetched, so
//! the Markdown can point at `./asset-<n><ext>` straight away. The downloads
//! run in the background and are written next to the document afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future;
use tokio::task::JoinHandle;

use super::error::{FetchError, PipelineError};
use super::fetch::Fetcher;

struct AssetJob {
    source_url: String,
    filename: String,
    fetch: JoinHandle<Result<Vec<u8>, FetchError>>,
}

/// What happened to one queued asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub source_url: String,
    pub filename: String,
    /// False when the download failed; the Markdown still references the file.
    pub written: bool,
}

/// Ordered, append-only list of downloads for one document.
pub struct AssetCollector {
    fetcher: Arc<dyn Fetcher>,
    jobs: Vec<AssetJob>,
}

impl AssetCollector {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            jobs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Queue a download and return the file name it will be written to.
    ///
    /// The fetch starts immediately. Must be called from within a tokio
    /// runtime.
    pub fn enqueue(&mut self, url: &str) -> String {
        let filename = format!("asset-{}{}", self.jobs.len() + 1, extension_of(url));

        let fetcher = Arc::clone(&self.fetcher);
        let source = url.to_string();
        let fetch = tokio::spawn(async move { fetcher.fetch(&source).await });

        tracing::debug!(url, filename = %filename, "queued asset");
        self.jobs.push(AssetJob {
            source_url: url.to_string(),
            filename: filename.clone(),
            fetch,
        });
        filename
    }

    /// `(source url, file name)` of every queued job, in order.
    #[cfg(test)]
    pub fn jobs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.jobs
            .iter()
            .map(|job| (job.source_url.as_str(), job.filename.as_str()))
    }

    /// Wait for every download and write the successful ones into `dir`.
    ///
    /// Failed downloads are logged and reported with `written: false`; only a
    /// failure to write the file is an error.
    pub async fn flush(self, dir: &Path) -> Result<Vec<AssetOutcome>, PipelineError> {
        let (meta, handles): (Vec<_>, Vec<_>) = self
            .jobs
            .into_iter()
            .map(|job| ((job.source_url, job.filename), job.fetch))
            .unzip();

        let results = future::join_all(handles).await;

        let mut outcomes = Vec::with_capacity(meta.len());
        for ((source_url, filename), result) in meta.into_iter().zip(results) {
            let bytes = match result {
                Ok(Ok(bytes)) => Some(bytes),
                Ok(Err(err)) => {
                    tracing::warn!(url = %source_url, "dropping asset: {err}");
                    None
                }
                Err(err) => {
                    tracing::warn!(url = %source_url, "asset download task failed: {err}");
                    None
                }
            };

            let written = match bytes {
                Some(bytes) => {
                    let path: PathBuf = dir.join(&filename);
                    tokio::fs::write(&path, bytes)
                        .await
                        .map_err(|e| PipelineError::io(&path, e))?;
                    true
                }
                None => false,
            };

            outcomes.push(AssetOutcome {
                source_url,
                filename,
                written,
            });
        }

        Ok(outcomes)
    }
}

/// `.png` for `https://host/max/800/1*abc.png?q=1`; empty when the last path
/// segment has no extension.
fn extension_of(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = path
        .split_once("://")
        .map_or(path, |(_, rest)| rest.split_once('/').map_or("", |(_, p)| p));
    let segment = path.rsplit('/').next().unwrap_or_default();

    match segment.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < segment.len() => segment[dot..].to_string(),
        _ => String::new(),
    }
}
