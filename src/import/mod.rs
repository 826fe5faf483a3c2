//! Medium article and draft import.
//!
//! - `fetch` - the [`Fetcher`] seam and its `reqwest` implementation
//! - `render`, `rules`, `commonmark` - HTML → Markdown
//! - `embed` - deferred iframe resolution shared across documents
//! - `assets` - per-document image downloads
//! - `pipeline` - the [`Importer`] that ties a document's phases together

mod assets;
mod commonmark;
mod document;
mod dom;
mod embed;
mod error;
mod fetch;
mod pipeline;
mod render;
mod rules;

pub use assets::AssetOutcome;
pub use error::PipelineError;
pub use fetch::{Fetcher, HttpFetcher};
pub use pipeline::{ImportOutcome, ImportedDocument, Importer};
