//! Deferred resolution of embedded iframes.
//!
//! Medium wraps every embed (videos, tweets, gists...) in an iframe pointing at
//! a `/media/<id>` frame on medium.com. What the embed really points at is only
//! known after fetching that frame, which cannot happen while the renderer is
//! walking the tree. So the renderer gets a placeholder token back, the fetch
//! runs in the background, and once the whole document is rendered the
//! placeholders are swapped for `<Embed />` tags.
//!
//! The cache lives as long as the [`EmbedResolver`] does. A frame seen by an
//! earlier document is never fetched again: later documents reuse its
//! placeholder, caption and outcome, and if the first fetch is still in flight
//! every document awaits that same job.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, OnceLock, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use scraper::{Html, Selector};
use url::Url;

use super::dom;
use super::error::EmbedError;
use super::fetch::{Fetcher, fetch_text};

static IFRAME: LazyLock<Selector> = LazyLock::new(|| dom::selector("iframe"));
static GIST_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#"script[src^="https://gist.github.com"]"#));

/// Where an embed actually points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedTarget {
    /// Playable/renderable target (an `embed` URL, or a gist script).
    pub src: String,
    /// Human-facing link to the embedded thing, when the redirector had one.
    pub link: Option<String>,
}

/// Resolution state of a cached embed.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedState {
    Pending,
    Resolved(EmbedTarget),
    Errored(EmbedError),
}

type Outcome = Result<EmbedTarget, EmbedError>;

struct EmbedEntry {
    key: String,
    placeholder: String,
    aspect_ratio: f64,
    caption: Mutex<Option<String>>,
    /// Written exactly once, by the job.
    outcome: Arc<OnceLock<Outcome>>,
    /// `<Embed />` markup, built on first use after resolution. The caption
    /// is frozen from then on.
    markup: OnceLock<String>,
    job: Shared<BoxFuture<'static, ()>>,
}

impl EmbedEntry {
    fn caption(&self) -> Option<String> {
        self.caption
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn backfill_caption(&self, caption: Option<&str>) {
        let Some(caption) = caption else {
            return;
        };
        let mut current = self.caption.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_none() && self.markup.get().is_none() {
            *current = Some(caption.to_string());
        }
    }
}

/// Handle on a cache entry touched while rendering a document.
///
/// The renderer collects these so the pipeline knows exactly which jobs to
/// await and which placeholders to substitute.
#[derive(Clone)]
pub struct EmbedTicket(Arc<EmbedEntry>);

impl EmbedTicket {
    pub fn key(&self) -> &str {
        &self.0.key
    }

    pub fn placeholder(&self) -> &str {
        &self.0.placeholder
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.0.aspect_ratio
    }

    pub fn caption(&self) -> Option<String> {
        self.0.caption()
    }

    pub fn state(&self) -> EmbedState {
        match self.0.outcome.get() {
            None => EmbedState::Pending,
            Some(Ok(target)) => EmbedState::Resolved(target.clone()),
            Some(Err(err)) => EmbedState::Errored(err.clone()),
        }
    }

    /// Final `<Embed />` markup, once resolved. Computed once and shared by
    /// every document that references the embed.
    pub fn markup(&self) -> Option<String> {
        let Some(Ok(target)) = self.0.outcome.get() else {
            return None;
        };

        // Held across the build so a concurrent backfill lands before or not at all.
        let caption = self.0.caption.lock().unwrap_or_else(PoisonError::into_inner);
        let markup = self.0.markup.get_or_init(|| {
            embed_markup(target, self.0.aspect_ratio, caption.as_deref().unwrap_or_default())
        });
        Some(markup.clone())
    }
}

impl std::fmt::Debug for EmbedTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedTicket")
            .field("key", &self.0.key)
            .field("placeholder", &self.0.placeholder)
            .field("aspect_ratio", &self.aspect_ratio())
            .field("state", &self.state())
            .finish()
    }
}

/// Text produced for an iframe right now, plus the entry it touched.
#[derive(Debug)]
pub struct Registration {
    pub text: String,
    pub ticket: EmbedTicket,
}

/// Process-lifetime embed cache.
pub struct EmbedResolver {
    fetcher: Arc<dyn Fetcher>,
    /// Frame keys are site-relative paths; they are resolved against this.
    base: Url,
    entries: Mutex<HashMap<String, Arc<EmbedEntry>>>,
    next_token: AtomicUsize,
}

impl EmbedResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, base: Url) -> Self {
        Self {
            fetcher,
            base,
            entries: Mutex::new(HashMap::new()),
            next_token: AtomicUsize::new(1),
        }
    }

    /// Number of distinct frames seen so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Look up `key`, registering it and starting its job on first sight.
    ///
    /// Never suspends. `aspect_ratio` is only evaluated when the entry is
    /// created. A caption only sticks if the entry has none yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn resolve_or_register(
        &self,
        key: &str,
        caption: Option<&str>,
        aspect_ratio: impl FnOnce() -> f64,
    ) -> Registration {
        let caption = caption.map(str::trim).filter(|c| !c.is_empty());
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(key) {
            let entry = Arc::clone(entry);
            drop(entries);

            entry.backfill_caption(caption);
            let ticket = EmbedTicket(entry);
            let inline = ticket
                .markup()
                .unwrap_or_else(|| ticket.placeholder().to_string());
            return Registration {
                text: format!("\n\n{inline}\n\n"),
                ticket,
            };
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let placeholder = format!("<!--embed-placeholder-{token}-->");
        let outcome = Arc::new(OnceLock::new());
        let job = self.spawn_job(key, Arc::clone(&outcome));
        let entry = Arc::new(EmbedEntry {
            key: key.to_string(),
            placeholder,
            aspect_ratio: aspect_ratio(),
            caption: Mutex::new(caption.map(str::to_string)),
            outcome,
            markup: OnceLock::new(),
            job,
        });
        entries.insert(key.to_string(), Arc::clone(&entry));
        drop(entries);

        tracing::debug!(key, aspect_ratio = entry.aspect_ratio, "registered embed");
        Registration {
            text: format!("\n\n{}\n\n", entry.placeholder),
            ticket: EmbedTicket(entry),
        }
    }

    fn spawn_job(&self, key: &str, outcome: Arc<OnceLock<Outcome>>) -> Shared<BoxFuture<'static, ()>> {
        let frame_url = match self.base.join(key) {
            Ok(url) => url.to_string(),
            Err(_) => {
                let _ = outcome.set(Err(EmbedError::Parse(key.to_string())));
                return future::ready(()).boxed().shared();
            }
        };

        let fetcher = Arc::clone(&self.fetcher);
        let handle = tokio::spawn(async move {
            let result = resolve_frame(fetcher.as_ref(), &frame_url).await;
            match &result {
                Ok(target) => {
                    tracing::debug!(frame = %frame_url, src = %target.src, link = ?target.link, "resolved embed")
                }
                Err(err) => tracing::warn!(frame = %frame_url, "dropping embed: {err}"),
            }
            let _ = outcome.set(result);
        });

        handle.map(|_| ()).boxed().shared()
    }

    /// Wait for every ticket that is still pending.
    pub async fn await_all(&self, tickets: &[EmbedTicket]) {
        let pending: Vec<_> = tickets
            .iter()
            .filter(|t| t.0.outcome.get().is_none())
            .map(|t| t.0.job.clone())
            .collect();
        future::join_all(pending).await;

        // A job that panicked never wrote its outcome.
        for ticket in tickets {
            ticket
                .0
                .outcome
                .get_or_init(|| Err(EmbedError::Aborted(ticket.key().to_string())));
        }
    }

    /// Replace each ticket's placeholder with its markup, or drop it (with
    /// the blank lines around it) if the embed could not be resolved.
    pub fn substitute(&self, markdown: &str, tickets: &[EmbedTicket]) -> String {
        let mut out = markdown.to_string();
        for ticket in tickets {
            match ticket.state() {
                EmbedState::Resolved(_) => {
                    let markup = ticket.markup().unwrap_or_default();
                    out = out.replace(ticket.placeholder(), &markup);
                }
                EmbedState::Errored(_) => out = remove_placeholder(&out, ticket.placeholder()),
                EmbedState::Pending => {
                    tracing::warn!(key = ticket.key(), "embed still pending at substitution");
                }
            }
        }
        out
    }
}

/// Remove `placeholder` so that the blocks around it end up one blank line
/// apart, leaving every other newline alone.
fn remove_placeholder(text: &str, placeholder: &str) -> String {
    text.replace(&format!("\n\n{placeholder}\n\n"), "\n\n")
        .replace(&format!("\n\n{placeholder}"), "")
        .replace(&format!("{placeholder}\n\n"), "")
        .replace(placeholder, "")
}

async fn resolve_frame(fetcher: &dyn Fetcher, frame_url: &str) -> Result<EmbedTarget, EmbedError> {
    let body = fetch_text(fetcher, frame_url).await?;
    extract_target(&body, frame_url)
}

/// Find the real target inside a fetched media frame.
fn extract_target(body: &str, frame_url: &str) -> Result<EmbedTarget, EmbedError> {
    let doc = Html::parse_document(body);

    if let Some(iframe) = doc.select(&IFRAME).next() {
        let src = iframe
            .value()
            .attr("src")
            .ok_or_else(|| EmbedError::Parse(frame_url.to_string()))?;
        return parse_redirector(src);
    }

    if let Some(src) = doc
        .select(&GIST_SCRIPT)
        .next()
        .and_then(|script| script.value().attr("src"))
    {
        return Ok(EmbedTarget {
            src: src.to_string(),
            link: None,
        });
    }

    Err(EmbedError::NoEmbedTarget(frame_url.to_string()))
}

/// Pull `src` and `url` out of a redirector such as
/// `https://cdn.embedly.com/widgets/media.html?src=...&url=...`.
fn parse_redirector(redirector: &str) -> Result<EmbedTarget, EmbedError> {
    let (_, query) = redirector
        .split_once('?')
        .ok_or_else(|| EmbedError::Parse(redirector.to_string()))?;

    let mut src = None;
    let mut link = None;
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            "src" if src.is_none() => src = Some(value.into_owned()),
            "url" if link.is_none() => link = Some(value.into_owned()),
            _ => {}
        }
    }

    let src = src
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EmbedError::Parse(redirector.to_string()))?;
    Ok(EmbedTarget {
        src,
        link: link.filter(|l| !l.is_empty()),
    })
}

fn embed_markup(target: &EmbedTarget, aspect_ratio: f64, caption: &str) -> String {
    format!(
        r#"<Embed src="{}" aspectRatio={{{}}} caption="{}" />"#,
        escape_attr(&target.src),
        aspect_ratio,
        escape_attr(caption)
    )
}

fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}
