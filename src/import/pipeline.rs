//! Per-document conversion.
//!
//! Every document goes through the same phases:
//!
//! 1. **Fetching** - download the article (drafts arrive as HTML already)
//! 2. **Rendering** - pull metadata, strip chrome, render the content
//!    container to Markdown with embed placeholders and local asset paths
//! 3. **AwaitingDeferred** - wait for the embeds and assets it touched
//! 4. **Substituting** - swap placeholders for `<Embed />` markup
//! 5. **Persisting** - write `<content_dir>/<slug>/index.md`
//!
//! Remote articles that turn out to be responses stop after fetching.
//!
//! Parsing and rendering happen in synchronous helpers: the parse tree is not
//! `Send` and must be gone before the first await that follows it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use chrono::{SecondsFormat, Utc};
use scraper::{Html, Selector};

use super::assets::{AssetCollector, AssetOutcome};
use super::document::{FrontMatter, assemble};
use super::dom::{self, remove_first, select_attr, select_text, text_content};
use super::embed::EmbedResolver;
use super::error::PipelineError;
use super::fetch::{Fetcher, fetch_text};
use super::render::{Rendered, Renderer};
use crate::config::{ConfigError, ImportConfig};
use crate::util::{last_path_segment, slugify};

// Published articles
static RESPONSE: LazyLock<Selector> = LazyLock::new(|| dom::selector(".postArticle--response"));
static ARTICLE_CONTENT: LazyLock<Selector> = LazyLock::new(|| dom::selector(".postArticle-content"));
static TAGS: LazyLock<Selector> = LazyLock::new(|| dom::selector(".js-postTags li"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| dom::selector(".graf--title"));
static SECTION_DIVIDER: LazyLock<Selector> = LazyLock::new(|| dom::selector(".section-divider"));
static META_LOCKUP: LazyLock<Selector> = LazyLock::new(|| dom::selector(".js-postMetaLockup"));
const DESCRIPTION: &str = "meta[name='description']";
const PUBLISHED_TIME: &str = "meta[property='article:published_time']";
static DESCRIPTION_META: LazyLock<Selector> = LazyLock::new(|| dom::selector(DESCRIPTION));
static PUBLISHED_TIME_META: LazyLock<Selector> = LazyLock::new(|| dom::selector(PUBLISHED_TIME));
static CANONICAL: LazyLock<Selector> = LazyLock::new(|| dom::selector("link[rel='canonical']"));

// Exported drafts
const DRAFT_CONTENT: &str = ".e-content";
static DRAFT_NAME: LazyLock<Selector> = LazyLock::new(|| dom::selector(".p-name"));
static DRAFT_SUBTITLE: LazyLock<Selector> = LazyLock::new(|| dom::selector(".graf--subtitle"));
static DRAFT_SUMMARY: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(r#".p-summary[data-field="subtitle"]"#));
static DRAFT_BODY: LazyLock<Selector> = LazyLock::new(|| dom::selector(DRAFT_CONTENT));

/// Result of importing one document.
#[derive(Debug)]
pub enum ImportOutcome {
    Imported(ImportedDocument),
    /// The article is a response to another article; nothing was written.
    Skipped,
}

#[derive(Debug)]
pub struct ImportedDocument {
    pub slug: String,
    /// Path of the written `index.md`
    pub path: PathBuf,
    pub assets: Vec<AssetOutcome>,
}

/// A document that has been rendered but not yet written.
struct Prepared {
    slug: String,
    front_matter: FrontMatter,
    rendered: Rendered,
}

/// Long-lived import service.
///
/// Holds everything that must survive across documents: the embed cache and
/// the counter behind `Untitled Draft N`. Create one per process and share it.
pub struct Importer {
    content_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    resolver: EmbedResolver,
    untitled_drafts: AtomicUsize,
}

impl Importer {
    pub fn new(config: &ImportConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, ConfigError> {
        let embed_base = config.embed_base_url()?;
        Ok(Self {
            content_dir: config.content_dir.clone(),
            resolver: EmbedResolver::new(Arc::clone(&fetcher), embed_base),
            fetcher,
            untitled_drafts: AtomicUsize::new(0),
        })
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Fetch a published article and write it to `<content_dir>/<slug>/`.
    pub async fn import_remote(&self, url: &str) -> Result<ImportOutcome, PipelineError> {
        tracing::debug!(url, phase = "fetching");
        let html = fetch_text(self.fetcher.as_ref(), url).await?;

        let mut assets = AssetCollector::new(Arc::clone(&self.fetcher));
        let Some(prepared) = self.prepare_remote(&html, url, &mut assets)? else {
            tracing::info!(url, "skipping response article");
            return Ok(ImportOutcome::Skipped);
        };

        self.persist(prepared, assets).await.map(ImportOutcome::Imported)
    }

    /// Convert an exported draft and write it to `<content_dir>/<slug>/`.
    pub async fn import_draft(&self, html: &str) -> Result<ImportOutcome, PipelineError> {
        let mut assets = AssetCollector::new(Arc::clone(&self.fetcher));
        let prepared = self.prepare_draft(html, &mut assets)?;

        self.persist(prepared, assets).await.map(ImportOutcome::Imported)
    }

    fn prepare_remote(
        &self,
        html: &str,
        url: &str,
        assets: &mut AssetCollector,
    ) -> Result<Option<Prepared>, PipelineError> {
        let mut doc = Html::parse_document(html);

        if doc.select(&RESPONSE).next().is_some() || doc.select(&ARTICLE_CONTENT).next().is_none() {
            return Ok(None);
        }

        let categories: Vec<String> = doc
            .select(&TAGS)
            .map(|tag| text_content(*tag).trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        let title = select_text(&doc, &TITLE).unwrap_or_default();
        let redirect = last_path_segment(url);
        let description = select_attr(&doc, &DESCRIPTION_META, "content")
            .ok_or(PipelineError::MissingRequiredMetadata(DESCRIPTION))?;
        let date = select_attr(&doc, &PUBLISHED_TIME_META, "content")
            .ok_or(PipelineError::MissingRequiredMetadata(PUBLISHED_TIME))?;
        let canonical_link =
            select_attr(&doc, &CANONICAL, "href").unwrap_or_else(|| url.to_string());

        let slug = document_slug(&title, &redirect, url)?;

        remove_first(&mut doc, &TITLE);
        remove_first(&mut doc, &SECTION_DIVIDER);
        remove_first(&mut doc, &META_LOCKUP);

        tracing::debug!(url, slug = %slug, phase = "rendering");
        let Some(content) = doc.select(&ARTICLE_CONTENT).next() else {
            return Ok(None);
        };
        let rendered = Renderer::new(&self.resolver, assets).render(content);

        let redirect_from = if redirect.is_empty() {
            Vec::new()
        } else {
            vec![format!("/{redirect}")]
        };

        Ok(Some(Prepared {
            slug,
            front_matter: FrontMatter {
                title,
                description,
                date,
                categories,
                published: true,
                canonical_link: Some(canonical_link),
                redirect_from,
            },
            rendered,
        }))
    }

    fn prepare_draft(&self, html: &str, assets: &mut AssetCollector) -> Result<Prepared, PipelineError> {
        let mut doc = Html::parse_document(html);

        let title = match select_text(&doc, &DRAFT_NAME).filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => {
                let n = self.untitled_drafts.fetch_add(1, Ordering::Relaxed) + 1;
                format!("Untitled Draft {n}")
            }
        };
        let description = select_text(&doc, &DRAFT_SUMMARY).unwrap_or_default();
        let slug = document_slug(&title, "", &title)?;

        remove_first(&mut doc, &DRAFT_NAME);
        remove_first(&mut doc, &TITLE);
        remove_first(&mut doc, &DRAFT_SUBTITLE);
        remove_first(&mut doc, &SECTION_DIVIDER);

        tracing::debug!(slug = %slug, phase = "rendering");
        let content = doc
            .select(&DRAFT_BODY)
            .next()
            .ok_or(PipelineError::MissingContent(DRAFT_CONTENT))?;
        let rendered = Renderer::new(&self.resolver, assets).render(content);

        Ok(Prepared {
            slug,
            front_matter: FrontMatter {
                title,
                description,
                date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                categories: Vec::new(),
                published: false,
                canonical_link: None,
                redirect_from: Vec::new(),
            },
            rendered,
        })
    }

    async fn persist(
        &self,
        prepared: Prepared,
        assets: AssetCollector,
    ) -> Result<ImportedDocument, PipelineError> {
        let Prepared {
            slug,
            front_matter,
            rendered,
        } = prepared;

        let dir = self.content_dir.join(&slug);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::io(&dir, e))?;

        tracing::debug!(
            slug = %slug,
            embeds = rendered.embeds.len(),
            assets = assets.len(),
            cached_embeds = self.resolver.len(),
            phase = "awaiting-deferred"
        );
        let ((), assets) = tokio::join!(
            self.resolver.await_all(&rendered.embeds),
            assets.flush(&dir)
        );
        let assets = assets?;

        tracing::debug!(slug = %slug, phase = "substituting");
        let body = self.resolver.substitute(&rendered.markdown, &rendered.embeds);

        tracing::debug!(slug = %slug, phase = "persisting");
        let path = dir.join("index.md");
        let document = assemble(&front_matter, body.trim())?;
        tokio::fs::write(&path, document)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        tracing::info!(slug = %slug, path = %path.display(), "imported");
        Ok(ImportedDocument { slug, path, assets })
    }
}

/// Directory name for a document: the slugified title, else the slugified
/// fallback (the URL's last path segment for articles).
fn document_slug(title: &str, fallback: &str, input: &str) -> Result<String, PipelineError> {
    [title, fallback]
        .into_iter()
        .map(slugify)
        .find(|slug| !slug.is_empty())
        .ok_or_else(|| PipelineError::EmptySlug(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::fetch::testing::StaticFetcher;

    const ARTICLE_URL: &str = "https://medium.com/@me/hello-world-123";
    const IMAGE_URL: &str = "https://cdn-images-1.medium.com/max/800/x.png";
    const FRAME_URL: &str = "https://medium.com/media/abc";
    const YOUTUBE_FRAME: &str = r#"<html><body><iframe src="https://cdn.embedly.com/widgets/media.html?src=https%3A%2F%2Fwww.youtube.com%2Fembed%2Fxyz&url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dxyz"></iframe></body></html>"#;

    fn article(title: &str, head: &str, body: &str) -> String {
        format!(
            r#"<html><head>{head}</head><body>
<article class="postArticle"><div class="postArticle-content">
<section class="section"><div class="section-divider"><hr class="section-divider"></div>
<div class="section-content"><div class="section-inner">
<h3 class="graf graf--h3 graf--title">{title}</h3>
{body}
</div></div></section></div></article>
<ul class="tags js-postTags"><li><a href="/tag/rust">Rust</a></li><li><a href="/tag/testing">Testing</a></li></ul>
</body></html>"#
        )
    }

    fn full_head() -> &'static str {
        r#"<meta name="description" content="A short description">
<meta property="article:published_time" content="2019-01-02T03:04:05.000Z">
<link rel="canonical" href="https://medium.com/@me/hello-world-123">"#
    }

    fn embed_figure(caption: &str) -> String {
        format!(
            r#"<figure class="graf graf--iframe"><div class="aspectRatioPlaceholder is-locked"><div class="aspectRatioPlaceholder-fill" style="padding-bottom: 56.25%;"></div><div class="iframeContainer"><iframe src="/media/abc" frameborder="0"></iframe></div></div><figcaption class="imageCaption">{caption}</figcaption></figure>"#
        )
    }

    fn importer(fetcher: Arc<StaticFetcher>, dir: &Path) -> Importer {
        let config = ImportConfig {
            content_dir: dir.to_path_buf(),
            ..ImportConfig::default()
        };
        Importer::new(&config, fetcher).unwrap()
    }

    fn imported(outcome: ImportOutcome) -> ImportedDocument {
        match outcome {
            ImportOutcome::Imported(doc) => doc,
            ImportOutcome::Skipped => panic!("expected the document to be imported"),
        }
    }

    /// Split a written document into its parsed front matter and body.
    fn read_document(path: &Path) -> (serde_yaml::Value, String) {
        let text = std::fs::read_to_string(path).unwrap();
        let rest = text.strip_prefix("---\n").unwrap();
        let (yaml, body) = rest.split_once("---\n\n").unwrap();
        (serde_yaml::from_str(yaml).unwrap(), body.to_string())
    }

    #[tokio::test]
    async fn test_remote_article_round_trip() {
        let html = article(
            "Hello World",
            full_head(),
            &format!(
                r#"<p class="graf graf--p">First paragraph.</p>
<figure class="graf graf--figure"><div class="aspectRatioPlaceholder is-locked"><div class="aspectRatioPlaceholder-fill" style="padding-bottom: 50%;"></div><img class="graf-image" src="{IMAGE_URL}"></div></figure>"#
            ),
        );
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with(ARTICLE_URL, html)
                .with(IMAGE_URL, b"PNG".to_vec()),
        );
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let doc = imported(importer.import_remote(ARTICLE_URL).await.unwrap());

        assert_eq!(doc.slug, "hello-world");
        assert_eq!(doc.path, dir.path().join("hello-world/index.md"));
        assert_eq!(doc.assets.len(), 1);
        assert_eq!(doc.assets[0].filename, "asset-1.png");
        assert!(doc.assets[0].written);
        assert_eq!(
            std::fs::read(dir.path().join("hello-world/asset-1.png")).unwrap(),
            b"PNG"
        );

        let (front, body) = read_document(&doc.path);
        assert_eq!(front["title"].as_str(), Some("Hello World"));
        assert_eq!(front["description"].as_str(), Some("A short description"));
        assert_eq!(front["date"].as_str(), Some("2019-01-02T03:04:05.000Z"));
        assert_eq!(front["categories"][0].as_str(), Some("Rust"));
        assert_eq!(front["categories"][1].as_str(), Some("Testing"));
        assert_eq!(front["published"].as_bool(), Some(true));
        assert_eq!(front["canonical_link"].as_str(), Some(ARTICLE_URL));
        assert_eq!(front["redirect_from"][0].as_str(), Some("/hello-world-123"));
        assert_eq!(body, "First paragraph.\n\n![](./asset-1.png)\n");
    }

    #[tokio::test]
    async fn test_untitled_article_uses_url_segment() {
        let head = r#"<meta name="description" content="d"><meta property="article:published_time" content="2020-01-01T00:00:00.000Z">"#;
        let html = article("", head, "<p>Text</p>");
        let fetcher = Arc::new(StaticFetcher::new().with(ARTICLE_URL, html));
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let doc = imported(importer.import_remote(ARTICLE_URL).await.unwrap());
        assert_eq!(doc.slug, "hello-world-123");

        let (front, body) = read_document(&doc.path);
        assert_eq!(front["canonical_link"].as_str(), Some(ARTICLE_URL));
        assert_eq!(body, "Text\n");
    }

    #[tokio::test]
    async fn test_response_article_is_skipped() {
        let html = article("Reply", full_head(), "<p>Agreed.</p>").replace(
            r#"class="postArticle""#,
            r#"class="postArticle postArticle--response""#,
        );
        let fetcher = Arc::new(StaticFetcher::new().with(ARTICLE_URL, html));
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let outcome = importer.import_remote(ARTICLE_URL).await.unwrap();
        assert!(matches!(outcome, ImportOutcome::Skipped));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_page_without_article_content_is_skipped() {
        let fetcher = Arc::new(
            StaticFetcher::new().with(ARTICLE_URL, "<html><body><p>Sign in</p></body></html>"),
        );
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let outcome = importer.import_remote(ARTICLE_URL).await.unwrap();
        assert!(matches!(outcome, ImportOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_missing_description_aborts_before_rendering() {
        let head = r#"<meta property="article:published_time" content="2020-01-01T00:00:00.000Z">"#;
        let html = article("Hello", head, &embed_figure("clip"));
        let fetcher = Arc::new(StaticFetcher::new().with(ARTICLE_URL, html));
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher.clone(), dir.path());

        let err = importer.import_remote(ARTICLE_URL).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingRequiredMetadata("meta[name='description']")
        ));
        assert_eq!(importer.resolver.len(), 0);
        assert_eq!(fetcher.calls_for(FRAME_URL), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_date_is_reported() {
        let head = r#"<meta name="description" content="d">"#;
        let fetcher = Arc::new(StaticFetcher::new().with(ARTICLE_URL, article("Hello", head, "<p>x</p>")));
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let err = importer.import_remote(ARTICLE_URL).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingRequiredMetadata("meta[property='article:published_time']")
        ));
    }

    #[tokio::test]
    async fn test_failed_article_fetch_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(Arc::new(StaticFetcher::new()), dir.path());

        let err = importer.import_remote(ARTICLE_URL).await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_shared_embed_is_fetched_once_across_documents() {
        let second_url = "https://medium.com/@me/second-post-456";
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with(ARTICLE_URL, article("First", full_head(), &embed_figure("Watch this")))
                .with(second_url, article("Second", full_head(), &embed_figure("")))
                .with(FRAME_URL, YOUTUBE_FRAME),
        );
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher.clone(), dir.path());

        let (first, second) = tokio::join!(
            importer.import_remote(ARTICLE_URL),
            importer.import_remote(second_url)
        );
        let first = imported(first.unwrap());
        let second = imported(second.unwrap());

        assert_eq!(fetcher.calls_for(FRAME_URL), 1);
        assert_eq!(importer.resolver.len(), 1);

        let expected = r#"<Embed src="https://www.youtube.com/embed/xyz" aspectRatio={0.5625} caption="Watch this" />"#;
        let (_, first_body) = read_document(&first.path);
        let (_, second_body) = read_document(&second.path);
        assert_eq!(first_body, format!("{expected}\n"));
        assert_eq!(second_body, format!("{expected}\n"));
    }

    #[tokio::test]
    async fn test_unresolvable_embed_leaves_no_placeholder() {
        let html = article(
            "Broken",
            full_head(),
            &format!("<p>Before</p>{}<p>After</p>", embed_figure("")),
        );
        let fetcher = Arc::new(StaticFetcher::new().with(ARTICLE_URL, html));
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let doc = imported(importer.import_remote(ARTICLE_URL).await.unwrap());
        let (_, body) = read_document(&doc.path);
        assert!(!body.contains("embed-placeholder"));
        assert_eq!(body, "Before\n\nAfter\n");
    }

    #[tokio::test]
    async fn test_failed_asset_keeps_local_reference() {
        let html = article(
            "Images",
            full_head(),
            &format!(r#"<p><img src="{IMAGE_URL}" alt="gone"></p>"#),
        );
        let fetcher = Arc::new(StaticFetcher::new().with(ARTICLE_URL, html));
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(fetcher, dir.path());

        let doc = imported(importer.import_remote(ARTICLE_URL).await.unwrap());
        assert!(!doc.assets[0].written);
        assert!(!dir.path().join("images/asset-1.png").exists());

        let (_, body) = read_document(&doc.path);
        assert_eq!(body, "![gone](./asset-1.png)\n");
    }

    #[tokio::test]
    async fn test_untitled_drafts_are_numbered() {
        let draft = r#"<html><body><section class="e-content"><p>Draft body</p></section></body></html>"#;
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(Arc::new(StaticFetcher::new()), dir.path());

        let first = imported(importer.import_draft(draft).await.unwrap());
        let second = imported(importer.import_draft(draft).await.unwrap());
        assert_eq!(first.slug, "untitled-draft-1");
        assert_eq!(second.slug, "untitled-draft-2");

        let (front, body) = read_document(&second.path);
        assert_eq!(front["title"].as_str(), Some("Untitled Draft 2"));
        assert_eq!(front["published"].as_bool(), Some(false));
        assert_eq!(front["description"].as_str(), Some(""));
        assert!(front.get("canonical_link").is_none());
        assert!(front.get("redirect_from").is_none());
        assert_eq!(body, "Draft body\n");
    }

    #[tokio::test]
    async fn test_titled_draft() {
        let draft = r#"<html><body><article>
<header><h1 class="p-name">My Draft</h1></header>
<section data-field="subtitle" class="p-summary">A subtitle</section>
<section data-field="body" class="e-content"><section class="section"><div class="section-divider"><hr class="section-divider"></div>
<h3 class="graf graf--h3 graf--title">My Draft</h3><h4 class="graf graf--h4 graf--subtitle">A subtitle</h4>
<p class="graf graf--p">Some <code>code</code> here.</p></section></section>
</article></body></html>"#;
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(Arc::new(StaticFetcher::new()), dir.path());

        let doc = imported(importer.import_draft(draft).await.unwrap());
        assert_eq!(doc.slug, "my-draft");

        let (front, body) = read_document(&doc.path);
        assert_eq!(front["title"].as_str(), Some("My Draft"));
        assert_eq!(front["description"].as_str(), Some("A subtitle"));
        let date = front["date"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
        assert!(date.ends_with('Z'));
        assert_eq!(date.len(), "2024-01-01T00:00:00.000Z".len());
        assert_eq!(body, "Some `code` here.\n");

        // A titled draft does not consume an untitled number.
        let untitled = r#"<html><body><div class="e-content"><p>x</p></div></body></html>"#;
        let next = imported(importer.import_draft(untitled).await.unwrap());
        assert_eq!(next.slug, "untitled-draft-1");
    }

    #[tokio::test]
    async fn test_code_blank_lines_survive_embed_removal() {
        let draft = r#"<html><body><div class="e-content"><pre class="graf graf--pre">fn a() {}<br><br><br>fn b() {}</pre><iframe src="/media/missing"></iframe></div></body></html>"#;
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(Arc::new(StaticFetcher::new()), dir.path());

        let doc = imported(importer.import_draft(draft).await.unwrap());
        let (_, body) = read_document(&doc.path);
        assert_eq!(body, "```\nfn a() {}\n\n\nfn b() {}\n```\n");
    }

    #[tokio::test]
    async fn test_draft_without_content_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let importer = importer(Arc::new(StaticFetcher::new()), dir.path());

        let err = importer
            .import_draft("<html><body><h1 class=\"p-name\">T</h1></body></html>")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingContent(".e-content")));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_document_slug_fallbacks() {
        assert_eq!(document_slug("Hello World", "x", "u").unwrap(), "hello-world");
        assert_eq!(document_slug("", "post-123", "u").unwrap(), "post-123");
        assert_eq!(document_slug("", "../..", "u").ok(), None);
    }
}
