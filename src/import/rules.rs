//! Medium-specific rendering rules.
//!
//! These sit in front of the commonmark rules and handle the parts of a
//! Medium article that need more than a tag-for-tag translation: split code
//! blocks, figures with captions, CDN images and embedded iframes.

use std::sync::LazyLock;

use scraper::{ElementRef, Node, Selector};

use super::dom::{self, collapse_whitespace, has_class, is_named, next_element_sibling, text_content};
use super::render::{Renderer, is_block};

static IFRAME: LazyLock<Selector> = LazyLock::new(|| dom::selector("iframe"));
static FIGCAPTION: LazyLock<Selector> = LazyLock::new(|| dom::selector("figcaption"));
static ASPECT_RATIO_FILL: LazyLock<Selector> =
    LazyLock::new(|| dom::selector(".aspectRatioPlaceholder-fill"));

/// Prefix shared by every Medium CDN host (`cdn-images-1.medium.com`, ...).
const CDN_PREFIX: &str = "https://cdn-images";
const CDN_DOMAIN: &str = ".medium.com";

/// A node → text rule.
///
/// `replacement` receives the element and its already-rendered children.
pub(super) struct Rule {
    pub name: &'static str,
    pub filter: fn(ElementRef<'_>) -> bool,
    pub replacement: fn(&mut Renderer<'_>, ElementRef<'_>, &str) -> String,
}

pub(super) static MEDIUM: [Rule; 5] = [
    Rule {
        name: "code-block",
        filter: |el| el.value().name() == "pre",
        replacement: code_block,
    },
    Rule {
        name: "inline-code",
        filter: |el| el.value().name() == "code" && !el.parent().is_some_and(|p| is_named(p, "pre")),
        replacement: |_, _, content| inline_code(content),
    },
    Rule {
        name: "figure",
        filter: |el| el.value().name() == "figure",
        replacement: figure,
    },
    Rule {
        name: "image",
        filter: |el| el.value().name() == "img",
        replacement: image,
    },
    Rule {
        name: "iframe",
        filter: |el| el.value().name() == "iframe",
        replacement: |renderer, el, _| renderer.register_embed(el, None),
    },
];

/// Output for an element with nothing in it.
///
/// Embeds carry no text of their own but must still produce something.
pub(super) fn blank_replacement(renderer: &mut Renderer<'_>, el: ElementRef<'_>) -> String {
    match el.value().name() {
        "figure" => {
            if let Some(iframe) = el.select(&IFRAME).next() {
                return renderer.register_embed(iframe, None);
            }
        }
        "iframe" => return renderer.register_embed(el, None),
        _ => {}
    }

    if is_block(*el) {
        "\n\n".to_string()
    } else {
        String::new()
    }
}

/// Fenced code block. Medium splits long snippets into consecutive `pre`
/// elements; follow-up blocks (`graf-after--pre`) continue the open fence and
/// the fence is only closed after the last one.
fn code_block(_: &mut Renderer<'_>, el: ElementRef<'_>, _: &str) -> String {
    let mut out = if has_class(el, "graf-after--pre") {
        "\n\n".to_string()
    } else {
        "\n\n```\n".to_string()
    };

    out.push_str(&preformatted_text(el));
    out.push('\n');

    let continues = next_element_sibling(el).is_some_and(|next| next.value().name() == "pre");
    if !continues {
        out.push_str("```\n\n");
    }
    out
}

/// Text content with `<br>` turned into newlines.
fn preformatted_text(el: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

fn inline_code(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let longest_run = content
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let delimiter = "`".repeat(longest_run + 1);
    let leading = if content.starts_with('`') { " " } else { "" };
    let trailing = if content.ends_with('`') { " " } else { "" };

    format!("{delimiter}{leading}{content}{trailing}{delimiter}")
}

fn figure(renderer: &mut Renderer<'_>, el: ElementRef<'_>, content: &str) -> String {
    let caption = figure_caption(el);

    if let Some(iframe) = el.select(&IFRAME).next() {
        return renderer.register_embed(iframe, caption.as_deref());
    }

    let Some(line) = content.lines().find(|line| line.contains("![")) else {
        return format!("\n\n{}\n\n", content.trim());
    };

    let mut image = line.trim().to_string();
    if let Some(caption) = caption
        && let Some(alt) = image.find("![")
    {
        image.insert_str(alt + 2, &escape_alt(&caption));
    }
    format!("\n\n{image}\n\n")
}

fn figure_caption(el: ElementRef<'_>) -> Option<String> {
    el.select(&FIGCAPTION)
        .next()
        .map(|caption| collapse_whitespace(&text_content(*caption)).trim().to_string())
        .filter(|caption| !caption.is_empty())
}

fn escape_alt(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Image markup. CDN images are rewritten to `./asset-<n><ext>` and queued for
/// download; the path is final whether or not the download succeeds.
fn image(renderer: &mut Renderer<'_>, el: ElementRef<'_>, _: &str) -> String {
    let alt = collapse_whitespace(el.value().attr("alt").unwrap_or_default());
    let mut src = el.value().attr("src").unwrap_or_default().to_string();

    if is_cdn_image(&src) {
        let filename = renderer.enqueue_asset(&src);
        src = format!("./{filename}");
    }

    if src.is_empty() {
        return String::new();
    }

    let title = el
        .value()
        .attr("title")
        .filter(|t| !t.is_empty())
        .map(|t| format!(" \"{t}\""))
        .unwrap_or_default();
    format!("![{alt}]({src}{title})")
}

fn is_cdn_image(src: &str) -> bool {
    src.strip_prefix(CDN_PREFIX)
        .is_some_and(|rest| rest.contains(CDN_DOMAIN))
}

/// Height/width ratio of the responsive container around an iframe, read from
/// the `padding-bottom` of its `aspectRatioPlaceholder-fill`. Defaults to 1.
pub(super) fn aspect_ratio(iframe: ElementRef<'_>) -> f64 {
    std::iter::once(iframe)
        .chain(iframe.ancestors().filter_map(ElementRef::wrap))
        .find(|el| has_class(*el, "aspectRatioPlaceholder"))
        .and_then(|container| container.select(&ASPECT_RATIO_FILL).next())
        .and_then(|fill| fill.value().attr("style"))
        .and_then(padding_bottom_percent)
        .map(|percent| percent / 100.0)
        .unwrap_or(1.0)
}

fn padding_bottom_percent(style: &str) -> Option<f64> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        if !property.trim().eq_ignore_ascii_case("padding-bottom") {
            return None;
        }
        leading_number(value.trim())
    })
}

/// Parse the numeric prefix of a CSS length such as `56.25%`.
fn leading_number(value: &str) -> Option<f64> {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse().ok()
}
