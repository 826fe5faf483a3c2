//! HTML → Markdown rendering.
//!
//! A single synchronous depth-first walk. Every element's children are
//! rendered first, then the first matching rule (Medium rules, then the
//! commonmark rules) turns the element plus its rendered content into text.
//! Rule outputs are glued together by [`join`], which keeps at most one blank
//! line between blocks.
//!
//! Rules never wait on the network. Embeds come back as placeholders and
//! images as deterministic local paths; the embeds touched along the way are
//! returned in [`Rendered::embeds`] for the pipeline to await.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use super::assets::AssetCollector;
use super::commonmark;
use super::dom::{collapse_whitespace, text_content};
use super::embed::{EmbedResolver, EmbedTicket};
use super::rules;

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas", "center", "dd", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Elements that still mean something with no text inside.
const MEANINGFUL_WHEN_BLANK: &[&str] = &[
    "a", "table", "thead", "tbody", "tfoot", "th", "td", "iframe", "script", "audio", "video",
];

/// Markdown for one document, plus every embed it references.
#[derive(Debug)]
pub struct Rendered {
    pub markdown: String,
    pub embeds: Vec<EmbedTicket>,
}

pub struct Renderer<'a> {
    resolver: &'a EmbedResolver,
    assets: &'a mut AssetCollector,
    embeds: Vec<EmbedTicket>,
    /// Inside `code`/`pre`: text is emitted without Markdown escaping.
    code_depth: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(resolver: &'a EmbedResolver, assets: &'a mut AssetCollector) -> Self {
        Self {
            resolver,
            assets,
            embeds: Vec::new(),
            code_depth: 0,
        }
    }

    /// Render the children of `root`.
    pub fn render(mut self, root: ElementRef<'_>) -> Rendered {
        let body = self.children(*root);
        Rendered {
            markdown: tidy(&body),
            embeds: self.embeds,
        }
    }

    /// Register an iframe with the embed resolver and remember the ticket.
    ///
    /// An iframe without a `src` renders as nothing.
    pub(super) fn register_embed(&mut self, iframe: ElementRef<'_>, caption: Option<&str>) -> String {
        let Some(key) = iframe.value().attr("src") else {
            return String::new();
        };

        let registration =
            self.resolver
                .resolve_or_register(key, caption, || rules::aspect_ratio(iframe));
        if !self.embeds.iter().any(|t| t.key() == key) {
            self.embeds.push(registration.ticket);
        }
        registration.text
    }

    /// Queue an asset download, returning the local file name.
    pub(super) fn enqueue_asset(&mut self, url: &str) -> String {
        self.assets.enqueue(url)
    }

    fn children(&mut self, parent: NodeRef<'_, Node>) -> String {
        let parent_is_block = is_block(parent);
        let mut out = String::new();

        for child in parent.children() {
            let replacement = match child.value() {
                Node::Text(text) => {
                    let mut text = collapse_whitespace(text);
                    let at_line_start = out.ends_with('\n') || (out.is_empty() && parent_is_block);
                    let before_block = match child.next_sibling() {
                        Some(next) => is_block(next),
                        None => parent_is_block,
                    };
                    if at_line_start {
                        text = text.trim_start().to_string();
                    }
                    if before_block {
                        text = text.trim_end().to_string();
                    }
                    if text.is_empty() {
                        continue;
                    }
                    if self.code_depth > 0 {
                        text
                    } else {
                        escape_markdown(&text)
                    }
                }
                Node::Element(_) => match ElementRef::wrap(child) {
                    Some(el) => self.element(el),
                    None => continue,
                },
                _ => continue,
            };
            out = join(&out, &replacement);
        }

        out
    }

    fn element(&mut self, el: ElementRef<'_>) -> String {
        if is_blank(el) {
            return rules::blank_replacement(self, el);
        }

        let name = el.value().name();
        let in_code = name == "code" || name == "pre";
        if in_code {
            self.code_depth += 1;
        }
        let content = self.children(*el);
        if in_code {
            self.code_depth -= 1;
        }

        match rules::MEDIUM
            .iter()
            .chain(commonmark::RULES.iter())
            .find(|rule| (rule.filter)(el))
        {
            Some(rule) => {
                tracing::trace!(rule = rule.name, element = name, "applying rule");
                (rule.replacement)(self, el, &content)
            }
            None if is_block(*el) => format!("\n\n{}\n\n", content.trim()),
            None => content,
        }
    }
}

pub(super) fn is_block(node: NodeRef<'_, Node>) -> bool {
    node.value()
        .as_element()
        .is_some_and(|el| BLOCK_ELEMENTS.contains(&el.name()))
}

fn is_void_or_meaningful(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name) || MEANINGFUL_WHEN_BLANK.contains(&name)
}

/// An element that would render to nothing: no text, no images, no frames.
fn is_blank(el: ElementRef<'_>) -> bool {
    !is_void_or_meaningful(el.value().name())
        && text_content(*el).trim().is_empty()
        && !el
            .descendants()
            .skip(1)
            .filter_map(|n| n.value().as_element())
            .any(|e| is_void_or_meaningful(e.name()))
}

/// Concatenate two rendered fragments, keeping the larger of the two newline
/// runs at the seam (capped at one blank line).
pub(super) fn join(output: &str, replacement: &str) -> String {
    let left = output.trim_end_matches('\n');
    let right = replacement.trim_start_matches('\n');
    let newlines = (output.len() - left.len())
        .max(replacement.len() - right.len())
        .min(2);

    let mut joined = String::with_capacity(left.len() + newlines + right.len());
    joined.push_str(left);
    joined.push_str(&"\n".repeat(newlines));
    joined.push_str(right);
    joined
}

/// Escape characters that would otherwise turn prose into Markdown syntax.
pub(super) fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }

    // Block markers only matter at the start of a line.
    if out.starts_with(['#', '>', '-', '=', '+']) || out.starts_with("~~~") {
        out.insert(0, '\\');
    } else if let Some(dot) = ordered_list_marker(&out) {
        out.insert(dot, '\\');
    }
    out
}

/// Byte offset of the `.` in a leading `12. `, if any.
fn ordered_list_marker(text: &str) -> Option<usize> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0 && text[digits..].starts_with(". ")).then_some(digits)
}

/// Strip leading and trailing blank space. Blank lines inside are already
/// capped by [`join`], and `pre` content must keep its own.
fn tidy(markdown: &str) -> String {
    markdown
        .trim_start_matches(['\t', '\r', '\n'])
        .trim_end()
        .to_string()
}
