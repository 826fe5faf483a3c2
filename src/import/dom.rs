//! Small helpers over the `scraper` parse tree.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

/// Parse a selector that is known to be valid at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn is_named(node: NodeRef<'_, Node>, name: &str) -> bool {
    node.value()
        .as_element()
        .is_some_and(|el| el.name().eq_ignore_ascii_case(name))
}

pub fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Concatenated text of every descendant text node, like the DOM's `textContent`.
pub fn text_content(node: NodeRef<'_, Node>) -> String {
    node.descendants()
        .filter_map(|n| n.value().as_text().map(|t| &**t))
        .collect()
}

/// Collapse every run of whitespace into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// First match of `selector`, trimmed text content. `None` when nothing matches.
pub fn select_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .next()
        .map(|el| text_content(*el).trim().to_string())
}

/// Attribute of the first element matching `selector`.
pub fn select_attr(html: &Html, selector: &Selector, attr: &str) -> Option<String> {
    html.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// Detach the first element matching `selector` from the tree.
///
/// Returns whether anything was removed.
pub fn remove_first(html: &mut Html, selector: &Selector) -> bool {
    let Some(id) = html.select(selector).next().map(|el| el.id()) else {
        return false;
    };
    match html.tree.get_mut(id) {
        Some(mut node) => {
            node.detach();
            true
        }
        None => false,
    }
}
