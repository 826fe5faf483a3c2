//! Standard HTML → CommonMark rules.
//!
//! ATX headings, `-` bullets, `---` rules, `_` emphasis and `**` strong.

use scraper::ElementRef;

use super::dom::is_named;
use super::render::Renderer;
use super::rules::Rule;

pub(super) static RULES: [Rule; 11] = [
    Rule {
        name: "paragraph",
        filter: |el| el.value().name() == "p",
        replacement: |_, _, content| format!("\n\n{}\n\n", content.trim()),
    },
    Rule {
        name: "line-break",
        filter: |el| el.value().name() == "br",
        replacement: |_, _, _| "  \n".to_string(),
    },
    Rule {
        name: "heading",
        filter: |el| heading_level(el).is_some(),
        replacement: heading,
    },
    Rule {
        name: "blockquote",
        filter: |el| el.value().name() == "blockquote",
        replacement: blockquote,
    },
    Rule {
        name: "list",
        filter: |el| matches!(el.value().name(), "ul" | "ol"),
        replacement: list,
    },
    Rule {
        name: "list-item",
        filter: |el| el.value().name() == "li",
        replacement: list_item,
    },
    Rule {
        name: "horizontal-rule",
        filter: |el| el.value().name() == "hr",
        replacement: |_, _, _| "\n\n---\n\n".to_string(),
    },
    Rule {
        name: "inline-link",
        filter: |el| el.value().name() == "a" && el.value().attr("href").is_some(),
        replacement: inline_link,
    },
    Rule {
        name: "emphasis",
        filter: |el| matches!(el.value().name(), "em" | "i"),
        replacement: |_, _, content| delimit(content, "_"),
    },
    Rule {
        name: "strong",
        filter: |el| matches!(el.value().name(), "strong" | "b"),
        replacement: |_, _, content| delimit(content, "**"),
    },
    Rule {
        name: "remove",
        filter: |el| matches!(el.value().name(), "script" | "style" | "noscript"),
        replacement: |_, _, _| String::new(),
    },
];

fn heading_level(el: ElementRef<'_>) -> Option<usize> {
    match el.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn heading(_: &mut Renderer<'_>, el: ElementRef<'_>, content: &str) -> String {
    let level = heading_level(el).unwrap_or(1);
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{} {}\n\n", "#".repeat(level), content)
}

fn blockquote(_: &mut Renderer<'_>, _: ElementRef<'_>, content: &str) -> String {
    let quoted = content
        .trim()
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n{quoted}\n\n")
}

fn list(_: &mut Renderer<'_>, el: ElementRef<'_>, content: &str) -> String {
    let nested_last = el.parent().is_some_and(|parent| {
        is_named(parent, "li") && parent.children().filter_map(ElementRef::wrap).last() == Some(el)
    });
    if nested_last {
        format!("\n{content}")
    } else {
        format!("\n\n{content}\n\n")
    }
}

fn list_item(_: &mut Renderer<'_>, el: ElementRef<'_>, content: &str) -> String {
    let content = content.trim_start_matches('\n');
    let body = content.trim_end_matches('\n');
    let had_trailing_newline = body.len() != content.len();
    let mut content = body.replace('\n', "\n    ");
    if had_trailing_newline || el.next_sibling().is_some() {
        content.push('\n');
    }

    let prefix = match el.parent().and_then(ElementRef::wrap) {
        Some(parent) if parent.value().name() == "ol" => {
            let index = parent
                .children()
                .filter_map(ElementRef::wrap)
                .position(|sibling| sibling == el)
                .unwrap_or(0);
            let start = parent
                .value()
                .attr("start")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(1);
            format!("{}.  ", start + index)
        }
        _ => "-   ".to_string(),
    };

    format!("{prefix}{content}")
}

fn inline_link(_: &mut Renderer<'_>, el: ElementRef<'_>, content: &str) -> String {
    let href = el
        .value()
        .attr("href")
        .unwrap_or_default()
        .replace('(', "\\(")
        .replace(')', "\\)");
    let title = el
        .value()
        .attr("title")
        .filter(|t| !t.is_empty())
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("[{content}]({href}{title})")
}

/// Wrap `content` in `delimiter`, keeping surrounding whitespace outside.
fn delimit(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{delimiter}{trimmed}{delimiter}{trailing}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::render::testing::render_markdown;

    #[test]
    fn test_delimit_keeps_flanking_whitespace() {
        assert_eq!(delimit(" bold ", "**"), " **bold** ");
        assert_eq!(delimit("x", "_"), "_x_");
        assert_eq!(delimit("  ", "_"), "  ");
    }

    #[test]
    fn test_ordered_list_start() {
        let md = render_markdown(r#"<body><ol start="3"><li>c</li><li>d</li></ol></body>"#);
        assert_eq!(md, "3.  c\n4.  d");
    }

    #[test]
    fn test_nested_list_is_indented() {
        let md = render_markdown("<body><ul><li>outer<ul><li>inner</li></ul></li><li>next</li></ul></body>");
        assert_eq!(md, "-   outer\n    -   inner\n-   next");
    }

    #[test]
    fn test_link_with_title_and_parens() {
        let md = render_markdown(
            r#"<body><p><a href="https://en.wikipedia.org/wiki/Rust_(language)" title="Rust">Rust</a></p></body>"#,
        );
        assert_eq!(md, r#"[Rust](https://en.wikipedia.org/wiki/Rust_\(language\) "Rust")"#);
    }

    #[test]
    fn test_line_break() {
        let md = render_markdown("<body><p>one<br>two</p></body>");
        assert_eq!(md, "one  \ntwo");
    }

    #[test]
    fn test_heading_with_no_text_is_dropped() {
        let md = render_markdown("<body><h2><script></script></h2><p>text</p></body>");
        assert_eq!(md, "text");
    }
}
