//! Shared utility functions.

use percent_encoding::percent_decode_str;

/// Convert a title to a URL slug.
///
/// Transliterates to ASCII, lowercases, and joins runs of alphanumerics
/// with `-`.
/// "Hello, World!" -> "hello-world"
/// "Crème Brûlée 2" -> "creme-brulee-2"
pub fn slugify(s: &str) -> String {
    deunicode::deunicode(s)
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Percent-decoded last path segment of a URL, ignoring query, fragment and a
/// trailing slash.
/// "https://medium.com/@me/my-post-1a2b3c?source=rss" -> "my-post-1a2b3c"
pub fn last_path_segment(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
