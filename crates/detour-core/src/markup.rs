//! Small text helpers shared by the server views and the list engine.

use regex::RegexBuilder;

const ELLIPSIS: &str = "…";

/// Replaces the middle segments of a long path with an ellipsis.
///
/// Paths up to `max_length` characters, and paths with three or fewer
/// segments, are returned unchanged. The first segment is kept, the second
/// one as well when the first is short (e.g. a scheme or a language prefix),
/// and the last one always.
///
/// ```
/// use detour_core::markup::shorten_path;
///
/// assert_eq!(shorten_path("en/shop/category/product/detail", 10), "en/shop/…/detail");
/// assert_eq!(shorten_path("short", 10), "short");
/// ```
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() <= 3 {
        return path.to_string();
    }

    let first = parts[0];
    let mut shortened = String::from(first);
    if first.chars().count() <= 6 {
        shortened.push('/');
        shortened.push_str(parts[1]);
    }
    shortened.push('/');
    shortened.push_str(ELLIPSIS);
    shortened.push('/');
    shortened.push_str(parts[parts.len() - 1]);
    shortened
}

/// Wraps every case-insensitive occurrence of `keyword` in `<mark>` tags.
///
/// The keyword is matched literally. An empty keyword leaves the text as is.
pub fn highlight(text: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return text.to_string();
    }

    // An escaped literal always compiles; the fallback only guards the size limit.
    match RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern.replace_all(text, "<mark>$0</mark>").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Replaces the HTML special characters `& < > " '`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes `text` and highlights `keyword` inside it.
pub fn highlight_escaped(text: &str, keyword: &str) -> String {
    highlight(&escape_html(text), &escape_html(keyword))
}
