//! Inline formatting: HTML escaping plus the single `**strong**` convention.

use std::sync::LazyLock;

use regex::Regex;

/// Escape the characters that are significant in HTML text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format one raw line: escape everything, then turn each `**…**` pair into a
/// `<strong>` span.
///
/// Pairs are matched non-greedily, left to right, without overlap; the inner
/// text must be non-empty. Unpaired markers stay literal.
pub fn format_inline(raw: &str) -> String {
    static STRONG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));

    let escaped = escape_html(raw);
    STRONG_RE
        .replace_all(&escaped, "<strong>$1</strong>")
        .into_owned()
}
