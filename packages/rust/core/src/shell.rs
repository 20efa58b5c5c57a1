//! Page shell: the static reader page and the fragments substituted into it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, instrument};

use chapterbook_markdown::{escape_html, render_blocks};
use chapterbook_shared::{BookConfig, ChapterbookError, Corpus, ReaderSettings, Result};

/// Built-in reader page.
pub const SHELL_TEMPLATE: &str = include_str!("shell.html");

/// Placeholders every shell must contain.
pub const REQUIRED_PLACEHOLDERS: [&str; 6] = [
    "SIDEBAR_ITEMS",
    "HIDDEN_CHAPTERS",
    "TOTAL_CH",
    "BOOK_TITLE",
    "BOOK_SUBTITLE",
    "READER_CONFIG",
];

/// Render the complete reader page for `corpus`. Pure; performs no I/O.
#[instrument(skip_all, fields(chapters = corpus.len()))]
pub fn render_document(
    corpus: &Corpus,
    book: &BookConfig,
    reader: &ReaderSettings,
) -> Result<String> {
    let reader_json = serde_json::to_string(reader).map_err(|e| {
        ChapterbookError::template(format!("reader settings serialization failed: {e}"))
    })?;

    let values = HashMap::from([
        ("SIDEBAR_ITEMS", render_nav_items(corpus)),
        ("HIDDEN_CHAPTERS", render_chapter_sections(corpus)),
        ("TOTAL_CH", corpus.len().to_string()),
        ("BOOK_TITLE", escape_html(&book.title)),
        ("BOOK_SUBTITLE", escape_html(&book.subtitle)),
        ("READER_CONFIG", reader_json),
    ]);

    let html = fill_template(SHELL_TEMPLATE, &values)?;
    debug!(len = html.len(), "document rendered");
    Ok(html)
}

/// Sidebar rows, one per chapter.
pub fn render_nav_items(corpus: &Corpus) -> String {
    corpus
        .nav_entries()
        .iter()
        .map(|entry| {
            format!(
                r#"    <div class="chapter-item" data-ch="{}"><span class="num">{}</span><span>{}</span></div>"#,
                entry.index,
                escape_html(&entry.sequence_number),
                escape_html(&entry.short_title),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hidden per-chapter content containers, addressed by `ch-{index}`.
pub fn render_chapter_sections(corpus: &Corpus) -> String {
    corpus
        .chapters()
        .iter()
        .enumerate()
        .map(|(i, ch)| {
            format!(
                "<div class=\"ch-data\" id=\"ch-{i}\" data-title=\"{}\">\n{}\n</div>",
                escape_html(&ch.short_title),
                render_blocks(&ch.blocks),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Replace every `{{NAME}}` in `template` with its value in one pass.
///
/// Inserted values are never rescanned, so chapter text containing `{{…}}` is
/// left alone. Every required placeholder must appear in the template;
/// placeholders without a value are kept verbatim.
pub fn fill_template(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    static PLACEHOLDER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").expect("valid regex"));

    let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
        .iter()
        .copied()
        .filter(|name| !template.contains(&format!("{{{{{name}}}}}")))
        .collect();
    if !missing.is_empty() {
        return Err(ChapterbookError::template(format!(
            "shell is missing placeholders: {}",
            missing.join(", ")
        )));
    }

    let filled = PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
        values
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });

    Ok(filled.into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
