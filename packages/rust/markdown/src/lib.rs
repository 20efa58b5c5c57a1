//! Minimal markdown subset used by chapter files.
//!
//! The grammar is line based and closed: a line is a heading (`# `), a divider
//! (`——` or `---`), or a paragraph. Inline markup is limited to `**strong**`.
//! Everything else is escaped and shown literally.

mod inline;
mod render;

use tracing::trace;

use chapterbook_shared::Block;

pub use inline::{escape_html, format_inline};
pub use render::{NO_INDENT_CLASS, render_block, render_blocks};

/// Prefix marking a heading line.
pub const HEADING_PREFIX: &str = "# ";

/// Lines rendered as `<hr>`.
pub const DIVIDER_TOKENS: [&str; 2] = ["——", "---"];

/// Formatted-text prefix of a system/author notice (`**【…】**`).
const NOTICE_PREFIX: &str = "<strong>【";

/// Raw prefix that also disables indentation.
const STRONG_MARKER: &str = "**";

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Convert chapter text into blocks, one per non-blank line, in source order.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let blocks: Vec<Block> = text
        .trim()
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(classify_line)
        .collect();

    trace!(blocks = blocks.len(), "parsed chapter text");
    blocks
}

/// Classify one trimmed, non-empty line.
///
/// Heading and divider checks run before the paragraph indentation test.
fn classify_line(line: &str) -> Block {
    if let Some(rest) = line.strip_prefix(HEADING_PREFIX) {
        return Block::Heading(format_inline(rest));
    }

    if DIVIDER_TOKENS.contains(&line) {
        return Block::Divider;
    }

    let text = format_inline(line);
    let indented = !(text.starts_with(NOTICE_PREFIX) || line.starts_with(STRONG_MARKER));
    Block::Paragraph { text, indented }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
