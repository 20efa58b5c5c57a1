//! Chapter extraction: preview stripping, title and sequence number
//! resolution, and block parsing.
//!
//! Every rule here has a fallback, so extraction never fails.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use chapterbook_markdown::{HEADING_PREFIX, parse_blocks};
use chapterbook_shared::{Chapter, UNKNOWN_SEQUENCE};

/// Marker opening the trailing next-chapter teaser.
pub const PREVIEW_MARKER: &str = "下章预告";

/// Build a [`Chapter`] from a file path and its contents.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract(path: &Path, raw: &str) -> Chapter {
    let content = strip_preview(raw);

    let (full_title, short_title) = match find_title(content) {
        Some(full) => {
            let short = short_title(full).to_string();
            (full.to_string(), short)
        }
        None => {
            let stem = file_stem(path);
            debug!(stem = %stem, "no heading found, using file stem as title");
            (stem.clone(), stem)
        }
    };

    let chapter = Chapter {
        sequence_number: sequence_number(path),
        short_title,
        full_title,
        source: path.to_path_buf(),
        blocks: parse_blocks(content),
    };

    if let Some(heading_number) = heading_number(&chapter.full_title) {
        if chapter.has_sequence_number() && heading_number != chapter.sequence_number {
            debug!(
                file = %chapter.sequence_number,
                heading = %heading_number,
                "file name and heading disagree on chapter number, using file name"
            );
        }
    }

    debug!(
        title = %chapter.short_title,
        sequence = %chapter.sequence_number,
        blocks = chapter.blocks.len(),
        "chapter extracted"
    );
    chapter
}

/// Drop everything from the first `下章预告：` line to the end, including the
/// line break before it. Content without the marker is returned unchanged.
pub fn strip_preview(content: &str) -> &str {
    static PREVIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!("(?m)^{PREVIEW_MARKER}[：:]")).expect("valid regex")
    });

    match PREVIEW_RE.find(content) {
        Some(m) => {
            let kept = &content[..m.start()];
            let kept = kept.strip_suffix('\n').unwrap_or(kept);
            kept.strip_suffix('\r').unwrap_or(kept)
        }
        None => content,
    }
}

/// Full title: the text after the first `# ` line prefix.
pub fn find_title(content: &str) -> Option<&str> {
    content.lines().find_map(|line| {
        line.strip_prefix(HEADING_PREFIX)
            .map(str::trim_end)
            .filter(|title| !title.is_empty())
    })
}

/// Short title: `第N章 rest` becomes `rest`; other titles are kept whole.
pub fn short_title(full_title: &str) -> &str {
    static SHORT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^第\d+章\s+(.+)").expect("valid regex"));

    SHORT_RE
        .captures(full_title)
        .and_then(|c| c.get(1))
        .map_or(full_title, |m| m.as_str())
}

/// Chapter number from the file name (`第003章_…` → `"3"`), or `"?"`.
pub fn sequence_number(path: &Path) -> String {
    static NUMBER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"第(\d+)章").expect("valid regex"));

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    NUMBER_RE
        .captures(&name)
        .map(|c| normalize_number(&c[1]))
        .unwrap_or_else(|| UNKNOWN_SEQUENCE.to_string())
}

/// Number in a `第N章` heading prefix, normalized like [`sequence_number`].
fn heading_number(full_title: &str) -> Option<String> {
    static HEADING_NUMBER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^第(\d+)章").expect("valid regex"));

    HEADING_NUMBER_RE
        .captures(full_title)
        .map(|c| normalize_number(&c[1]))
}

/// Strip zero padding, keeping a lone `0`.
fn normalize_number(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
