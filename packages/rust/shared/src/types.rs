//! Core domain types for Chapterbook.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sequence number used when a file name carries no `第N章` marker.
pub const UNKNOWN_SEQUENCE: &str = "?";

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One rendered unit of a chapter. Text fields hold already-formatted,
/// HTML-safe markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// A `# ` line.
    Heading(String),
    /// A horizontal rule (`——` or `---`).
    Divider,
    /// Any other non-blank line.
    Paragraph {
        text: String,
        /// `false` for notices that start with an emphasized `【…】` marker or raw `**`.
        indented: bool,
    },
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

/// A chapter extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Number taken from the file name, or [`UNKNOWN_SEQUENCE`].
    pub sequence_number: String,
    /// Title shown in navigation (heading with the `第N章` prefix removed).
    pub short_title: String,
    /// First `# ` heading, or the file stem.
    pub full_title: String,
    /// File the chapter was read from.
    pub source: PathBuf,
    /// Body blocks in source order.
    pub blocks: Vec<Block>,
}

impl Chapter {
    /// Whether the file name carried a parseable chapter number.
    pub fn has_sequence_number(&self) -> bool {
        self.sequence_number != UNKNOWN_SEQUENCE
    }
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// Ordered chapters of one build. Positions are the only cross-reference
/// between chapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    chapters: Vec<Chapter>,
}

impl Corpus {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// One navigation entry per chapter, in corpus order.
    pub fn nav_entries(&self) -> Vec<NavEntry> {
        self.chapters
            .iter()
            .enumerate()
            .map(|(index, ch)| NavEntry {
                index,
                sequence_number: ch.sequence_number.clone(),
                short_title: ch.short_title.clone(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// NavEntry
// ---------------------------------------------------------------------------

/// A sidebar row: position plus display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub index: usize,
    pub sequence_number: String,
    pub short_title: String,
}
