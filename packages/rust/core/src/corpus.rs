//! Chapter file discovery and corpus loading.

use std::fs::DirEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use chapterbook_shared::{ChapterbookError, Corpus, Result};

use crate::extract;
use crate::pipeline::ProgressReporter;

/// List the files in `dir` whose names match `pattern`, sorted by path.
///
/// Only the top level of `dir` is searched. A missing directory yields an
/// empty list; any other failure to read it is an error. Sorting is
/// lexicographic, so `第010章` follows `第002章` only when the numbers share
/// a width.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn discover_chapter_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("chapter directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ChapterbookError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ChapterbookError::io(dir, e))?;
        let path = entry.path();

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %path.display(), "skipping entry with non UTF-8 name");
            continue;
        };

        if !pattern.is_match(&name) {
            continue;
        }

        if !is_regular_file(&entry, &path)? {
            warn!(path = %path.display(), "name matches chapter pattern but is not a file, skipping");
            continue;
        }

        files.push(path);
    }

    files.sort();
    debug!(count = files.len(), "chapter files discovered");
    Ok(files)
}

/// Whether a directory entry is a file, following symlinks. Unreadable
/// metadata is an error rather than a skip.
fn is_regular_file(entry: &DirEntry, path: &Path) -> Result<bool> {
    let file_type = entry.file_type().map_err(|e| ChapterbookError::io(path, e))?;
    if !file_type.is_symlink() {
        return Ok(file_type.is_file());
    }
    let metadata = std::fs::metadata(path).map_err(|e| ChapterbookError::io(path, e))?;
    Ok(metadata.is_file())
}

/// Read and extract every file, keeping the given order as corpus order.
#[instrument(skip_all, fields(files = files.len()))]
pub fn load_corpus(files: &[PathBuf], progress: &dyn ProgressReporter) -> Result<Corpus> {
    let total = files.len();
    let mut chapters = Vec::with_capacity(total);

    for (i, path) in files.iter().enumerate() {
        let raw = std::fs::read_to_string(path).map_err(|e| ChapterbookError::io(path, e))?;
        let chapter = extract::extract(path, &raw);
        progress.chapter_extracted(&chapter.short_title, i + 1, total);
        chapters.push(chapter);
    }

    info!(chapters = chapters.len(), "corpus loaded");
    Ok(Corpus::new(chapters))
}

/// Discover and load in one step.
pub fn collect_corpus(
    dir: &Path,
    pattern: &Regex,
    progress: &dyn ProgressReporter,
) -> Result<Corpus> {
    let files = discover_chapter_files(dir, pattern)?;
    load_corpus(&files, progress)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
