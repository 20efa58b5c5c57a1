//! Output writer.
//!
//! Writes the finished page in one step: a temp file next to the target,
//! then a rename, so the destination is either the old file or the complete
//! new one.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use chapterbook_shared::{ChapterbookError, Result};

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Size of the document in bytes.
    pub bytes_written: usize,
    /// Hex SHA-256 of the document.
    pub sha256: String,
}

/// Write `html` to `path`, creating missing parent directories.
#[instrument(skip_all, fields(path = %path.display(), len = html.len()))]
pub fn write_document(path: &Path, html: &str) -> Result<WriteReceipt> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ChapterbookError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| ChapterbookError::validation(format!("{} has no file name", path.display())))?
        .to_string_lossy();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    let written = std::fs::write(&temp, html)
        .map_err(|e| ChapterbookError::io(&temp, e))
        .and_then(|()| std::fs::rename(&temp, path).map_err(|e| ChapterbookError::io(path, e)));
    if let Err(e) = written {
        // A short write or a failed rename both leave the temp file behind
        let _ = std::fs::remove_file(&temp);
        return Err(e);
    }

    let receipt = WriteReceipt {
        bytes_written: html.len(),
        sha256: sha256_hex(html),
    };
    debug!(sha256 = %receipt.sha256, "document written");
    Ok(receipt)
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
