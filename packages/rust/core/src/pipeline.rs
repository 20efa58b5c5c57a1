//! End-to-end `build` pipeline: chapter directory → corpus → page → one file.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use chapterbook_shared::{BuildConfig, Result};

use crate::assembler::write_document;
use crate::corpus::{discover_chapter_files, load_corpus};
use crate::shell::render_document;

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Number of chapters in the page.
    pub chapter_count: usize,
    /// Where the page was written.
    pub output_path: PathBuf,
    /// Size of the page in bytes.
    pub bytes_written: usize,
    /// Hex SHA-256 of the page; identical input gives an identical digest.
    pub sha256: String,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Result of [`build`].
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The page was written.
    Built(BuildReport),
    /// No chapter files were found; nothing was written.
    NoChapters { chapter_dir: PathBuf },
}

/// Progress callback for reporting build status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each chapter is extracted.
    fn chapter_extracted(&self, title: &str, current: usize, total: usize);
    /// Called when the build finishes, whatever the outcome.
    fn done(&self, outcome: &BuildOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn chapter_extracted(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &BuildOutcome) {}
}

/// Run the full build.
///
/// 1. Discover chapter files
/// 2. Extract every chapter
/// 3. Render the page in memory
/// 4. Write it (the only write, and the last step)
#[instrument(skip_all, fields(chapters = %config.chapter_dir.display(), output = %config.output.display()))]
pub fn build(config: &BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildOutcome> {
    let start = Instant::now();

    progress.phase("Discovering chapters");
    let files = discover_chapter_files(&config.chapter_dir, &config.chapter_pattern)?;
    if files.is_empty() {
        info!("no chapter files found, nothing written");
        let outcome = BuildOutcome::NoChapters {
            chapter_dir: config.chapter_dir.clone(),
        };
        progress.done(&outcome);
        return Ok(outcome);
    }

    progress.phase("Extracting chapters");
    let corpus = load_corpus(&files, progress)?;

    progress.phase("Rendering page");
    let html = render_document(&corpus, &config.book, &config.reader)?;

    progress.phase("Writing page");
    let receipt = write_document(&config.output, &html)?;

    let report = BuildReport {
        chapter_count: corpus.len(),
        output_path: config.output.clone(),
        bytes_written: receipt.bytes_written,
        sha256: receipt.sha256,
        elapsed: start.elapsed(),
    };

    info!(
        chapters = report.chapter_count,
        bytes = report.bytes_written,
        elapsed_ms = report.elapsed.as_millis(),
        "build complete"
    );

    let outcome = BuildOutcome::Built(report);
    progress.done(&outcome);
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    use chapterbook_shared::{AppConfig, ChapterbookError};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cb-pipeline-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fixture_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/chapters")
    }

    fn config_for(chapters: &Path, output: &Path) -> BuildConfig {
        BuildConfig::resolve(
            &AppConfig::default(),
            Some(chapters.to_path_buf()),
            Some(output.to_path_buf()),
        )
        .unwrap()
    }

    fn built(outcome: BuildOutcome) -> BuildReport {
        match outcome {
            BuildOutcome::Built(report) => report,
            BuildOutcome::NoChapters { chapter_dir } => {
                panic!("expected a build, found no chapters in {}", chapter_dir.display())
            }
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: RefCell<Vec<String>>,
        extracted: RefCell<Vec<(String, usize, usize)>>,
        finished: RefCell<bool>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.borrow_mut().push(name.to_string());
        }
        fn chapter_extracted(&self, title: &str, current: usize, total: usize) {
            self.extracted
                .borrow_mut()
                .push((title.to_string(), current, total));
        }
        fn done(&self, _outcome: &BuildOutcome) {
            *self.finished.borrow_mut() = true;
        }
    }

    #[test]
    fn builds_fixture_book() {
        let tmp = temp_dir();
        let output = tmp.join("dist/index.html");
        let config = config_for(&fixture_dir(), &output);

        let report = built(build(&config, &SilentProgress).unwrap());
        assert_eq!(report.chapter_count, 3);
        assert_eq!(report.output_path, output);

        let html = std::fs::read_to_string(&output).unwrap();
        assert_eq!(html.len(), report.bytes_written);
        assert!(html.contains(r#"<span class="num">1</span><span>旧梦</span>"#));
        assert!(html.contains(r#"<span class="num">2</span><span>重逢</span>"#));
        assert!(html.contains(r#"<span class="num">10</span><span>记忆市场</span>"#));
        assert!(html.contains("total: 3,"));
        assert!(!html.contains("下章预告"));
        assert!(html.contains(r#"<p class="ni"><strong>【系统提示】</strong>"#));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn fixture_order_is_lexicographic() {
        let tmp = temp_dir();
        let output = tmp.join("index.html");
        build(&config_for(&fixture_dir(), &output), &SilentProgress).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        let pos = |needle: &str| html.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(pos(r#"data-title="旧梦""#) < pos(r#"data-title="重逢""#));
        assert!(pos(r#"data-title="重逢""#) < pos(r#"data-title="记忆市场""#));
        assert!(html.contains(r#"id="ch-2" data-title="记忆市场""#));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_directory_writes_nothing() {
        let tmp = temp_dir();
        let chapters = tmp.join("章节");
        std::fs::create_dir_all(&chapters).unwrap();
        let output = tmp.join("dist/index.html");

        let outcome = build(&config_for(&chapters, &output), &SilentProgress).unwrap();
        match outcome {
            BuildOutcome::NoChapters { chapter_dir } => assert_eq!(chapter_dir, chapters),
            BuildOutcome::Built(_) => panic!("expected no chapters"),
        }
        assert!(!output.exists());
        assert!(!tmp.join("dist").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let tmp = temp_dir();
        let output = tmp.join("index.html");
        let config = config_for(&fixture_dir(), &output);

        let first = built(build(&config, &SilentProgress).unwrap());
        let first_bytes = std::fs::read(&output).unwrap();
        let second = built(build(&config, &SilentProgress).unwrap());
        let second_bytes = std::fs::read(&output).unwrap();

        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first.sha256, second.sha256);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn zero_padded_names_sort_before_wider_numbers() {
        let tmp = temp_dir();
        let chapters = tmp.join("章节");
        std::fs::create_dir_all(&chapters).unwrap();
        std::fs::write(chapters.join("第001章_甲.md"), "# 第1章 甲").unwrap();
        std::fs::write(chapters.join("第010章_丙.md"), "# 第10章 丙").unwrap();
        std::fs::write(chapters.join("第002章_乙.md"), "# 第2章 乙").unwrap();
        let output = tmp.join("index.html");

        let progress = RecordingProgress::default();
        build(&config_for(&chapters, &output), &progress).unwrap();

        let extracted = progress.extracted.borrow();
        let titles: Vec<&str> = extracted.iter().map(|(t, _, _)| t.as_str()).collect();
        assert_eq!(titles, vec!["甲", "乙", "丙"]);
        assert_eq!(extracted[2].1, 3);
        assert_eq!(extracted[2].2, 3);
        assert!(*progress.finished.borrow());
        assert_eq!(progress.phases.borrow().last().map(String::as_str), Some("Writing page"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unreadable_chapter_aborts_before_writing() {
        let tmp = temp_dir();
        let chapters = tmp.join("章节");
        std::fs::create_dir_all(&chapters).unwrap();
        std::fs::write(chapters.join("第001章_好.md"), "# 第1章 好").unwrap();
        std::fs::write(chapters.join("第002章_坏.md"), [0xc3, 0x28]).unwrap();
        let output = tmp.join("dist/index.html");

        assert!(build(&config_for(&chapters, &output), &SilentProgress).is_err());
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[cfg(unix)]
    #[test]
    fn locked_chapter_dir_fails_instead_of_reporting_no_chapters() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = temp_dir();
        let locked = tmp.join("locked");
        let chapters = locked.join("章节");
        std::fs::create_dir_all(&chapters).unwrap();
        std::fs::write(chapters.join("第001章_一.md"), "# 第1章 一").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        let output = tmp.join("dist/index.html");

        let enforced = std::fs::read_dir(&chapters).is_err();
        let result = build(&config_for(&chapters, &output), &SilentProgress);

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if enforced {
            assert!(matches!(result, Err(ChapterbookError::Io { .. })), "got {result:?}");
            assert!(!output.exists());
        } else {
            assert!(matches!(result, Ok(BuildOutcome::Built(_))));
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
