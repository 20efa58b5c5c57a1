//! Application configuration for Chapterbook.
//!
//! Project config lives next to the chapters in `./chapterbook.toml`, or at a
//! path given with `--config`. CLI flags override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ChapterbookError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "chapterbook.toml";

// ---------------------------------------------------------------------------
// Config structs (matching chapterbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations.
    #[serde(default)]
    pub build: BuildSection,

    /// Book metadata shown in the sidebar header and welcome screen.
    #[serde(default)]
    pub book: BookConfig,

    /// Client-side reader defaults.
    #[serde(default)]
    pub reader: ReaderSettings,
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Directory holding the chapter files (not searched recursively).
    #[serde(default = "default_chapter_dir")]
    pub chapter_dir: String,

    /// Output HTML file.
    #[serde(default = "default_output")]
    pub output: String,

    /// File name glob selecting chapter files.
    #[serde(default = "default_chapter_glob")]
    pub chapter_glob: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            chapter_dir: default_chapter_dir(),
            output: default_output(),
            chapter_glob: default_chapter_glob(),
        }
    }
}

fn default_chapter_dir() -> String {
    "章节".into()
}
fn default_output() -> String {
    "dist/index.html".into()
}
fn default_chapter_glob() -> String {
    "第*章_*.md".into()
}

/// `[book]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Book title (page `<title>`, sidebar header, welcome screen).
    #[serde(default = "default_title")]
    pub title: String,

    /// Subtitle shown under the title.
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
        }
    }
}

fn default_title() -> String {
    "重生2008".into()
}
fn default_subtitle() -> String {
    "记忆贩卖者".into()
}

/// `[reader]` section. Serialized as JSON into the page for the reader controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderSettings {
    /// Initial font size in px.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Smallest font size reachable with the `−` button.
    #[serde(default = "default_font_min")]
    pub font_min: u32,

    /// Largest font size reachable with the `+` button.
    #[serde(default = "default_font_max")]
    pub font_max: u32,

    /// Change per button press.
    #[serde(default = "default_font_step")]
    pub font_step: u32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            font_min: default_font_min(),
            font_max: default_font_max(),
            font_step: default_font_step(),
        }
    }
}

fn default_font_size() -> u32 {
    18
}
fn default_font_min() -> u32 {
    14
}
fn default_font_max() -> u32 {
    28
}
fn default_font_step() -> u32 {
    2
}

impl ReaderSettings {
    /// Reject settings the reader controller cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.font_step == 0 {
            return Err(ChapterbookError::config("reader.font_step must be positive"));
        }
        if !(self.font_min <= self.font_size && self.font_size <= self.font_max) {
            return Err(ChapterbookError::config(format!(
                "reader.font_size {} must lie within [{}, {}]",
                self.font_size, self.font_min, self.font_max
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory scanned for chapter files.
    pub chapter_dir: PathBuf,
    /// Destination of the generated page.
    pub output: PathBuf,
    /// Compiled chapter file name pattern.
    pub chapter_pattern: Regex,
    /// Book metadata.
    pub book: BookConfig,
    /// Reader defaults.
    pub reader: ReaderSettings,
}

impl BuildConfig {
    /// Resolve the runtime config, letting explicit paths override the file.
    pub fn resolve(
        config: &AppConfig,
        chapter_dir: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Self> {
        config.reader.validate()?;
        let chapter_pattern = glob_to_regex(&config.build.chapter_glob)?;

        Ok(Self {
            chapter_dir: chapter_dir.unwrap_or_else(|| PathBuf::from(&config.build.chapter_dir)),
            output: output.unwrap_or_else(|| PathBuf::from(&config.build.output)),
            chapter_pattern,
            book: config.book.clone(),
            reader: config.reader.clone(),
        })
    }
}

/// Convert a glob-like file name pattern to an anchored regex.
///
/// `*` matches any run of characters except `/`, `?` matches one character.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{escaped}$")).map_err(|e| {
        ChapterbookError::config(format!("invalid chapter_glob '{pattern}': {e}"))
    })
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Pick the config file to read: an explicit path, else `./chapterbook.toml` if present.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    }
}

/// Load the application config. Returns defaults when no config file applies.
///
/// An explicitly named file must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match resolve_config_path(explicit) {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ChapterbookError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ChapterbookError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Write a default config file into `dir`. Refuses to overwrite an existing one.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(ChapterbookError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| ChapterbookError::io(dir, e))?;
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ChapterbookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ChapterbookError::io(&path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cb-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("chapter_dir"));
        assert!(toml_str.contains("第*章_*.md"));
        assert!(toml_str.contains("font_size = 18"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[build]
output = "site/book.html"

[book]
title = "测试之书"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.build.output, "site/book.html");
        assert_eq!(config.build.chapter_dir, "章节");
        assert_eq!(config.book.title, "测试之书");
        assert_eq!(config.book.subtitle, "记忆贩卖者");
        assert_eq!(config.reader, ReaderSettings::default());
    }

    #[test]
    fn build_config_flags_override_file() {
        let app = AppConfig::default();
        let build = BuildConfig::resolve(
            &app,
            Some(PathBuf::from("other")),
            Some(PathBuf::from("out/x.html")),
        )
        .unwrap();
        assert_eq!(build.chapter_dir, PathBuf::from("other"));
        assert_eq!(build.output, PathBuf::from("out/x.html"));

        let defaults = BuildConfig::resolve(&app, None, None).unwrap();
        assert_eq!(defaults.chapter_dir, PathBuf::from("章节"));
        assert_eq!(defaults.output, PathBuf::from("dist/index.html"));
    }

    #[test]
    fn default_glob_matches_chapter_names() {
        let re = glob_to_regex("第*章_*.md").unwrap();
        assert!(re.is_match("第001章_开端.md"));
        assert!(re.is_match("第12章_归途.md"));
        assert!(!re.is_match("第001章_开端.txt"));
        assert!(!re.is_match("序章.md"));
        assert!(!re.is_match("notes_第001章_开端.md"));
    }

    #[test]
    fn glob_escapes_regex_metacharacters() {
        let re = glob_to_regex("ch(?).md").unwrap();
        assert!(re.is_match("ch(1).md"));
        assert!(!re.is_match("ch1.md"));
    }

    #[test]
    fn reader_settings_validation() {
        assert!(ReaderSettings::default().validate().is_ok());

        let bad = ReaderSettings {
            font_size: 40,
            ..ReaderSettings::default()
        };
        assert!(bad.validate().unwrap_err().to_string().contains("font_size 40"));

        let zero_step = ReaderSettings {
            font_step: 0,
            ..ReaderSettings::default()
        };
        assert!(zero_step.validate().is_err());
    }

    #[test]
    fn init_then_load_roundtrip() {
        let tmp = temp_dir();
        let path = init_config(&tmp).unwrap();
        assert!(path.ends_with(CONFIG_FILE_NAME));

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.build.chapter_glob, "第*章_*.md");
        assert_eq!(loaded.reader.font_max, 28);

        // A second init must not clobber the file
        assert!(init_config(&tmp).is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = temp_dir();
        let err = load_config(Some(&tmp.join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ChapterbookError::Io { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_config_reports_path() {
        let tmp = temp_dir();
        let path = tmp.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[reader]\nfont_size = \"big\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
