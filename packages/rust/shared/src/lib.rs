//! Shared types, error model, and configuration for Chapterbook.
//!
//! This crate is the foundation depended on by all other Chapterbook crates.
//! It provides:
//! - [`ChapterbookError`]: the unified error type
//! - Domain types ([`Block`], [`Chapter`], [`Corpus`], [`NavEntry`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], [`ReaderSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BookConfig, BuildConfig, BuildSection, CONFIG_FILE_NAME, ReaderSettings,
    glob_to_regex, init_config, load_config, load_config_from, resolve_config_path,
};
pub use error::{ChapterbookError, Result};
pub use types::{Block, Chapter, Corpus, NavEntry, UNKNOWN_SEQUENCE};
