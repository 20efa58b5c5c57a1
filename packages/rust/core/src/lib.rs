//! Build pipeline and chapter logic for Chapterbook.
//!
//! This crate ties together chapter discovery, extraction, page rendering,
//! and the final write into one `build` workflow.

pub mod assembler;
pub mod corpus;
pub mod extract;
pub mod pipeline;
pub mod shell;
