//! Channel layer for output buffering and completion detection.
//!
//! This module handles the pieces of the interactive session that sit
//! between raw transport bytes and command results: ANSI stripping,
//! prompt matching, the read strategy, and the [`InteractiveShell`] that
//! ties them together.

mod buffer;
mod patterns;
mod reader;
mod shell;

pub use buffer::PatternBuffer;
pub use patterns::{PromptMatcher, compile_prompt_pattern};
pub use reader::{Completion, ReadStrategy, ShellOptions, WaitProfile};
pub use shell::InteractiveShell;
