//! Shared building blocks for the chat activity report.
//!
//! Holds the aggregate containers produced by the parser, the error taxonomy
//! used across the workspace, command-line settings, date helpers for the
//! chat export format and the atomic file writer used for every output.

pub mod error;
pub mod models;
pub mod output;
pub mod settings;
pub mod time_utils;

pub use error::{ActivityError, Result};
