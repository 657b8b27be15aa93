//! Data ingestion layer for the chat activity report.
//!
//! Reads exported chat logs line by line, turns matching lines into
//! [`activity_core::models::MessageRecord`]s, folds them into the aggregate
//! tables and runs the top-level analysis step that the renderer consumes.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use activity_core as core;
