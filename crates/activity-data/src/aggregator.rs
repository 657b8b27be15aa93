//! Folding message records into the per-participant activity tables.

use std::io::BufRead;
use std::path::Path;

use activity_core::error::Result;
use activity_core::models::ChatAggregates;

use crate::reader::{scan_messages, ScanStats};

// ── RankEntry ─────────────────────────────────────────────────────────────────

/// One row of the participant ranking.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankEntry {
    pub name: String,
    pub messages: u64,
    /// Share of all messages, in percent.
    pub share: f64,
}

// ── ActivityAggregator ────────────────────────────────────────────────────────

/// Stateless helper that builds [`ChatAggregates`] from message records.
pub struct ActivityAggregator;

impl ActivityAggregator {
    /// Scan `reader` and aggregate in the same pass, without keeping the
    /// individual records around.
    pub fn aggregate_reader<R: BufRead>(
        reader: R,
        source: &Path,
    ) -> Result<(ChatAggregates, ScanStats)> {
        let mut aggregates = ChatAggregates::new();
        let stats = scan_messages(reader, source, |record| aggregates.record(&record))?;
        Ok((aggregates, stats))
    }

    /// Participants by descending message count (stable on ties) with their
    /// share of the total.
    pub fn ranking(aggregates: &ChatAggregates) -> Vec<RankEntry> {
        let total = aggregates.total_messages();
        aggregates
            .ranked()
            .into_iter()
            .map(|p| RankEntry {
                name: p.name.clone(),
                messages: p.messages,
                share: if total == 0 {
                    0.0
                } else {
                    p.messages as f64 * 100.0 / total as f64
                },
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
