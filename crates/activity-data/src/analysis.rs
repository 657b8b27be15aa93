//! Main analysis pipeline for the chat activity report.
//!
//! Opens the export, aggregates it in a single pass and refuses to hand an
//! empty result to the renderer.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use activity_core::error::{ActivityError, Result};
use activity_core::models::ChatAggregates;
use activity_core::output::write_atomically;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::{ActivityAggregator, RankEntry};
use crate::reader::{open_export, ScanStats};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// The export that was analysed.
    pub source: PathBuf,
    /// Line counters from the scan.
    pub scan: ScanStats,
    /// Number of distinct participants.
    pub participants: usize,
    /// Calendar years with at least one message, ascending.
    pub years: Vec<i32>,
    /// First and last day with a message, ISO-8601.
    pub first_day: Option<String>,
    pub last_day: Option<String>,
    /// Distinct days with at least one message.
    pub active_days: usize,
    /// Wall-clock seconds spent reading and aggregating.
    #[serde(skip)]
    pub load_time_seconds: f64,
}

/// The complete output of [`analyze_chat`].
#[derive(Debug, Clone)]
pub struct ChatAnalysis {
    pub aggregates: ChatAggregates,
    pub metadata: AnalysisMetadata,
}

/// Serializable view written by `--summary-json`.
#[derive(Debug, Serialize)]
pub struct ChatSummary<'a> {
    pub metadata: &'a AnalysisMetadata,
    pub total_messages: u64,
    pub ranking: Vec<RankEntry>,
    /// Messages per day across all participants.
    pub daily: BTreeMap<String, u64>,
    pub aggregates: &'a ChatAggregates,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the parse-and-aggregate stage on the export at `path`.
///
/// Fails with [`ActivityError::InputNotFound`] / [`ActivityError::InputRead`]
/// when the file cannot be read and with [`ActivityError::NoMatchingMessages`]
/// when not a single line is a chat message.
pub fn analyze_chat(path: &Path) -> Result<ChatAnalysis> {
    let reader = open_export(path)?;
    analyze_reader(reader, path)
}

/// Same as [`analyze_chat`] for an already-open reader.
pub fn analyze_reader<R: BufRead>(reader: R, source: &Path) -> Result<ChatAnalysis> {
    let start = std::time::Instant::now();
    let (aggregates, scan) = ActivityAggregator::aggregate_reader(reader, source)?;
    let load_time = start.elapsed().as_secs_f64();

    if aggregates.is_empty() {
        return Err(ActivityError::NoMatchingMessages(source.to_path_buf()));
    }

    let span = aggregates.daily().span();
    let metadata = AnalysisMetadata {
        source: source.to_path_buf(),
        scan,
        participants: aggregates.participants().len(),
        years: aggregates.years(),
        first_day: span.map(|(first, _)| first.to_string()),
        last_day: span.map(|(_, last)| last.to_string()),
        active_days: aggregates.daily().active_days(),
        load_time_seconds: load_time,
    };

    info!(
        "Parsed {} messages from {} participants ({} of {} lines matched) in {:.3}s",
        aggregates.total_messages(),
        metadata.participants,
        scan.messages_matched,
        scan.lines_read,
        load_time,
    );
    if scan.invalid_timestamps > 0 {
        debug!(
            "Dropped {} message lines with impossible dates or times",
            scan.invalid_timestamps
        );
    }

    Ok(ChatAnalysis {
        aggregates,
        metadata,
    })
}

impl ChatAnalysis {
    pub fn summary(&self) -> ChatSummary<'_> {
        ChatSummary {
            metadata: &self.metadata,
            total_messages: self.aggregates.total_messages(),
            ranking: ActivityAggregator::ranking(&self.aggregates),
            daily: self
                .aggregates
                .daily()
                .iter()
                .map(|(day, count)| (day.to_string(), count))
                .collect(),
            aggregates: &self.aggregates,
        }
    }

    /// Write [`summary`](Self::summary) as pretty-printed JSON, atomically.
    pub fn write_summary(&self, path: &Path) -> Result<()> {
        let summary = self.summary();
        write_atomically(path, |w| {
            serde_json::to_writer_pretty(&mut *w, &summary)?;
            w.write_all(b"\n").map_err(|source| ActivityError::OutputWrite {
                path: path.to_path_buf(),
                source,
            })
        })?;
        info!("Summary written to {}", path.display());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    const TWO_YEARS: &str = "15/11/22, 21:00 - Alice: late\n\
                             02/01/23, 08:30 - Bob: early\n\
                             03/01/23, 08:45 - Alice: again\n";

    fn analyze_str(content: &str) -> Result<ChatAnalysis> {
        analyze_reader(Cursor::new(content), Path::new("Chat.txt"))
    }

    #[test]
    fn test_analyze_metadata() {
        let analysis = analyze_str(TWO_YEARS).unwrap();
        let meta = &analysis.metadata;
        assert_eq!(meta.participants, 2);
        assert_eq!(meta.years, vec![2022, 2023]);
        assert_eq!(meta.first_day.as_deref(), Some("2022-11-15"));
        assert_eq!(meta.last_day.as_deref(), Some("2023-01-03"));
        assert_eq!(meta.active_days, 3);
        assert_eq!(meta.scan.messages_matched, 3);
    }

    #[test]
    fn test_analyze_empty_input_is_no_matching_messages() {
        let err = analyze_str("").unwrap_err();
        assert!(matches!(err, ActivityError::NoMatchingMessages(p) if p == Path::new("Chat.txt")));
    }

    #[test]
    fn test_analyze_only_noise_is_no_matching_messages() {
        let err = analyze_str("not a valid chat line\nanother one\n").unwrap_err();
        assert!(matches!(err, ActivityError::NoMatchingMessages(_)));
    }

    #[test]
    fn test_analyze_chat_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let err = analyze_chat(&tmp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, ActivityError::InputNotFound(_)));
    }

    #[test]
    fn test_analyze_chat_from_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("Chat.txt");
        std::fs::write(&path, TWO_YEARS).unwrap();

        let analysis = analyze_chat(&path).unwrap();
        assert_eq!(analysis.aggregates.total_messages(), 3);
        assert_eq!(analysis.metadata.source, path);
    }

    #[test]
    fn test_summary_json_shape() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("summary.json");
        let analysis = analyze_str(TWO_YEARS).unwrap();

        analysis.write_summary(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["total_messages"], 3);
        assert_eq!(json["ranking"][0]["name"], "Alice");
        assert_eq!(json["ranking"][0]["messages"], 2);
        assert_eq!(json["daily"]["2023-01-02"], 1);
        assert_eq!(json["metadata"]["scan"]["lines_read"], 3);
        assert_eq!(json["metadata"]["active_days"], 3);
        assert!(json["metadata"].get("load_time_seconds").is_none());
        assert_eq!(json["aggregates"]["participants"][1]["name"], "Bob");
    }

    #[test]
    fn test_summary_is_deterministic() {
        let first = analyze_str(TWO_YEARS).unwrap();
        let second = analyze_str(TWO_YEARS).unwrap();
        assert_eq!(
            serde_json::to_string(&first.summary()).unwrap(),
            serde_json::to_string(&second.summary()).unwrap()
        );
    }
}
