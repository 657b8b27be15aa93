//! Line-oriented reader for exported chat logs.
//!
//! An export line looks like `31/12/22, 23:59 - Alice: happy new year`.
//! Anything else (system notices, continuation lines of multi-line messages,
//! other export formats) is skipped without an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use activity_core::error::{ActivityError, Result};
use activity_core::models::MessageRecord;
use activity_core::time_utils::parse_export_timestamp;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// `<d>/<m>/<yy>, <h>:<mm> - <participant>:` anchored at the line start.
///
/// The participant is the shortest run up to the first colon, so names that
/// contain a colon are cut short.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+/\d+/\d+), (\d+:\d+) - (.*?):").expect("line pattern is a valid regex")
    })
}

// ── Line classification ───────────────────────────────────────────────────────

/// What a single export line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A chat message.
    Message(MessageRecord),
    /// The line has the message shape but its date or time is not real
    /// (`31/02/23`, `25:00`, a four-digit year).
    InvalidTimestamp,
    /// Not a message line.
    NoMatch,
}

/// Classify one line (without its trailing newline).
pub fn classify_line(line: &str) -> LineOutcome {
    let Some(caps) = line_pattern().captures(line) else {
        return LineOutcome::NoMatch;
    };

    let (date, time, participant) = (&caps[1], &caps[2], &caps[3]);
    match parse_export_timestamp(date, time) {
        Some(timestamp) => LineOutcome::Message(MessageRecord {
            timestamp,
            participant: participant.to_string(),
        }),
        None => LineOutcome::InvalidTimestamp,
    }
}

// ── Scanning ──────────────────────────────────────────────────────────────────

/// Counters collected while scanning an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub lines_read: u64,
    pub messages_matched: u64,
    /// Lines that did not look like a message at all.
    pub lines_skipped: u64,
    /// Message-shaped lines dropped because of an impossible date or time.
    pub invalid_timestamps: u64,
}

/// Open the export at `path` for buffered line reading.
pub fn open_export(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| ActivityError::from_input_io(path, e))?;
    Ok(BufReader::new(file))
}

/// Read every line of `reader` and hand each message to `on_message`.
///
/// `source` is only used for error messages. A read or UTF-8 decoding
/// failure aborts the scan with [`ActivityError::InputRead`]. A byte-order
/// mark at the start of the first line is ignored.
pub fn scan_messages<R, F>(reader: R, source: &Path, mut on_message: F) -> Result<ScanStats>
where
    R: BufRead,
    F: FnMut(MessageRecord),
{
    let mut stats = ScanStats::default();

    for line_result in reader.lines() {
        let line = line_result.map_err(|source_err| ActivityError::InputRead {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let text = if stats.lines_read == 0 {
            line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&line)
        } else {
            line.as_str()
        };
        stats.lines_read += 1;

        match classify_line(text) {
            LineOutcome::Message(record) => {
                stats.messages_matched += 1;
                on_message(record);
            }
            LineOutcome::InvalidTimestamp => stats.invalid_timestamps += 1,
            LineOutcome::NoMatch => stats.lines_skipped += 1,
        }
    }

    debug!(
        "Scanned {}: {} lines, {} messages, {} skipped, {} invalid timestamps",
        source.display(),
        stats.lines_read,
        stats.messages_matched,
        stats.lines_skipped,
        stats.invalid_timestamps,
    );

    Ok(stats)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn message(line: &str) -> Option<MessageRecord> {
        match classify_line(line) {
            LineOutcome::Message(record) => Some(record),
            _ => None,
        }
    }

    fn scan_str(content: &str) -> (Vec<MessageRecord>, ScanStats) {
        let mut records = Vec::new();
        let stats = scan_messages(Cursor::new(content), Path::new("<memory>"), |r| {
            records.push(r)
        })
        .unwrap();
        (records, stats)
    }

    // ── classify_line ─────────────────────────────────────────────────────────

    #[test]
    fn test_classify_line_message_basic() {
        let record = message("01/01/23, 09:05 - Bob: hello").unwrap();
        assert_eq!(record.participant, "Bob");
        assert_eq!(record.timestamp.year(), 2023);
        assert_eq!(record.timestamp.hour(), 9);
        assert_eq!(record.timestamp.minute(), 5);
    }

    #[test]
    fn test_classify_line_message_keeps_participant_verbatim() {
        let record = message("01/01/23, 09:05 - +34 600 11 22 33 : hi").unwrap();
        assert_eq!(record.participant, "+34 600 11 22 33 ");

        let record = message("01/01/23, 09:05 - María José 🌻: hola").unwrap();
        assert_eq!(record.participant, "María José 🌻");
    }

    #[test]
    fn test_classify_line_message_stops_at_first_colon() {
        let record = message("01/01/23, 09:05 - Dr: Who: exterminate").unwrap();
        assert_eq!(record.participant, "Dr");
    }

    #[test]
    fn test_classify_line_message_empty_body() {
        let record = message("01/01/23, 09:05 - Alice:").unwrap();
        assert_eq!(record.participant, "Alice");
    }

    #[test]
    fn test_classify_line_not_a_message() {
        assert_eq!(classify_line("not a valid chat line"), LineOutcome::NoMatch);
        assert_eq!(classify_line(""), LineOutcome::NoMatch);
        // System notices carry no "<name>:" part.
        assert_eq!(
            classify_line("01/01/23, 09:00 - Alice created group \"Friends\""),
            LineOutcome::NoMatch
        );
        // The pattern is anchored at the start of the line.
        assert_eq!(
            classify_line("quoted 01/01/23, 09:00 - Alice: hi"),
            LineOutcome::NoMatch
        );
    }

    #[test]
    fn test_classify_line_invalid_timestamp() {
        assert_eq!(
            classify_line("31/02/23, 09:00 - Alice: hi"),
            LineOutcome::InvalidTimestamp
        );
        assert_eq!(
            classify_line("01/01/2023, 09:00 - Alice: hi"),
            LineOutcome::InvalidTimestamp
        );
        assert_eq!(
            classify_line("01/01/23, 25:00 - Alice: hi"),
            LineOutcome::InvalidTimestamp
        );
        assert_eq!(
            classify_line("01/01/3, 09:00 - Alice: hi"),
            LineOutcome::InvalidTimestamp
        );
    }

    // ── scan_messages ─────────────────────────────────────────────────────────

    #[test]
    fn test_scan_counts_every_line() {
        let content = "01/01/23, 09:00 - Alice: hi\n\
                       continuation of the previous message\n\
                       01/01/23, 09:05 - Bob: hello\n\
                       31/02/23, 09:05 - Bob: impossible\n";
        let (records, stats) = scan_str(content);
        assert_eq!(records.len(), 2);
        assert_eq!(
            stats,
            ScanStats {
                lines_read: 4,
                messages_matched: 2,
                lines_skipped: 1,
                invalid_timestamps: 1,
            }
        );
    }

    #[test]
    fn test_scan_handles_crlf_and_bom() {
        let content = "\u{feff}01/01/23, 09:00 - Alice: hi\r\n01/01/23, 09:05 - Bob: hey\r\n";
        let (records, _) = scan_str(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].participant, "Alice");
    }

    #[test]
    fn test_scan_bom_only_stripped_on_first_line() {
        let content = "01/01/23, 09:00 - Alice: hi\n\u{feff}01/01/23, 09:05 - Bob: hey\n";
        let (records, stats) = scan_str(content);
        assert_eq!(records.len(), 1);
        assert_eq!(stats.lines_skipped, 1);
    }

    #[test]
    fn test_scan_empty_input() {
        let (records, stats) = scan_str("");
        assert!(records.is_empty());
        assert_eq!(stats, ScanStats::default());
    }

    #[test]
    fn test_scan_rejects_invalid_utf8() {
        let bytes: &[u8] = b"01/01/23, 09:00 - Alice: hi\n\xff\xfe broken\n";
        let result = scan_messages(Cursor::new(bytes), Path::new("latin1.txt"), |_| {});
        assert!(matches!(result, Err(ActivityError::InputRead { .. })));
    }

    // ── open_export ───────────────────────────────────────────────────────────

    #[test]
    fn test_open_export_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("Chat.txt");
        let err = open_export(&missing).unwrap_err();
        assert!(matches!(err, ActivityError::InputNotFound(p) if p == missing));
    }
}
