use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Number of hour slots in [`HourlyActivity`].
pub const HOURS_PER_DAY: usize = 24;

/// Number of month slots per year in [`MonthlyActivity`].
pub const MONTHS_PER_YEAR: usize = 12;

/// One chat message extracted from a matched export line.
///
/// The participant is kept verbatim: names that the export spells differently
/// on different lines (extra spaces, emoji, phone number vs. contact name) are
/// distinct participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Local time printed by the export, minute precision.
    pub timestamp: NaiveDateTime,
    /// Sender exactly as it appears between `" - "` and the first `':'`.
    pub participant: String,
}

// ── HourlyActivity ────────────────────────────────────────────────────────────

/// Message counts per hour of the day (0–23).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyActivity {
    counts: [u64; HOURS_PER_DAY],
}

impl HourlyActivity {
    /// Count one message sent during `hour`. Hours outside 0–23 are ignored.
    pub fn record(&mut self, hour: u32) {
        if let Some(slot) = self.counts.get_mut(hour as usize) {
            *slot += 1;
        }
    }

    /// Messages sent during `hour`; `0` for hours without activity or out of
    /// range.
    pub fn count_at(&self, hour: usize) -> u64 {
        self.counts.get(hour).copied().unwrap_or(0)
    }

    /// All 24 slots, zero-filled.
    pub fn counts(&self) -> [u64; HOURS_PER_DAY] {
        self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

// ── MonthlyActivity ───────────────────────────────────────────────────────────

/// Message counts per calendar year and zero-based month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyActivity {
    years: BTreeMap<i32, [u64; MONTHS_PER_YEAR]>,
}

impl MonthlyActivity {
    /// Count one message sent in `month0` (0 = January) of `year`.
    pub fn record(&mut self, year: i32, month0: usize) {
        if month0 >= MONTHS_PER_YEAR {
            return;
        }
        self.years.entry(year).or_insert([0; MONTHS_PER_YEAR])[month0] += 1;
    }

    /// Messages sent in `month0` of `year`; `0` when there was no activity.
    ///
    /// Reading never creates entries.
    pub fn count_at(&self, year: i32, month0: usize) -> u64 {
        self.years
            .get(&year)
            .and_then(|months| months.get(month0))
            .copied()
            .unwrap_or(0)
    }

    /// Years with at least one message, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Twelve slots for each of `years`, in the given order, zero-filled.
    pub fn zero_filled(&self, years: &[i32]) -> Vec<u64> {
        years
            .iter()
            .flat_map(|&year| (0..MONTHS_PER_YEAR).map(move |m| self.count_at(year, m)))
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.years.values().flat_map(|months| months.iter()).sum()
    }
}

// ── DailyActivity ─────────────────────────────────────────────────────────────

/// Message counts per calendar date, across all participants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    days: BTreeMap<NaiveDate, u64>,
}

impl DailyActivity {
    pub fn record(&mut self, date: NaiveDate) {
        *self.days.entry(date).or_insert(0) += 1;
    }

    pub fn count_on(&self, date: NaiveDate) -> u64 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    /// Number of distinct dates with at least one message.
    pub fn active_days(&self) -> usize {
        self.days.len()
    }

    /// First and last active date.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = *self.days.keys().next()?;
        let last = *self.days.keys().next_back()?;
        Some((first, last))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.days.iter().map(|(d, c)| (*d, *c))
    }
}

// ── ParticipantActivity ───────────────────────────────────────────────────────

/// Everything recorded for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantActivity {
    pub name: String,
    /// Total messages sent.
    pub messages: u64,
    pub hourly: HourlyActivity,
    pub monthly: MonthlyActivity,
}

impl ParticipantActivity {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: 0,
            hourly: HourlyActivity::default(),
            monthly: MonthlyActivity::default(),
        }
    }

    fn record(&mut self, timestamp: &NaiveDateTime) {
        self.messages += 1;
        self.hourly.record(timestamp.hour());
        self.monthly
            .record(timestamp.year(), timestamp.month0() as usize);
    }
}

// ── ChatAggregates ────────────────────────────────────────────────────────────

/// The aggregate tables built from one pass over a chat export.
///
/// Participants are stored in first-appearance order, which is the tie-break
/// order used by [`ChatAggregates::ranked`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatAggregates {
    participants: Vec<ParticipantActivity>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    daily: DailyActivity,
}

impl ChatAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one message into every table.
    pub fn record(&mut self, record: &MessageRecord) {
        let slot = match self.index.get(&record.participant) {
            Some(&i) => i,
            None => {
                let i = self.participants.len();
                self.participants
                    .push(ParticipantActivity::new(record.participant.clone()));
                self.index.insert(record.participant.clone(), i);
                i
            }
        };
        self.participants[slot].record(&record.timestamp);
        self.daily.record(record.timestamp.date());
    }

    /// Participants in the order they first appeared in the export.
    pub fn participants(&self) -> &[ParticipantActivity] {
        &self.participants
    }

    pub fn participant(&self, name: &str) -> Option<&ParticipantActivity> {
        self.index.get(name).map(|&i| &self.participants[i])
    }

    /// Total messages for `name`; `0` for unknown participants.
    pub fn message_count(&self, name: &str) -> u64 {
        self.participant(name).map(|p| p.messages).unwrap_or(0)
    }

    pub fn daily(&self) -> &DailyActivity {
        &self.daily
    }

    pub fn total_messages(&self) -> u64 {
        self.participants.iter().map(|p| p.messages).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participants by descending message count. The sort is stable, so equal
    /// counts keep first-appearance order.
    pub fn ranked(&self) -> Vec<&ParticipantActivity> {
        let mut ranked: Vec<&ParticipantActivity> = self.participants.iter().collect();
        ranked.sort_by(|a, b| b.messages.cmp(&a.messages));
        ranked
    }

    /// Every year in which any participant sent a message, ascending.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .participants
            .iter()
            .flat_map(|p| p.monthly.years())
            .collect();
        years.into_iter().collect()
    }
}
