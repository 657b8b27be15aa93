//! Chart-ready rows derived from the aggregates.

use activity_core::models::{ChatAggregates, HOURS_PER_DAY, MONTHS_PER_YEAR};
use activity_core::time_utils::month_label;
use plotters::style::RGBColor;

use crate::palette::color_for;

/// One participant as drawn on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSeries {
    pub name: String,
    pub messages: u64,
    pub hourly: [u64; HOURS_PER_DAY],
    /// Twelve slots per year of [`ReportSeries::years`], zero-filled.
    pub monthly: Vec<u64>,
    pub color: RGBColor,
}

/// Everything the three pages need, in ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSeries {
    pub participants: Vec<ParticipantSeries>,
    /// Years present in the data, ascending.
    pub years: Vec<i32>,
    /// One label per month slot.
    pub month_labels: Vec<String>,
}

impl ReportSeries {
    pub fn from_aggregates(aggregates: &ChatAggregates) -> Self {
        let years = aggregates.years();
        let participants = aggregates
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(rank, p)| ParticipantSeries {
                name: p.name.clone(),
                messages: p.messages,
                hourly: p.hourly.counts(),
                monthly: p.monthly.zero_filled(&years),
                color: color_for(rank),
            })
            .collect();
        let month_labels = years
            .iter()
            .flat_map(|&year| (0..MONTHS_PER_YEAR).map(move |m| month_label(year, m)))
            .collect();

        Self {
            participants,
            years,
            month_labels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn month_slots(&self) -> usize {
        self.month_labels.len()
    }

    pub fn max_messages(&self) -> u64 {
        self.participants.iter().map(|p| p.messages).max().unwrap_or(0)
    }

    pub fn max_hourly(&self) -> u64 {
        self.participants
            .iter()
            .flat_map(|p| p.hourly.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn max_monthly(&self) -> u64 {
        self.participants
            .iter()
            .flat_map(|p| p.monthly.iter().copied())
            .max()
            .unwrap_or(0)
    }
}
