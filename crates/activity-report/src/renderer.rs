//! Three-page activity report.

use std::path::{Path, PathBuf};

use activity_core::error::{ActivityError, Result};
use activity_core::models::ChatAggregates;
use activity_core::settings::PageSize;
use tracing::{debug, info};

use crate::document::ReportDocument;
use crate::pages::{draw_hourly_page, draw_messages_page, draw_monthly_page, PageResult};
use crate::series::ReportSeries;

pub const REPORT_TITLE: &str = "Actividad del chat";

/// Pages of the report, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPage {
    Messages,
    Hourly,
    Monthly,
}

impl ReportPage {
    pub const ALL: [ReportPage; 3] = [ReportPage::Messages, ReportPage::Hourly, ReportPage::Monthly];

    pub fn name(self) -> &'static str {
        match self {
            ReportPage::Messages => "messages per participant",
            ReportPage::Hourly => "hour of day",
            ReportPage::Monthly => "month by month",
        }
    }

    fn draw(self, series: &ReportSeries, page_size: PageSize) -> PageResult {
        match self {
            ReportPage::Messages => draw_messages_page(series, page_size),
            ReportPage::Hourly => draw_hourly_page(series, page_size),
            ReportPage::Monthly => draw_monthly_page(series, page_size),
        }
    }
}

/// What a successful render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub pages: usize,
}

/// Draws the report for a set of aggregates.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    page_size: PageSize,
}

impl ReportRenderer {
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }

    /// Render every page and write the PDF to `output`.
    ///
    /// If any page fails, or the file cannot be written, nothing is left at
    /// `output` and a previous file there is untouched.
    pub fn render(&self, aggregates: &ChatAggregates, output: &Path) -> Result<RenderedReport> {
        let series = ReportSeries::from_aggregates(aggregates);
        if series.is_empty() {
            return Err(ActivityError::Render {
                page: ReportPage::Messages.name(),
                message: "there are no participants to chart".to_string(),
            });
        }

        let mut document = ReportDocument::new(self.page_size, REPORT_TITLE);
        for page in ReportPage::ALL {
            let canvas = page
                .draw(&series, self.page_size)
                .map_err(|e| ActivityError::Render {
                    page: page.name(),
                    message: e.to_string(),
                })?;
            document.add_page(canvas)?;
            debug!("Rendered page '{}'", page.name());
        }

        let pages = document.page_count();
        document.finalize(output)?;
        info!(
            "Report with {} pages for {} participants written to {}",
            pages,
            series.participants.len(),
            output.display()
        );

        Ok(RenderedReport {
            path: output.to_path_buf(),
            pages,
        })
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}
