//! The three report pages.
//!
//! Each page gets its own canvas and its own plotting context, which is
//! dropped before the page is handed back. Category labels that plotters
//! cannot rotate freely are written onto the canvas afterwards.

use std::convert::Infallible;

use activity_core::models::HOURS_PER_DAY;
use activity_core::settings::PageSize;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, DrawingAreaErrorKind};
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use plotters_backend::text_anchor::{HPos, Pos, VPos};

use crate::canvas::{text_width, HAlign, PageCanvas, PdfBackend, Rgb, VAlign};
use crate::palette::{BAR_COLOR, INK};
use crate::series::{ParticipantSeries, ReportSeries};

pub const MESSAGES_TITLE: &str = "Mensajes por participante";
pub const MESSAGES_X_DESC: &str = "Participante";
pub const MESSAGES_Y_DESC: &str = "Numero total de mensajes";

pub const HOURLY_TITLE: &str = "Comparacion de horas activas en todos los participantes";
pub const HOURLY_X_DESC: &str = "Hora del dia";

pub const MONTHLY_TITLE: &str = "Comparacion a lo largo de los meses";
pub const MONTHLY_X_DESC: &str = "Año y mes";

pub const ACTIVITY_Y_DESC: &str = "Numero de mensajes";

const TITLE_SIZE: f64 = 16.0;
const AXIS_DESC_SIZE: f64 = 11.0;
const TICK_LABEL_SIZE: f64 = 9.0;
const MIN_TICK_LABEL_SIZE: f64 = 4.0;
const LEGEND_TEXT_SIZE: f64 = 9.0;

const PAGE_MARGIN: i32 = 24;
const Y_LABEL_AREA: i32 = 64;
const TICK_PAD: f64 = 6.0;
/// Room below rotated labels for the axis description.
const DESC_ROOM: f64 = 28.0;
/// Category labels may use at most this share of the page height.
const MAX_LABEL_SHARE: f64 = 0.3;

const BAR_GAP: u32 = 4;
const LINE_WIDTH: u32 = 2;

const LEGEND_WIDTH: u32 = 170;
const LEGEND_TOP: i32 = 56;
const LEGEND_ROW: i32 = 16;
const LEGEND_MIN_ROW: i32 = 4;
const LEGEND_SWATCH: i32 = 22;
const LEGEND_INSET: i32 = 8;
/// The legend may take at most this share of the page width.
const LEGEND_MAX_SHARE: f64 = 0.45;

pub type PageResult = Result<PageCanvas, DrawingAreaErrorKind<Infallible>>;

fn text_style(size: f64) -> TextStyle<'static> {
    TextStyle::from(FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal))
}

fn ink() -> Rgb {
    (INK.0, INK.1, INK.2)
}

/// Upper end of a count axis with some headroom above the tallest value.
fn axis_ceiling(max: u64) -> u64 {
    max + max / 10 + 1
}

/// Cut `text` to `max_width` points, marking the cut with an ellipsis.
fn fit_label(text: &str, max_width: f64, size: f64) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }
    let ellipsis = text_width("…", size);
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if text_width(&out, size) + ellipsis > max_width {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

/// Longest label run allowed for labels rotated by `angle` degrees.
fn max_label_extent(size: PageSize, angle: f64) -> f64 {
    size.height as f64 * MAX_LABEL_SHARE / angle.to_radians().sin()
}

/// Height of the x label area needed by `labels` rotated by `angle` degrees.
fn label_area_height<'a, I>(labels: I, page: PageSize, angle: f64) -> i32
where
    I: IntoIterator<Item = &'a str>,
{
    let limit = max_label_extent(page, angle);
    let longest = labels
        .into_iter()
        .map(|l| text_width(l, TICK_LABEL_SIZE).min(limit))
        .fold(0.0, f64::max);
    let (sin, cos) = angle.to_radians().sin_cos();
    (longest * sin + TICK_LABEL_SIZE * cos + TICK_PAD + DESC_ROOM).ceil() as i32
}

/// Distance between neighbouring tick positions, or `None` with fewer than two.
fn tick_pitch(ticks: &[(i32, i32)]) -> Option<f64> {
    match ticks {
        [a, b, ..] => Some((b.0 - a.0).abs() as f64),
        _ => None,
    }
}

/// Write rotated category labels whose right end sits just below each tick.
fn draw_category_labels(
    canvas: &mut PageCanvas,
    ticks: &[(i32, i32)],
    labels: &[String],
    size: f64,
    angle: f64,
    stride: usize,
    limit: f64,
) {
    for (i, (tick, label)) in ticks.iter().zip(labels).enumerate() {
        if i % stride != 0 {
            continue;
        }
        let text = fit_label(label, limit, size);
        canvas.text(
            &text,
            (tick.0 as f64, tick.1 as f64 + TICK_PAD),
            size,
            ink(),
            angle,
            HAlign::Right,
            VAlign::Center,
        );
    }
}

/// Placement of the legend entries to the right of the plot. Entries fill
/// one column top to bottom, then continue in the next column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LegendLayout {
    entries: usize,
    columns: usize,
    rows_per_column: usize,
    row: i32,
    width: u32,
}

impl LegendLayout {
    fn new(entries: usize, page: PageSize) -> Self {
        let entries = entries.max(1);
        let available = (page.height as i32 - LEGEND_TOP - PAGE_MARGIN).max(LEGEND_MIN_ROW);
        let row = (available / entries as i32).clamp(LEGEND_MIN_ROW, LEGEND_ROW);
        let rows_per_column = ((available / row) as usize).max(1);
        let columns = entries.div_ceil(rows_per_column);
        let max_width = (page.width as f64 * LEGEND_MAX_SHARE) as u32;
        let width = (LEGEND_WIDTH * columns as u32).min(max_width.max(LEGEND_WIDTH));

        Self {
            entries,
            columns,
            rows_per_column,
            row,
            width,
        }
    }

    fn column_width(&self) -> i32 {
        self.width as i32 / self.columns as i32
    }

    /// Left edge of the column and vertical centre of the row for entry `i`,
    /// relative to the legend area.
    fn entry(&self, i: usize) -> (i32, i32) {
        let column = (i / self.rows_per_column) as i32;
        let row = (i % self.rows_per_column) as i32;
        (
            column * self.column_width(),
            LEGEND_TOP + row * self.row + self.row / 2,
        )
    }

    fn text_size(&self) -> f64 {
        (self.row as f64 * 0.8).min(LEGEND_TEXT_SIZE)
    }
}

fn draw_legend(
    area: &DrawingArea<PdfBackend<'_>, Shift>,
    layout: &LegendLayout,
    participants: &[ParticipantSeries],
) -> Result<(), DrawingAreaErrorKind<Infallible>> {
    let (width, _) = area.dim_in_pixel();
    let size = layout.text_size();
    let style = text_style(size).pos(Pos::new(HPos::Left, VPos::Center));

    let column_width = layout.column_width();
    let swatch = LEGEND_SWATCH.min(column_width / 4);
    let text_dx = LEGEND_INSET + swatch + 4;
    let text_room = (column_width - text_dx - LEGEND_INSET / 2).max(0) as f64;

    for (i, p) in participants.iter().enumerate() {
        let (x, y) = layout.entry(i);
        area.draw(&PathElement::new(
            vec![(x + LEGEND_INSET, y), (x + LEGEND_INSET + swatch, y)],
            p.color.stroke_width(LINE_WIDTH),
        ))?;
        area.draw(&Text::new(
            fit_label(&p.name, text_room, size),
            (x + text_dx, y),
            style.clone(),
        ))?;
    }

    let rows_shown = layout.entries.min(layout.rows_per_column) as i32;
    area.draw(&Rectangle::new(
        [
            (LEGEND_INSET / 2, LEGEND_TOP - 4),
            (
                width as i32 - LEGEND_INSET / 2,
                LEGEND_TOP + rows_shown * layout.row + 4,
            ),
        ],
        INK.mix(0.4).stroke_width(1),
    ))?;
    Ok(())
}

// ── Page 1: messages per participant ─────────────────────────────────────────

/// Vertical bars of total messages per participant, tallest first, with the
/// names written vertically under the bars.
pub fn draw_messages_page(series: &ReportSeries, page: PageSize) -> PageResult {
    const ANGLE: f64 = 90.0;
    let mut canvas = PageCanvas::new(page.width, page.height);
    let count = series.participants.len() as u32;
    let names: Vec<String> = series.participants.iter().map(|p| p.name.clone()).collect();
    let label_area = label_area_height(names.iter().map(String::as_str), page, ANGLE);

    let ticks = {
        let root = PdfBackend::new(&mut canvas).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(MESSAGES_TITLE, text_style(TITLE_SIZE))
            .margin(PAGE_MARGIN)
            .x_label_area_size(label_area)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(
                (0u32..count).into_segmented(),
                0u64..axis_ceiling(series.max_messages()),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(count as usize)
            .x_label_formatter(&|_| String::new())
            .x_desc(MESSAGES_X_DESC)
            .y_desc(MESSAGES_Y_DESC)
            .axis_desc_style(text_style(AXIS_DESC_SIZE))
            .label_style(text_style(TICK_LABEL_SIZE))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(BAR_GAP)
                .data(
                    series
                        .participants
                        .iter()
                        .enumerate()
                        .map(|(i, p)| (i as u32, p.messages)),
                ),
        )?;

        let ticks: Vec<(i32, i32)> = (0..count)
            .map(|i| chart.backend_coord(&(SegmentValue::CenterOf(i), 0)))
            .collect();
        ticks
    };

    // Shrink the names rather than drop any when the bars are narrow.
    let size = tick_pitch(&ticks)
        .map(|pitch| (pitch / 1.2).clamp(MIN_TICK_LABEL_SIZE, TICK_LABEL_SIZE))
        .unwrap_or(TICK_LABEL_SIZE);
    draw_category_labels(
        &mut canvas,
        &ticks,
        &names,
        size,
        ANGLE,
        1,
        max_label_extent(page, ANGLE),
    );
    Ok(canvas)
}

// ── Page 2: hour of day ──────────────────────────────────────────────────────

/// One line per participant over the 24 hours of the day.
pub fn draw_hourly_page(series: &ReportSeries, page: PageSize) -> PageResult {
    let mut canvas = PageCanvas::new(page.width, page.height);
    let legend_layout = LegendLayout::new(series.participants.len(), page);
    {
        let root = PdfBackend::new(&mut canvas).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot, legend) =
            root.split_horizontally(page.width.saturating_sub(legend_layout.width) as i32);

        let mut chart = ChartBuilder::on(&plot)
            .caption(HOURLY_TITLE, text_style(TITLE_SIZE))
            .margin(PAGE_MARGIN)
            .x_label_area_size(40)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(
                0u32..(HOURS_PER_DAY as u32 - 1),
                0u64..axis_ceiling(series.max_hourly()),
            )?;

        chart
            .configure_mesh()
            .x_labels(HOURS_PER_DAY)
            .x_desc(HOURLY_X_DESC)
            .y_desc(ACTIVITY_Y_DESC)
            .axis_desc_style(text_style(AXIS_DESC_SIZE))
            .label_style(text_style(TICK_LABEL_SIZE))
            .draw()?;

        for p in &series.participants {
            chart.draw_series(LineSeries::new(
                p.hourly
                    .iter()
                    .enumerate()
                    .map(|(hour, &n)| (hour as u32, n)),
                p.color.stroke_width(LINE_WIDTH),
            ))?;
        }

        draw_legend(&legend, &legend_layout, &series.participants)?;
    }
    Ok(canvas)
}

// ── Page 3: month by month ───────────────────────────────────────────────────

/// One line per participant over every month of every year with messages,
/// labelled at 45 degrees.
pub fn draw_monthly_page(series: &ReportSeries, page: PageSize) -> PageResult {
    const ANGLE: f64 = 45.0;
    let mut canvas = PageCanvas::new(page.width, page.height);
    let slots = series.month_slots().max(1) as u32;
    let legend_layout = LegendLayout::new(series.participants.len(), page);
    let label_area = label_area_height(
        series.month_labels.iter().map(String::as_str),
        page,
        ANGLE,
    );

    let ticks = {
        let root = PdfBackend::new(&mut canvas).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot, legend) =
            root.split_horizontally(page.width.saturating_sub(legend_layout.width) as i32);

        let mut chart = ChartBuilder::on(&plot)
            .caption(MONTHLY_TITLE, text_style(TITLE_SIZE))
            .margin(PAGE_MARGIN)
            .x_label_area_size(label_area)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(0u32..(slots - 1), 0u64..axis_ceiling(series.max_monthly()))?;

        chart
            .configure_mesh()
            .x_labels(slots as usize)
            .x_label_formatter(&|_| String::new())
            .x_desc(MONTHLY_X_DESC)
            .y_desc(ACTIVITY_Y_DESC)
            .axis_desc_style(text_style(AXIS_DESC_SIZE))
            .label_style(text_style(TICK_LABEL_SIZE))
            .draw()?;

        for p in &series.participants {
            chart.draw_series(LineSeries::new(
                p.monthly
                    .iter()
                    .enumerate()
                    .map(|(slot, &n)| (slot as u32, n)),
                p.color.stroke_width(LINE_WIDTH),
            ))?;
        }

        draw_legend(&legend, &legend_layout, &series.participants)?;

        let ticks: Vec<(i32, i32)> = (0..series.month_slots() as u32)
            .map(|slot| chart.backend_coord(&(slot, 0)))
            .collect();
        ticks
    };

    // Skip labels instead of overlapping them on long histories.
    let stride = tick_pitch(&ticks)
        .filter(|pitch| *pitch > 0.0)
        .map(|pitch| ((TICK_LABEL_SIZE * 1.2) / pitch).ceil().max(1.0) as usize)
        .unwrap_or(1);
    draw_category_labels(
        &mut canvas,
        &ticks,
        &series.month_labels,
        TICK_LABEL_SIZE,
        ANGLE,
        stride,
        max_label_extent(page, ANGLE),
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_core::models::{ChatAggregates, MessageRecord};
    use chrono::NaiveDate;

    fn series(lines: &[(&str, (i32, u32, u32), u32)]) -> ReportSeries {
        let mut agg = ChatAggregates::new();
        for (who, (y, m, d), hour) in lines {
            agg.record(&MessageRecord {
                timestamp: NaiveDate::from_ymd_opt(*y, *m, *d)
                    .unwrap()
                    .and_hms_opt(*hour, 0, 0)
                    .unwrap(),
                participant: who.to_string(),
            });
        }
        ReportSeries::from_aggregates(&agg)
    }

    fn sample() -> ReportSeries {
        series(&[
            ("Alice", (2023, 1, 1), 9),
            ("Bob", (2023, 1, 1), 9),
            ("Alice", (2023, 1, 1), 10),
            ("Carol", (2024, 2, 3), 22),
        ])
    }

    #[test]
    fn test_axis_ceiling_leaves_headroom() {
        assert_eq!(axis_ceiling(0), 1);
        assert_eq!(axis_ceiling(9), 10);
        assert_eq!(axis_ceiling(100), 111);
    }

    #[test]
    fn test_fit_label() {
        assert_eq!(fit_label("Bob", 100.0, 10.0), "Bob");
        let cut = fit_label("A very long participant name", 50.0, 10.0);
        assert!(cut.ends_with('…'));
        assert!(text_width(&cut, 10.0) <= 50.0);
    }

    #[test]
    fn test_label_area_grows_with_longer_labels() {
        let page = PageSize::A4_LANDSCAPE;
        let short = label_area_height(["Al"], page, 90.0);
        let long = label_area_height(["Bartholomew Longname"], page, 90.0);
        assert!(long > short);
        // Capped well below the page height.
        let huge = label_area_height([&*"x".repeat(500)], page, 90.0);
        assert!((huge as f64) < page.height as f64 * 0.5);
    }

    #[test]
    fn test_messages_page_labels() {
        let canvas = draw_messages_page(&sample(), PageSize::A4_LANDSCAPE).unwrap();
        let runs = canvas.text_runs();
        assert!(runs.iter().any(|t| t.text == MESSAGES_TITLE));
        assert!(runs.iter().any(|t| t.text == MESSAGES_X_DESC));
        assert!(runs.iter().any(|t| t.text == MESSAGES_Y_DESC));
        for name in ["Alice", "Bob", "Carol"] {
            assert!(runs.iter().any(|t| t.text == name), "missing label {}", name);
        }
    }

    #[test]
    fn test_hourly_page_has_legend_entry_per_participant() {
        let canvas = draw_hourly_page(&sample(), PageSize::A4_LANDSCAPE).unwrap();
        let runs = canvas.text_runs();
        assert!(runs.iter().any(|t| t.text == HOURLY_TITLE));
        assert!(runs.iter().any(|t| t.text == HOURLY_X_DESC));
        assert!(runs.iter().any(|t| t.text == ACTIVITY_Y_DESC));
        for name in ["Alice", "Bob", "Carol"] {
            assert_eq!(runs.iter().filter(|t| t.text == name).count(), 1);
        }
    }

    #[test]
    fn test_monthly_page_labels_every_month() {
        let s = sample();
        let canvas = draw_monthly_page(&s, PageSize::LETTER_LANDSCAPE).unwrap();
        let runs = canvas.text_runs();
        assert!(runs.iter().any(|t| t.text == MONTHLY_TITLE));
        assert!(runs.iter().any(|t| t.text == MONTHLY_X_DESC));
        assert_eq!(s.month_slots(), 24);
        for label in ["Jan 2023", "Dec 2023", "Feb 2024"] {
            assert!(runs.iter().any(|t| t.text == label), "missing label {}", label);
        }
    }

    #[test]
    fn test_legend_layout_single_column_for_small_chats() {
        let layout = LegendLayout::new(3, PageSize::A4_LANDSCAPE);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.row, LEGEND_ROW);
        assert_eq!(layout.width, LEGEND_WIDTH);
    }

    #[test]
    fn test_legend_layout_wraps_into_columns() {
        let page = PageSize::A4_LANDSCAPE;
        let layout = LegendLayout::new(200, page);
        assert!(layout.columns >= 2);
        assert!(layout.columns * layout.rows_per_column >= 200);
        assert!(layout.width as f64 <= page.width as f64 * LEGEND_MAX_SHARE);

        let (x, y) = layout.entry(199);
        assert!(x < layout.width as i32);
        assert!(y + layout.row / 2 <= page.height as i32 - PAGE_MARGIN);
    }

    #[test]
    fn test_large_chat_legend_stays_on_page() {
        let names: Vec<String> = (0..200).map(|i| format!("P{:03}", i)).collect();
        let lines: Vec<(&str, (i32, u32, u32), u32)> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), (2023, 1 + (i % 12) as u32, 1), (i % 24) as u32))
            .collect();
        let s = series(&lines);
        let page = PageSize::A4_LANDSCAPE;

        for draw in [draw_hourly_page, draw_monthly_page] {
            let canvas = draw(&s, page).unwrap();
            for name in &names {
                let run = canvas
                    .text_runs()
                    .iter()
                    .find(|t| &t.text == name)
                    .unwrap_or_else(|| panic!("legend entry {} missing", name));
                let (x, y) = run.anchor;
                assert!(x >= 0.0 && y >= 0.0, "{} at {:?}", name, run.anchor);
                assert!(y <= page.height as f64, "{} below the page at {:?}", name, run.anchor);
                assert!(
                    x + text_width(&run.text, run.size) <= page.width as f64,
                    "{} past the right edge at {:?}",
                    name,
                    run.anchor
                );
            }
        }
    }

    #[test]
    fn test_pages_handle_single_participant() {
        let s = series(&[("Solo", (2022, 6, 1), 0)]);
        for draw in [draw_messages_page, draw_hourly_page, draw_monthly_page] {
            let canvas = draw(&s, PageSize::A4_LANDSCAPE).unwrap();
            assert!(canvas.text_runs().iter().any(|t| t.text == "Solo"));
        }
    }
}
