use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

// ── Two-digit years ───────────────────────────────────────────────────────────

/// Years `00..=68` map to 2000–2068, `69..=99` to 1969–1999 (POSIX `%y`).
pub const CENTURY_PIVOT: u32 = 69;

/// Expand a two-digit export year into a full calendar year.
///
/// Returns `None` for values that do not fit in two digits.
pub fn expand_two_digit_year(yy: u32) -> Option<i32> {
    if yy < CENTURY_PIVOT {
        Some(2000 + yy as i32)
    } else if yy <= 99 {
        Some(1900 + yy as i32)
    } else {
        None
    }
}

// ── Export timestamps ─────────────────────────────────────────────────────────

/// Parse the `day/month/yy` and `hour:minute` fields of an export line.
///
/// Both fields come straight from the line pattern, so the separators are
/// already known to be present; this function only validates the numbers.
/// Returns `None` when the year is not a two-digit value or the fields do not
/// form a real calendar date and 24-hour time.
pub fn parse_export_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let mut date_parts = date.split('/');
    let day = parse_field(date_parts.next()?, 2)?;
    let month = parse_field(date_parts.next()?, 2)?;
    let year = expand_two_digit_year(parse_two_digit_year(date_parts.next()?)?)?;
    if date_parts.next().is_some() {
        return None;
    }

    let (hour, minute) = time.split_once(':')?;
    let hour = parse_field(hour, 2)?;
    let minute = parse_field(minute, 2)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(date.and_time(time))
}

/// Parse a run of ASCII digits no longer than `max_digits`.
fn parse_field(s: &str, max_digits: usize) -> Option<u32> {
    if s.is_empty() || s.len() > max_digits || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// The year field is always exactly two digits (`%y`).
fn parse_two_digit_year(s: &str) -> Option<u32> {
    if s.len() != 2 {
        return None;
    }
    parse_field(s, 2)
}

// ── Month labels ──────────────────────────────────────────────────────────────

/// Short English month names, indexed by zero-based month.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Axis label for a zero-based month of `year`, e.g. `"Mar 2023"`.
pub fn month_label(year: i32, month0: usize) -> String {
    let name = MONTH_ABBREVIATIONS.get(month0).copied().unwrap_or("???");
    format!("{} {}", name, year)
}
