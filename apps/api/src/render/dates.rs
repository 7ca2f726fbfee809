use chrono::NaiveDate;

/// Separator between the two ends of a date range.
pub const RANGE_SEPARATOR: &str = " – ";

const PRESENT: &str = "present";

/// Formats the date line shown under an entry heading.
///
/// A free-form `date` wins. Otherwise the range is `start – end`, an open range reads
/// `start – present`, and an end without a start is shown alone.
pub fn format_date_range(
    start: Option<&str>,
    end: Option<&str>,
    date: Option<&str>,
) -> Option<String> {
    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    if let Some(date) = present(date) {
        return Some(format_date(date));
    }

    match (present(start), present(end)) {
        (Some(start), Some(end)) => Some(format!(
            "{}{RANGE_SEPARATOR}{}",
            format_date(start),
            format_date(end)
        )),
        (Some(start), None) => Some(format!("{}{RANGE_SEPARATOR}{PRESENT}", format_date(start))),
        (None, Some(end)) => Some(format_date(end)),
        (None, None) => None,
    }
}

/// `YYYY-MM-DD` and `YYYY-MM` become `Mon YYYY`; everything else is kept as written.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    parse_month(value)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// True when `value` reads back as a date line: non-blank and already in display form.
pub fn is_display_date(value: &str) -> bool {
    !value.trim().is_empty() && format_date(value) == value
}

fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            let bytes = value.as_bytes();
            // "%Y-%m" alone is not a complete date for chrono; pin the day.
            if bytes.len() == 7 && bytes[4] == b'-' {
                NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()
            } else {
                None
            }
        })
}

/// Truncates an ISO date to `YYYY-MM`, the precision RenderCV expects.
pub fn month_precision(value: &str) -> String {
    value.trim().chars().take(7).collect()
}
