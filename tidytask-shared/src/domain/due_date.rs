/// Due date parsing
///
/// Two input shapes are accepted: a calendar date (`2024-01-31`) and a
/// calendar date with minute precision time (`2024-01-31T17:30`). A date
/// alone means midnight of that day. No timezone is attached or converted.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::TaskError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const INVALID_DUE_DATE: &str = "Invalid due date format";

/// Parses a due date in either accepted shape
pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, TaskError> {
    let raw = raw.trim();

    let parsed = if raw.contains('T') {
        NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok()
    } else {
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    };

    parsed.ok_or_else(|| TaskError::validation(INVALID_DUE_DATE))
}

/// Parses an optional due date; blank means "no deadline"
pub fn parse_optional_due_date(raw: Option<&str>) -> Result<Option<NaiveDateTime>, TaskError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_due_date(value).map(Some),
    }
}

/// Renders a due date for a `datetime-local` form field
pub fn format_for_input(due: &NaiveDateTime) -> String {
    due.format(DATE_TIME_FORMAT).to_string()
}
