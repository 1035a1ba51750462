//! Single-event iCalendar (`.ics`) documents.
//!
//! Times are floating (no `Z`, no `TZID`), so calendar apps place the
//! event at the same wall-clock time wherever the user is.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

/// Product identifier written to `PRODID`.
pub const PRODID: &str = "-//Sinflora//Tickets//IT";

/// Domain appended to every `UID`.
pub const UID_DOMAIN: &str = "sinflora";

/// Title used when none is given.
pub const DEFAULT_TITLE: &str = "Evento";

/// Duration used when none (or garbage) is given.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

const ICS_DATETIME: &str = "%Y%m%dT%H%M%S";

/// Start date or time is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("use date=YYYY-MM-DD&time=HH:MM")]
pub struct InvalidStart;

/// A calendar event ready to be rendered.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    /// Full UID including the `@sinflora` suffix.
    pub uid: String,
    /// `SUMMARY`.
    pub title: String,
    /// Floating local start.
    pub start: NaiveDateTime,
    /// Length of the event.
    pub duration: TimeDelta,
    /// `LOCATION`, omitted when empty.
    pub location: String,
    /// `DESCRIPTION`, omitted when empty.
    pub description: String,
}

fn has_shape(s: &str, shape: &str) -> bool {
    s.len() == shape.len()
        && s.bytes().zip(shape.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

/// Parse a `YYYY-MM-DD` date and `HH:MM` time into a floating start.
///
/// # Errors
///
/// Returns [`InvalidStart`] unless both match their shape exactly and name a
/// real calendar date and time of day.
pub fn parse_start(date: &str, time: &str) -> Result<NaiveDateTime, InvalidStart> {
    if !has_shape(date, "dddd-dd-dd") || !has_shape(time, "dd:dd") {
        return Err(InvalidStart);
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| InvalidStart)?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| InvalidStart)?;
    Ok(date.and_time(time))
}

/// Duration in minutes from a raw query value, defaulting to 60.
#[must_use]
pub fn parse_duration(raw: Option<&str>) -> TimeDelta {
    let minutes = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    TimeDelta::try_minutes(minutes).unwrap_or_else(|| TimeDelta::minutes(DEFAULT_DURATION_MINUTES))
}

/// `UID` value: the given id, or 8 random bytes in hex, plus `@sinflora`.
#[must_use]
pub fn event_uid(uid: Option<&str>) -> String {
    let local = uid
        .filter(|u| !u.is_empty())
        .map_or_else(|| crate::shopify::oauth::state::generate_state(8), ToString::to_string);
    format!("{local}@{UID_DOMAIN}")
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

impl CalendarEvent {
    /// End of the event.
    ///
    /// A duration that overflows the calendar falls back to the default.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.start
            .checked_add_signed(self.duration)
            .unwrap_or_else(|| self.start + TimeDelta::minutes(DEFAULT_DURATION_MINUTES))
    }

    /// Render the VCALENDAR document with CRLF line endings.
    ///
    /// `stamp` is written as `DTSTAMP`.
    #[must_use]
    pub fn to_ics(&self, stamp: NaiveDateTime) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{PRODID}"),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", single_line(&self.uid)),
            format!("DTSTAMP:{}", stamp.format(ICS_DATETIME)),
            format!("DTSTART:{}", self.start.format(ICS_DATETIME)),
            format!("DTEND:{}", self.end().format(ICS_DATETIME)),
            format!("SUMMARY:{}", single_line(&self.title)),
        ];
        if !self.location.is_empty() {
            lines.push(format!("LOCATION:{}", single_line(&self.location)));
        }
        if !self.description.is_empty() {
            lines.push(format!("DESCRIPTION:{}", single_line(&self.description)));
        }
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());
        lines.join("\r\n")
    }
}
