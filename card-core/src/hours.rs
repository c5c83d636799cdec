//! Business hours and the "open now" badge.

use chrono::{Datelike, Local, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{bool_field, str_field};

/// Badge text when the business counts as open.
pub const OPEN_NOW: &str = "Open Now";
/// Badge text when the business counts as closed.
pub const CLOSED_NOW: &str = "Closed Now";

/// Wall-clock snapshot used for a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    /// Current weekday.
    pub weekday: Weekday,
    /// Current local time of day.
    pub time: NaiveTime,
}

impl Clock {
    /// Create a clock at a fixed weekday and time.
    #[must_use]
    pub const fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    /// Snapshot the local wall clock.
    #[must_use]
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            weekday: now.weekday(),
            time: now.time().with_nanosecond(0).unwrap_or_else(|| now.time()),
        }
    }
}

/// How "open now" is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursPolicy {
    /// Open iff today's row exists and is not flagged closed. Clock time is
    /// ignored.
    #[default]
    FlagOnly,
    /// Additionally require the current time to fall in `[open, close)`.
    WithinHours,
}

/// One day of opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursRow {
    /// Weekday the row applies to, if the day name was recognised.
    pub weekday: Option<Weekday>,
    /// Day label as entered.
    pub day: String,
    /// Opening time as entered.
    pub open_time: String,
    /// Closing time as entered.
    pub close_time: String,
    /// Closed all day.
    pub is_closed: bool,
}

impl HoursRow {
    /// Build a row from a repeater entry. Returns `None` for non-objects and
    /// rows without a day.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let row = value.as_object()?;
        let day = str_field(row, "day")?.to_string();
        Some(Self {
            weekday: parse_weekday(&day),
            day,
            open_time: str_field(row, "open_time").unwrap_or_default().to_string(),
            close_time: str_field(row, "close_time").unwrap_or_default().to_string(),
            is_closed: bool_field(row, "is_closed"),
        })
    }

    fn contains(&self, time: NaiveTime) -> bool {
        let (Some(open), Some(close)) = (parse_time(&self.open_time), parse_time(&self.close_time))
        else {
            return false;
        };
        if open < close {
            open <= time && time < close
        } else {
            // Spans midnight.
            time >= open || time < close
        }
    }
}

/// Parse a weekday name: full or three-letter, any case.
#[must_use]
pub fn parse_weekday(day: &str) -> Option<Weekday> {
    let day = day.trim().to_ascii_lowercase();
    let weekday = match day.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    let full = match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    };
    (day.len() == 3 || day == full).then_some(weekday)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%I:%M %p"))
        .ok()
}

/// Parsed opening hours for a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    /// Rows in entered order.
    pub rows: Vec<HoursRow>,
}

impl BusinessHours {
    /// Parse the `hours` repeater array. Malformed rows are skipped.
    #[must_use]
    pub fn from_rows(rows: &[Value]) -> Self {
        Self {
            rows: rows.iter().filter_map(HoursRow::from_value).collect(),
        }
    }

    /// Row for the given weekday, if any.
    #[must_use]
    pub fn row_for(&self, weekday: Weekday) -> Option<&HoursRow> {
        self.rows.iter().find(|r| r.weekday == Some(weekday))
    }

    /// Decide whether the business is open at `clock`.
    #[must_use]
    pub fn is_open(&self, clock: &Clock, policy: HoursPolicy) -> bool {
        let Some(today) = self.row_for(clock.weekday) else {
            return false;
        };
        if today.is_closed {
            return false;
        }
        match policy {
            HoursPolicy::FlagOnly => true,
            HoursPolicy::WithinHours => today.contains(clock.time),
        }
    }

    /// Badge text for the given clock.
    #[must_use]
    pub fn status_label(&self, clock: &Clock, policy: HoursPolicy) -> &'static str {
        if self.is_open(clock, policy) {
            OPEN_NOW
        } else {
            CLOSED_NOW
        }
    }
}
