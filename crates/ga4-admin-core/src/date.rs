//! Calendar dates and the single-date / date-range union used by annotations.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// A date without time-of-day or timezone.
///
/// No calendar validation is done here; `2023-02-31` is passed through and
/// left for the remote service to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    #[must_use]
    pub const fn new(year: u32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Parse the calendar-date prefix of an ISO 8601 date or date-time.
    ///
    /// Only the first 10 characters are read (`YYYY-MM-DD`). Anything after
    /// them, such as a time of day or an offset, is discarded unchecked.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidDate` if the prefix is not four digits,
    /// a separator, two digits, a separator, two digits.
    pub fn parse_prefix(input: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidDate(input.to_string());

        let prefix = input.get(..10).ok_or_else(invalid)?;
        let bytes = prefix.as_bytes();
        if !prefix.is_ascii() || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            let part = &prefix[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        Ok(Self {
            year: field(0..4)?,
            month: field(5..7)?,
            day: field(8..10)?,
        })
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Wire shape of an annotation date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
}

/// When an annotation applies: one day, or an inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    SingleDate(CalendarDate),
    DateRange { start: CalendarDate, end: CalendarDate },
}

impl DateSpec {
    /// Field-mask path naming this variant on the wire.
    #[must_use]
    pub const fn field_path(&self) -> &'static str {
        match self {
            Self::SingleDate(_) => "annotationDate",
            Self::DateRange { .. } => "annotationDateRange",
        }
    }

    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self, Self::DateRange { .. })
    }

    /// First day covered.
    #[must_use]
    pub const fn start(&self) -> CalendarDate {
        match self {
            Self::SingleDate(date) => *date,
            Self::DateRange { start, .. } => *start,
        }
    }

    /// Last day covered. Equal to `start` for a single date.
    #[must_use]
    pub const fn end(&self) -> CalendarDate {
        match self {
            Self::SingleDate(date) => *date,
            Self::DateRange { end, .. } => *end,
        }
    }

    /// Build from the two optional wire fields. A range wins over a single date.
    #[must_use]
    pub fn from_wire(single: Option<CalendarDate>, range: Option<DateRange>) -> Option<Self> {
        match (single, range) {
            (_, Some(range)) => Some(Self::DateRange {
                start: range.start_date,
                end: range.end_date,
            }),
            (Some(date), None) => Some(Self::SingleDate(date)),
            (None, None) => None,
        }
    }

    /// Split into the two optional wire fields.
    #[must_use]
    pub const fn to_wire(&self) -> (Option<CalendarDate>, Option<DateRange>) {
        match self {
            Self::SingleDate(date) => (Some(*date), None),
            Self::DateRange { start, end } => (
                None,
                Some(DateRange {
                    start_date: *start,
                    end_date: *end,
                }),
            ),
        }
    }
}
