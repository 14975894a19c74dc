//! Reporting data annotation model.

use crate::date::{CalendarDate, DateRange, DateSpec};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Display colour of an annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationColor {
    Purple,
    Brown,
    Blue,
    Green,
    Red,
    Cyan,
    Orange,
    /// Also absorbs colours this crate does not know yet.
    #[default]
    #[serde(other)]
    ColorUnspecified,
}

impl AnnotationColor {
    pub const ALL: [Self; 8] = [
        Self::ColorUnspecified,
        Self::Purple,
        Self::Brown,
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Cyan,
        Self::Orange,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ColorUnspecified => "COLOR_UNSPECIFIED",
            Self::Purple => "PURPLE",
            Self::Brown => "BROWN",
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::Red => "RED",
            Self::Cyan => "CYAN",
            Self::Orange => "ORANGE",
        }
    }
}

impl std::fmt::Display for AnnotationColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnnotationColor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Validation(format!("unknown annotation color '{s}'")))
    }
}

/// A labelled point or period of interest on a property's reports.
///
/// Serializes to the Admin API's camelCase shape, with the date carried as
/// either `annotationDate` or `annotationDateRange`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AnnotationWire", into = "AnnotationWire")]
pub struct AnnotationRecord {
    /// Resource name, e.g. `properties/1/reportingDataAnnotations/2`. Empty before creation.
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub color: AnnotationColor,
    /// Set by the service for annotations it generated itself; output only.
    pub system_generated: bool,
    pub date: Option<DateSpec>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    color: AnnotationColor,
    #[serde(default)]
    system_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation_date: Option<CalendarDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation_date_range: Option<DateRange>,
}

impl From<AnnotationWire> for AnnotationRecord {
    fn from(wire: AnnotationWire) -> Self {
        Self {
            name: wire.name,
            title: wire.title,
            description: wire.description,
            color: wire.color,
            system_generated: wire.system_generated,
            date: DateSpec::from_wire(wire.annotation_date, wire.annotation_date_range),
        }
    }
}

impl From<AnnotationRecord> for AnnotationWire {
    fn from(record: AnnotationRecord) -> Self {
        let (annotation_date, annotation_date_range) =
            record.date.as_ref().map_or((None, None), DateSpec::to_wire);
        Self {
            name: record.name,
            title: record.title,
            description: record.description,
            color: record.color,
            system_generated: record.system_generated,
            annotation_date,
            annotation_date_range,
        }
    }
}

/// Input for creating an annotation from ISO 8601 time strings.
#[derive(Debug, Clone, Default)]
pub struct NewAnnotation {
    pub description: String,
    pub start_time: String,
    pub end_time: Option<String>,
    /// Defaults to the description.
    pub title: Option<String>,
    /// Defaults to blue.
    pub color: Option<AnnotationColor>,
}

impl NewAnnotation {
    /// Build the request body for a create call.
    ///
    /// A single date is produced from `start_time` unless `end_time` is given,
    /// in which case the annotation covers the range between the two.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidDate` if either time string is malformed.
    pub fn build(&self) -> Result<AnnotationRecord> {
        let start = CalendarDate::parse_prefix(&self.start_time)?;
        let date = match &self.end_time {
            Some(end) => DateSpec::DateRange {
                start,
                end: CalendarDate::parse_prefix(end)?,
            },
            None => DateSpec::SingleDate(start),
        };

        Ok(AnnotationRecord {
            name: String::new(),
            title: self.title.clone().unwrap_or_else(|| self.description.clone()),
            description: Some(self.description.clone()),
            color: self.color.unwrap_or(AnnotationColor::Blue),
            system_generated: false,
            date: Some(date),
        })
    }
}
