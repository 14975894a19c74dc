//! Partial updates for annotations.
//!
//! The Admin API updates annotations with a PATCH whose body carries the
//! resource and whose `updateMask` lists the fields to apply. [`resolve`]
//! merges a sparse [`AnnotationPatch`] into the record last fetched from the
//! service and returns both the body and the minimal mask.

use crate::annotation::{AnnotationColor, AnnotationRecord};
use crate::date::{CalendarDate, DateSpec};
use crate::error::{CoreError, Result};
use serde::Serialize;

/// Optional replacement values for an annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationPatch {
    /// New description. An empty string still counts as supplied.
    pub description: Option<String>,
    /// ISO 8601 date or date-time; only `YYYY-MM-DD` is read.
    pub start_date: Option<String>,
    /// ISO 8601 date or date-time. Supplying it always yields a date range.
    pub end_date: Option<String>,
    pub title: Option<String>,
    pub color: Option<AnnotationColor>,
}

impl AnnotationPatch {
    #[must_use]
    pub const fn touches_date(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Ordered, duplicate-free list of field paths for an update mask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMask(Vec<String>);

impl FieldMask {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a path unless it is already present.
    pub fn push(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.contains(&path) {
            self.0.push(path);
        }
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined form used for the `updateMask` query parameter.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        self.0.join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for FieldMask {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut mask = Self::new();
        for path in iter {
            mask.push(path);
        }
        mask
    }
}

/// Body and mask for an annotation PATCH call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub resource: AnnotationRecord,
    pub field_mask: FieldMask,
}

impl UpdateRequest {
    /// True when nothing changed and the remote write should be skipped.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.field_mask.is_empty()
    }
}

/// Merge `patch` into `existing`, producing the update body and mask.
///
/// Name, title and colour are always copied because the service requires
/// them on every write. A supplied end date upgrades a single date to a
/// range; date slots the patch leaves out are taken from the existing date.
///
/// # Errors
/// - `CoreError::InvalidDate` if a supplied date string is malformed.
/// - `CoreError::MissingDate` if a date slot has no patch value and the
///   existing record has no date to take it from.
pub fn resolve(existing: &AnnotationRecord, patch: &AnnotationPatch) -> Result<UpdateRequest> {
    let mut mask = FieldMask::new();
    let mut resource = AnnotationRecord {
        name: existing.name.clone(),
        title: existing.title.clone(),
        description: None,
        color: existing.color,
        system_generated: false,
        date: None,
    };

    if let Some(description) = &patch.description {
        resource.description = Some(description.clone());
        mask.push("description");
    } else {
        resource.description = existing.description.clone().filter(|d| !d.is_empty());
    }

    if let Some(title) = &patch.title {
        resource.title.clone_from(title);
        mask.push("title");
    }

    if let Some(color) = patch.color {
        resource.color = color;
        mask.push("color");
    }

    if patch.touches_date() {
        let date = merge_date(existing.date.as_ref(), patch)?;
        mask.push(date.field_path());
        resource.date = Some(date);
    } else {
        resource.date = existing.date;
    }

    Ok(UpdateRequest {
        resource,
        field_mask: mask,
    })
}

fn merge_date(existing: Option<&DateSpec>, patch: &AnnotationPatch) -> Result<DateSpec> {
    let start = fill_slot(
        patch.start_date.as_deref(),
        existing.map(DateSpec::start),
        "startDate",
    )?;

    let wants_range = patch.end_date.is_some() || existing.is_some_and(DateSpec::is_range);
    if !wants_range {
        return Ok(DateSpec::SingleDate(start));
    }

    let end = fill_slot(
        patch.end_date.as_deref(),
        existing.map(DateSpec::end),
        "endDate",
    )?;
    Ok(DateSpec::DateRange { start, end })
}

fn fill_slot(
    supplied: Option<&str>,
    fallback: Option<CalendarDate>,
    slot: &'static str,
) -> Result<CalendarDate> {
    match supplied {
        Some(value) => CalendarDate::parse_prefix(value),
        None => fallback.ok_or(CoreError::MissingDate(slot)),
    }
}
