//! ga4-admin-core: Domain types and partial-update logic for the GA4 Admin API.
//!
//! This crate provides:
//! - `AnnotationRecord` and `DateSpec`: typed reporting data annotations
//! - `resolve`: merges a sparse patch into an annotation and computes the update mask
//! - Resource names, listing summaries and validated creation inputs

pub mod annotation;
pub mod date;
pub mod error;
pub mod names;
pub mod patch;
pub mod resources;

pub use annotation::{AnnotationColor, AnnotationRecord, NewAnnotation};
pub use date::{CalendarDate, DateRange, DateSpec};
pub use error::{CoreError, Result};
pub use names::{AccountId, PropertyId};
pub use patch::{AnnotationPatch, FieldMask, UpdateRequest, resolve};
pub use resources::{
    AccountSummary, AudienceSummary, CustomDimensionSummary, DataStreamSummary, DimensionScope,
    NewAudience, NewCustomDimension, PropertySummary,
};
