//! Resource names for Admin API entities.
//!
//! Names are hierarchical paths such as
//! `properties/123/reportingDataAnnotations/456`.

use crate::error::{CoreError, Result};

/// Numeric ID of a GA4 property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyId(String);

impl PropertyId {
    /// # Errors
    /// Returns `CoreError::Validation` unless `id` is a non-empty run of ASCII digits.
    pub fn parse(id: &str) -> Result<Self> {
        parse_numeric(id, "Property ID").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `properties/{id}`
    #[must_use]
    pub fn name(&self) -> String {
        format!("properties/{}", self.0)
    }

    /// `properties/{id}/reportingDataAnnotations`
    #[must_use]
    pub fn annotations(&self) -> String {
        format!("{}/reportingDataAnnotations", self.name())
    }

    /// `properties/{id}/reportingDataAnnotations/{annotation_id}`
    ///
    /// # Errors
    /// Returns `CoreError::Validation` if the child ID is empty or contains `/`.
    pub fn annotation(&self, annotation_id: &str) -> Result<String> {
        child(&self.annotations(), annotation_id, "Annotation ID")
    }

    /// `properties/{id}/audiences`
    #[must_use]
    pub fn audiences(&self) -> String {
        format!("{}/audiences", self.name())
    }

    /// # Errors
    /// Returns `CoreError::Validation` if the child ID is empty or contains `/`.
    pub fn audience(&self, audience_id: &str) -> Result<String> {
        child(&self.audiences(), audience_id, "Audience ID")
    }

    /// `properties/{id}/customDimensions`
    #[must_use]
    pub fn custom_dimensions(&self) -> String {
        format!("{}/customDimensions", self.name())
    }

    /// # Errors
    /// Returns `CoreError::Validation` if the child ID is empty or contains `/`.
    pub fn custom_dimension(&self, dimension_id: &str) -> Result<String> {
        child(&self.custom_dimensions(), dimension_id, "Custom dimension ID")
    }

    /// `properties/{id}/dataStreams`
    #[must_use]
    pub fn data_streams(&self) -> String {
        format!("{}/dataStreams", self.name())
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric ID of a GA4 account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// # Errors
    /// Returns `CoreError::Validation` unless `id` is a non-empty run of ASCII digits.
    pub fn parse(id: &str) -> Result<Self> {
        parse_numeric(id, "Account ID").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `accounts/{id}`
    #[must_use]
    pub fn name(&self) -> String {
        format!("accounts/{}", self.0)
    }

    /// Filter expression selecting the account's properties.
    #[must_use]
    pub fn property_filter(&self) -> String {
        format!("parent:{}", self.name())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_numeric(id: &str, what: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "{what} must be numeric, got '{id}'"
        )));
    }
    Ok(id.to_string())
}

fn child(parent: &str, id: &str, what: &str) -> Result<String> {
    let id = id.trim();
    let opaque_token = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'-';
    if id.is_empty() || !id.bytes().all(opaque_token) {
        return Err(CoreError::Validation(format!(
            "{what} may only contain letters, digits, '_' and '-', got '{id}'"
        )));
    }
    Ok(format!("{parent}/{id}"))
}
