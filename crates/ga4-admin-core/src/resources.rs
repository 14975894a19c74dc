//! Admin API resources other than annotations.
//!
//! Summaries keep only the fields worth showing in a listing; everything else
//! in the remote payload is dropped on deserialization. Creation inputs are
//! validated before anything is sent.

use crate::error::{CoreError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Longest membership duration the service accepts, in days.
pub const MAX_MEMBERSHIP_DURATION_DAYS: u32 = 540;
/// Longest custom dimension display name.
pub const MAX_DISPLAY_NAME_LEN: usize = 82;
/// Longest custom dimension description.
pub const MAX_DESCRIPTION_LEN: usize = 150;

static PARAMETER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]{0,39}$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

/// A web, Android or iOS data stream. The per-platform blocks are passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStreamSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_stream_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_app_stream_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios_app_stream_data: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads_personalization_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDimensionSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disallow_ads_personalization: Option<bool>,
}

/// Input for creating an audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAudience {
    pub display_name: String,
    pub description: String,
    pub membership_duration_days: u32,
}

impl NewAudience {
    /// # Errors
    /// Returns `CoreError::Validation` if the duration is outside `1..=540`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_MEMBERSHIP_DURATION_DAYS).contains(&self.membership_duration_days) {
            return Err(CoreError::Validation(format!(
                "membership_duration_days must be between 1 and {MAX_MEMBERSHIP_DURATION_DAYS}, got {}",
                self.membership_duration_days
            )));
        }
        Ok(())
    }

    /// Request body for a create call.
    ///
    /// The service rejects audiences without a filter clause, so every new
    /// audience matches users who fired a `page_view` event in any session.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` if the input is invalid, or
    /// `CoreError::Json` if it cannot be serialized.
    pub fn to_body(&self) -> Result<Value> {
        self.validate()?;
        let mut body = serde_json::to_value(self)?;
        body["filterClauses"] = json!([{
            "simpleFilter": {
                "scope": "AUDIENCE_FILTER_SCOPE_ACROSS_ALL_SESSIONS",
                "filterExpression": {
                    "dimensionOrMetricFilter": {
                        "dimensionOrMetricName": "eventName",
                        "stringFilter": {
                            "matchType": "EXACT",
                            "value": "page_view"
                        }
                    }
                }
            }
        }]);
        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionScope {
    Event,
    User,
    Item,
}

impl std::str::FromStr for DimensionScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EVENT" => Ok(Self::Event),
            "USER" => Ok(Self::User),
            "ITEM" => Ok(Self::Item),
            _ => Err(CoreError::Validation(format!(
                "scope must be one of EVENT, USER or ITEM, got '{s}'"
            ))),
        }
    }
}

/// Input for creating a custom dimension; serializes to the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomDimension {
    pub parameter_name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scope: DimensionScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disallow_ads_personalization: Option<bool>,
}

impl NewCustomDimension {
    /// # Errors
    /// Returns `CoreError::Validation` naming the first rule the input breaks.
    pub fn validate(&self) -> Result<()> {
        if !PARAMETER_NAME.is_match(&self.parameter_name) {
            return Err(CoreError::Validation(format!(
                "parameter_name '{}' must start with a letter and contain only letters, digits and underscores (max 40 characters)",
                self.parameter_name
            )));
        }
        if self.display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "display_name must be at most {MAX_DISPLAY_NAME_LEN} characters"
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(CoreError::Validation(format!(
                    "description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    /// Drop an empty description so it is omitted from the body.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.description = self.description.filter(|d| !d.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dimension(parameter_name: &str) -> NewCustomDimension {
        NewCustomDimension {
            parameter_name: parameter_name.to_string(),
            display_name: "Plan tier".to_string(),
            description: None,
            scope: DimensionScope::User,
            disallow_ads_personalization: None,
        }
    }

    #[test]
    fn test_property_summary_drops_extra_fields() {
        let summary: PropertySummary = serde_json::from_value(json!({
            "name": "properties/1",
            "displayName": "Shop",
            "timeZone": "Europe/Amsterdam",
            "industryCategory": "SHOPPING"
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "name": "properties/1",
                "displayName": "Shop",
                "timeZone": "Europe/Amsterdam"
            })
        );
    }

    #[test]
    fn test_data_stream_type_field() {
        let stream: DataStreamSummary = serde_json::from_value(json!({
            "name": "properties/1/dataStreams/2",
            "type": "WEB_DATA_STREAM",
            "webStreamData": {"measurementId": "G-ABC", "defaultUri": "https://example.com"}
        }))
        .unwrap();

        assert_eq!(stream.stream_type.as_deref(), Some("WEB_DATA_STREAM"));
        assert_eq!(stream.web_stream_data.unwrap()["measurementId"], "G-ABC");
    }

    #[test]
    fn test_audience_body() {
        let audience = NewAudience {
            display_name: "Engaged".to_string(),
            description: "Viewed a page".to_string(),
            membership_duration_days: 30,
        };

        let body = audience.to_body().unwrap();
        assert_eq!(body["displayName"], "Engaged");
        assert_eq!(body["description"], "Viewed a page");
        assert_eq!(body["membershipDurationDays"], 30);
        assert_eq!(
            body["filterClauses"][0]["simpleFilter"]["filterExpression"]["dimensionOrMetricFilter"]
                ["stringFilter"]["value"],
            "page_view"
        );
    }

    #[test]
    fn test_audience_duration_bounds() {
        for days in [0, 541] {
            let audience = NewAudience {
                display_name: "x".to_string(),
                description: "x".to_string(),
                membership_duration_days: days,
            };
            assert!(matches!(audience.to_body(), Err(CoreError::Validation(_))));
        }
    }

    #[test]
    fn test_parameter_name_rules() {
        assert!(dimension("plan_tier").validate().is_ok());
        assert!(dimension("a").validate().is_ok());
        assert!(dimension(&format!("a{}", "b".repeat(39))).validate().is_ok());

        assert!(dimension("").validate().is_err());
        assert!(dimension("1plan").validate().is_err());
        assert!(dimension("plan-tier").validate().is_err());
        assert!(dimension(&format!("a{}", "b".repeat(40))).validate().is_err());
    }

    #[test]
    fn test_length_limits() {
        let mut dim = dimension("plan");
        dim.display_name = "x".repeat(83);
        assert!(dim.validate().is_err());

        let mut dim = dimension("plan");
        dim.description = Some("x".repeat(151));
        assert!(dim.validate().is_err());
    }

    #[test]
    fn test_custom_dimension_body() {
        let mut dim = dimension("plan_tier");
        dim.description = Some(String::new());
        dim.disallow_ads_personalization = Some(true);

        assert_eq!(
            serde_json::to_value(dim.normalized()).unwrap(),
            json!({
                "parameterName": "plan_tier",
                "displayName": "Plan tier",
                "scope": "USER",
                "disallowAdsPersonalization": true
            })
        );
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("event".parse::<DimensionScope>().unwrap(), DimensionScope::Event);
        assert!("SESSION".parse::<DimensionScope>().is_err());
    }
}
