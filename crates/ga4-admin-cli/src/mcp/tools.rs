//! MCP tool definitions and handlers.

use super::protocol::{ToolCallResult, ToolDefinition};
use ga4_admin_client::{AdminClient, ApiError};
use ga4_admin_core::{
    AccountId, AnnotationColor, AnnotationPatch, DimensionScope, NewAnnotation, NewAudience,
    NewCustomDimension, PropertyId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Handlers short-circuit with an error result through `?`.
type Outcome<T = ToolCallResult> = std::result::Result<T, ToolCallResult>;

fn tool(name: &'static str, description: &'static str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        input_schema,
    }
}

fn property_id_schema() -> Value {
    json!({
        "type": "string",
        "pattern": "^\\d+$",
        "description": "The numeric ID of the GA4 property (e.g., '123456789')"
    })
}

fn property_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "property_id": property_id_schema() },
        "required": ["property_id"],
        "additionalProperties": false
    })
}

fn child_schema(child: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "property_id": property_id_schema(),
            child: { "type": "string", "description": description }
        },
        "required": ["property_id", child],
        "additionalProperties": false
    })
}

fn color_schema() -> Value {
    let colors: Vec<&str> = AnnotationColor::ALL
        .iter()
        .filter(|c| **c != AnnotationColor::ColorUnspecified)
        .map(AnnotationColor::as_str)
        .collect();
    json!({
        "type": "string",
        "enum": colors,
        "description": "Annotation color"
    })
}

/// Get all available tool definitions.
#[allow(clippy::too_many_lines)]
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            "ga4_admin_api_list_accounts",
            "List all Google Analytics 4 accounts accessible by the service account.",
            json!({ "type": "object", "properties": {}, "additionalProperties": false }),
        ),
        tool(
            "ga4_admin_api_get_property_details",
            "Get details for a specific Google Analytics 4 property.",
            property_only_schema(),
        ),
        tool(
            "ga4_admin_api_list_properties",
            "List Google Analytics 4 properties under a specific account.",
            json!({
                "type": "object",
                "properties": {
                    "account_id": {
                        "type": "string",
                        "pattern": "^\\d+$",
                        "description": "The numeric ID of the GA4 account (e.g., '123456')"
                    }
                },
                "required": ["account_id"],
                "additionalProperties": false
            }),
        ),
        tool(
            "ga4_admin_api_list_data_streams",
            "List the data streams (web, Android, iOS) of a GA4 property.",
            property_only_schema(),
        ),
        tool(
            "ga4_admin_api_list_annotations",
            "List the reporting data annotations of a GA4 property.",
            property_only_schema(),
        ),
        tool(
            "ga4_admin_api_create_annotation",
            "Create a reporting data annotation on a single date or a date range. Title defaults to the description and color to BLUE.",
            json!({
                "type": "object",
                "properties": {
                    "property_id": property_id_schema(),
                    "description": {
                        "type": "string",
                        "description": "Annotation text"
                    },
                    "start_time": {
                        "type": "string",
                        "description": "Start as ISO 8601 (e.g., 2024-03-01T00:00:00Z); only the date part is used"
                    },
                    "end_time": {
                        "type": "string",
                        "description": "End as ISO 8601; omit for a single-date annotation"
                    },
                    "title": {
                        "type": "string",
                        "description": "Annotation title (default: the description)"
                    },
                    "color": color_schema()
                },
                "required": ["property_id", "description", "start_time"],
                "additionalProperties": false
            }),
        ),
        tool(
            "ga4_admin_api_get_annotation",
            "Get a single reporting data annotation.",
            child_schema("annotation_id", "The annotation ID"),
        ),
        tool(
            "ga4_admin_api_update_annotation",
            "Update an annotation. Only supplied fields change; supplying only one end of a date range keeps the other.",
            json!({
                "type": "object",
                "properties": {
                    "property_id": property_id_schema(),
                    "annotation_id": {
                        "type": "string",
                        "description": "The annotation ID"
                    },
                    "description": {
                        "type": "string",
                        "description": "New annotation text"
                    },
                    "start_time": {
                        "type": "string",
                        "description": "New start as ISO 8601"
                    },
                    "end_time": {
                        "type": "string",
                        "description": "New end as ISO 8601"
                    },
                    "title": {
                        "type": "string",
                        "description": "New title"
                    },
                    "color": color_schema()
                },
                "required": ["property_id", "annotation_id"],
                "additionalProperties": false
            }),
        ),
        tool(
            "ga4_admin_api_delete_annotation",
            "Delete a reporting data annotation.",
            child_schema("annotation_id", "The annotation ID"),
        ),
        tool(
            "ga4_admin_api_list_audiences",
            "List the audiences of a GA4 property.",
            property_only_schema(),
        ),
        tool(
            "ga4_admin_api_get_audience",
            "Get a single audience.",
            child_schema("audience_id", "The audience ID"),
        ),
        tool(
            "ga4_admin_api_create_audience",
            "Create an audience of users who viewed a page, kept for the given number of days.",
            json!({
                "type": "object",
                "properties": {
                    "property_id": property_id_schema(),
                    "display_name": {
                        "type": "string",
                        "description": "Audience name"
                    },
                    "description": {
                        "type": "string",
                        "description": "Audience description"
                    },
                    "membership_duration_days": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 540,
                        "description": "How long users stay in the audience"
                    }
                },
                "required": ["property_id", "display_name", "description", "membership_duration_days"],
                "additionalProperties": false
            }),
        ),
        tool(
            "ga4_admin_api_list_custom_dimensions",
            "List the custom dimensions of a GA4 property.",
            property_only_schema(),
        ),
        tool(
            "ga4_admin_api_get_custom_dimension",
            "Get a single custom dimension.",
            child_schema("dimension_id", "The custom dimension ID"),
        ),
        tool(
            "ga4_admin_api_create_custom_dimension",
            "Create a custom dimension bound to an event, user or item parameter.",
            json!({
                "type": "object",
                "properties": {
                    "property_id": property_id_schema(),
                    "parameter_name": {
                        "type": "string",
                        "pattern": "^[a-zA-Z][a-zA-Z0-9_]{0,39}$",
                        "description": "Event, user or item parameter name"
                    },
                    "display_name": {
                        "type": "string",
                        "maxLength": 82,
                        "description": "Name shown in reports"
                    },
                    "description": {
                        "type": "string",
                        "maxLength": 150,
                        "description": "Dimension description"
                    },
                    "scope": {
                        "type": "string",
                        "enum": ["EVENT", "USER", "ITEM"],
                        "description": "Dimension scope"
                    },
                    "disallow_ads_personalization": {
                        "type": "boolean",
                        "description": "Exclude from ads personalization (USER scope only)"
                    }
                },
                "required": ["property_id", "parameter_name", "display_name", "scope"],
                "additionalProperties": false
            }),
        ),
    ]
}

/// Handle a tool call and return the result.
pub async fn handle_tool_call(
    client: &AdminClient,
    name: &str,
    arguments: Option<Value>,
) -> ToolCallResult {
    let args = arguments.unwrap_or_else(|| json!({}));

    let outcome = match name {
        "ga4_admin_api_list_accounts" => list_accounts(client).await,
        "ga4_admin_api_get_property_details" => get_property(client, args).await,
        "ga4_admin_api_list_properties" => list_properties(client, args).await,
        "ga4_admin_api_list_data_streams" => list_data_streams(client, args).await,
        "ga4_admin_api_list_annotations" => list_annotations(client, args).await,
        "ga4_admin_api_create_annotation" => create_annotation(client, args).await,
        "ga4_admin_api_get_annotation" => get_annotation(client, args).await,
        "ga4_admin_api_update_annotation" => update_annotation(client, args).await,
        "ga4_admin_api_delete_annotation" => delete_annotation(client, args).await,
        "ga4_admin_api_list_audiences" => list_audiences(client, args).await,
        "ga4_admin_api_get_audience" => get_audience(client, args).await,
        "ga4_admin_api_create_audience" => create_audience(client, args).await,
        "ga4_admin_api_list_custom_dimensions" => list_custom_dimensions(client, args).await,
        "ga4_admin_api_get_custom_dimension" => get_custom_dimension(client, args).await,
        "ga4_admin_api_create_custom_dimension" => create_custom_dimension(client, args).await,
        _ => Err(ToolCallResult::error(format!("Unknown tool: {name}"))),
    };

    outcome.unwrap_or_else(|failure| failure)
}

/// What a remote call was about, for user-facing error texts.
struct Target<'a> {
    /// e.g. "Property"
    kind: &'static str,
    name: &'a str,
    /// Gerund phrase for generic failures, e.g. "listing audiences".
    action: &'static str,
    /// What a 400 response complains about.
    payload: &'static str,
}

impl Target<'_> {
    fn failure(&self, err: &ApiError) -> ToolCallResult {
        let text = match (err, err.status()) {
            (_, Some(404)) => format!("{} '{}' not found: {err}", self.kind, self.name),
            (_, Some(403)) => format!(
                "Permission denied to access {} '{}'. Check Service Account permissions in GA4.",
                self.kind.to_lowercase(),
                self.name
            ),
            (ApiError::Api { message, .. }, Some(400)) => {
                format!("Invalid {} data: {message}", self.payload)
            }
            (ApiError::Core(e), _) => format!("Invalid {} data: {e}", self.payload),
            _ => format!("Error {}: {err}", self.action),
        };
        ToolCallResult::error(text)
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Outcome<T> {
    serde_json::from_value(args)
        .map_err(|e| ToolCallResult::error(format!("Invalid arguments: {e}")))
}

fn invalid<E: std::fmt::Display>(e: E) -> ToolCallResult {
    ToolCallResult::error(format!("Invalid arguments: {e}"))
}

/// Empty listings answer with `empty`, otherwise `{key: items}` as JSON.
fn listing<T: serde::Serialize>(key: &str, items: &[T], empty: String) -> ToolCallResult {
    if items.is_empty() {
        return ToolCallResult::text(empty);
    }
    ToolCallResult::json(&json!({ key: items }))
}

// --- Accounts, properties, data streams ---

async fn list_accounts(client: &AdminClient) -> Outcome {
    let accounts = client.list_accounts().await.map_err(|e| {
        Target {
            kind: "Accounts",
            name: "accounts",
            action: "listing GA4 accounts",
            payload: "account",
        }
        .failure(&e)
    })?;

    Ok(listing(
        "accounts",
        &accounts,
        "No accessible GA4 accounts found.".to_string(),
    ))
}

#[derive(Deserialize)]
struct PropertyArgs {
    property_id: String,
}

impl PropertyArgs {
    fn property(&self) -> Outcome<PropertyId> {
        PropertyId::parse(&self.property_id).map_err(invalid)
    }
}

fn property_target<'a>(name: &'a str, action: &'static str, payload: &'static str) -> Target<'a> {
    Target {
        kind: "Property",
        name,
        action,
        payload,
    }
}

async fn get_property(client: &AdminClient, args: Value) -> Outcome {
    let property = parse_args::<PropertyArgs>(args)?.property()?;
    let name = property.name();

    let details = client.get_property(&property).await.map_err(|e| {
        property_target(&name, "getting property details", "property").failure(&e)
    })?;

    Ok(ToolCallResult::json(&json!({ "property": details })))
}

#[derive(Deserialize)]
struct AccountArgs {
    account_id: String,
}

async fn list_properties(client: &AdminClient, args: Value) -> Outcome {
    let args: AccountArgs = parse_args(args)?;
    let account = AccountId::parse(&args.account_id).map_err(invalid)?;
    let name = account.name();

    let properties = client.list_properties(&account).await.map_err(|e| {
        Target {
            kind: "Account",
            name: &name,
            action: "listing GA4 properties",
            payload: "account",
        }
        .failure(&e)
    })?;

    Ok(listing(
        "properties",
        &properties,
        format!("No GA4 properties found for account {account}."),
    ))
}

async fn list_data_streams(client: &AdminClient, args: Value) -> Outcome {
    let property = parse_args::<PropertyArgs>(args)?.property()?;
    let name = property.name();

    let streams = client.list_data_streams(&property).await.map_err(|e| {
        property_target(&name, "listing data streams", "data stream").failure(&e)
    })?;

    Ok(listing(
        "dataStreams",
        &streams,
        format!("No data streams found for property {property}."),
    ))
}

// --- Annotations ---

async fn list_annotations(client: &AdminClient, args: Value) -> Outcome {
    let property = parse_args::<PropertyArgs>(args)?.property()?;
    let name = property.name();

    let annotations = client.list_annotations(&property).await.map_err(|e| {
        property_target(&name, "listing annotations", "annotation").failure(&e)
    })?;

    Ok(listing(
        "annotations",
        &annotations,
        format!("No annotations found for property {property}."),
    ))
}

fn parse_color(color: Option<&str>) -> Outcome<Option<AnnotationColor>> {
    color.map(str::parse).transpose().map_err(invalid)
}

#[derive(Deserialize)]
struct CreateAnnotationArgs {
    property_id: String,
    description: String,
    start_time: String,
    end_time: Option<String>,
    title: Option<String>,
    color: Option<String>,
}

async fn create_annotation(client: &AdminClient, args: Value) -> Outcome {
    let args: CreateAnnotationArgs = parse_args(args)?;
    let property = PropertyId::parse(&args.property_id).map_err(invalid)?;
    let name = property.name();

    let draft = NewAnnotation {
        description: args.description,
        start_time: args.start_time,
        end_time: args.end_time,
        title: args.title,
        color: parse_color(args.color.as_deref())?,
    }
    .build()
    .map_err(invalid)?;

    let created = client
        .create_annotation(&property, &draft)
        .await
        .map_err(|e| property_target(&name, "creating annotation", "annotation").failure(&e))?;

    Ok(ToolCallResult::json(&json!({
        "message": "Annotation successfully created",
        "annotation": created,
    })))
}

#[derive(Deserialize)]
struct AnnotationArgs {
    property_id: String,
    annotation_id: String,
}

impl AnnotationArgs {
    fn name(&self) -> Outcome<String> {
        PropertyId::parse(&self.property_id)
            .and_then(|p| p.annotation(&self.annotation_id))
            .map_err(invalid)
    }
}

fn annotation_target<'a>(name: &'a str, action: &'static str) -> Target<'a> {
    Target {
        kind: "Annotation",
        name,
        action,
        payload: "annotation",
    }
}

async fn get_annotation(client: &AdminClient, args: Value) -> Outcome {
    let name = parse_args::<AnnotationArgs>(args)?.name()?;

    let annotation = client
        .get_annotation(&name)
        .await
        .map_err(|e| annotation_target(&name, "getting annotation").failure(&e))?;

    Ok(ToolCallResult::json(&json!({ "annotation": annotation })))
}

#[derive(Deserialize)]
struct UpdateAnnotationArgs {
    property_id: String,
    annotation_id: String,
    description: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    title: Option<String>,
    color: Option<String>,
}

async fn update_annotation(client: &AdminClient, args: Value) -> Outcome {
    let args: UpdateAnnotationArgs = parse_args(args)?;
    let name = PropertyId::parse(&args.property_id)
        .and_then(|p| p.annotation(&args.annotation_id))
        .map_err(invalid)?;

    let patch = AnnotationPatch {
        description: args.description,
        start_date: args.start_time,
        end_date: args.end_time,
        title: args.title,
        color: parse_color(args.color.as_deref())?,
    };

    let updated = client
        .patch_annotation(&name, &patch)
        .await
        .map_err(|e| annotation_target(&name, "updating annotation").failure(&e))?;

    Ok(match updated {
        Some(annotation) => ToolCallResult::json(&json!({
            "message": "Annotation successfully updated",
            "annotation": annotation,
        })),
        None => ToolCallResult::text(format!(
            "No fields to update were provided for annotation '{name}'."
        )),
    })
}

async fn delete_annotation(client: &AdminClient, args: Value) -> Outcome {
    let args: AnnotationArgs = parse_args(args)?;
    let name = args.name()?;

    client
        .delete_annotation(&name)
        .await
        .map_err(|e| annotation_target(&name, "deleting annotation").failure(&e))?;

    Ok(ToolCallResult::json(&json!({
        "message": format!(
            "Annotation '{}' successfully deleted from property '{}'.",
            args.annotation_id, args.property_id
        ),
    })))
}

// --- Audiences ---

async fn list_audiences(client: &AdminClient, args: Value) -> Outcome {
    let property = parse_args::<PropertyArgs>(args)?.property()?;
    let name = property.name();

    let audiences = client
        .list_audiences(&property)
        .await
        .map_err(|e| property_target(&name, "listing audiences", "audience").failure(&e))?;

    Ok(listing(
        "audiences",
        &audiences,
        format!("No audiences found for property {property}."),
    ))
}

#[derive(Deserialize)]
struct AudienceArgs {
    property_id: String,
    audience_id: String,
}

async fn get_audience(client: &AdminClient, args: Value) -> Outcome {
    let args: AudienceArgs = parse_args(args)?;
    let name = PropertyId::parse(&args.property_id)
        .and_then(|p| p.audience(&args.audience_id))
        .map_err(invalid)?;

    let audience = client.get_audience(&name).await.map_err(|e| {
        Target {
            kind: "Audience",
            name: &name,
            action: "getting audience",
            payload: "audience",
        }
        .failure(&e)
    })?;

    Ok(ToolCallResult::json(&json!({ "audience": audience })))
}

#[derive(Deserialize)]
struct CreateAudienceArgs {
    property_id: String,
    display_name: String,
    description: String,
    membership_duration_days: u32,
}

async fn create_audience(client: &AdminClient, args: Value) -> Outcome {
    let args: CreateAudienceArgs = parse_args(args)?;
    let property = PropertyId::parse(&args.property_id).map_err(invalid)?;
    let name = property.name();

    let audience = NewAudience {
        display_name: args.display_name,
        description: args.description,
        membership_duration_days: args.membership_duration_days,
    };
    audience.validate().map_err(invalid)?;

    let created = client
        .create_audience(&property, &audience)
        .await
        .map_err(|e| property_target(&name, "creating audience", "audience").failure(&e))?;

    Ok(ToolCallResult::json(&json!({ "audience": created })))
}

// --- Custom dimensions ---

async fn list_custom_dimensions(client: &AdminClient, args: Value) -> Outcome {
    let property = parse_args::<PropertyArgs>(args)?.property()?;
    let name = property.name();

    let dimensions = client.list_custom_dimensions(&property).await.map_err(|e| {
        property_target(&name, "listing custom dimensions", "custom dimension").failure(&e)
    })?;

    Ok(listing(
        "customDimensions",
        &dimensions,
        format!("No custom dimensions found for property {property}."),
    ))
}

#[derive(Deserialize)]
struct DimensionArgs {
    property_id: String,
    dimension_id: String,
}

async fn get_custom_dimension(client: &AdminClient, args: Value) -> Outcome {
    let args: DimensionArgs = parse_args(args)?;
    let name = PropertyId::parse(&args.property_id)
        .and_then(|p| p.custom_dimension(&args.dimension_id))
        .map_err(invalid)?;

    let dimension = client.get_custom_dimension(&name).await.map_err(|e| {
        Target {
            kind: "Custom dimension",
            name: &name,
            action: "getting custom dimension",
            payload: "custom dimension",
        }
        .failure(&e)
    })?;

    Ok(ToolCallResult::json(&json!({ "customDimension": dimension })))
}

#[derive(Deserialize)]
struct CreateDimensionArgs {
    property_id: String,
    parameter_name: String,
    display_name: String,
    description: Option<String>,
    scope: String,
    disallow_ads_personalization: Option<bool>,
}

async fn create_custom_dimension(client: &AdminClient, args: Value) -> Outcome {
    let args: CreateDimensionArgs = parse_args(args)?;
    let property = PropertyId::parse(&args.property_id).map_err(invalid)?;
    let name = property.name();

    let dimension = NewCustomDimension {
        parameter_name: args.parameter_name,
        display_name: args.display_name,
        description: args.description,
        scope: args.scope.parse::<DimensionScope>().map_err(invalid)?,
        disallow_ads_personalization: args.disallow_ads_personalization,
    }
    .normalized();
    dimension.validate().map_err(invalid)?;

    let created = client
        .create_custom_dimension(&property, &dimension)
        .await
        .map_err(|e| {
            property_target(&name, "creating custom dimension", "custom dimension").failure(&e)
        })?;

    Ok(ToolCallResult::json(&json!({ "customDimension": created })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ga4_admin_client::{ClientConfig, Credentials};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AdminClient {
        let config = ClientConfig::new(&server.uri()).unwrap();
        AdminClient::new(config, Credentials::Static("t".to_string())).unwrap()
    }

    async fn call(server: &MockServer, name: &str, args: Value) -> ToolCallResult {
        handle_tool_call(&client(server), name, Some(args)).await
    }

    fn parsed(result: &ToolCallResult) -> Value {
        assert!(!result.is_error(), "unexpected error: {}", result.joined_text());
        serde_json::from_str(&result.joined_text()).unwrap()
    }

    #[test]
    fn test_tool_names_are_unique_and_prefixed() {
        let tools = get_tool_definitions();
        let mut names: Vec<_> = tools.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), tools.len());
        assert!(names.iter().all(|n| n.starts_with("ga4_admin_api_")));
    }

    #[tokio::test]
    async fn test_list_accounts_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let result = call(&server, "ga4_admin_api_list_accounts", json!({})).await;
        assert!(!result.is_error());
        assert_eq!(result.joined_text(), "No accessible GA4 accounts found.");
    }

    #[tokio::test]
    async fn test_list_data_streams_reshapes_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/properties/42/dataStreams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dataStreams": [{
                    "name": "properties/42/dataStreams/7",
                    "type": "WEB_DATA_STREAM",
                    "displayName": "Site",
                    "webStreamData": {"measurementId": "G-XYZ"},
                    "somethingElse": true
                }]
            })))
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_list_data_streams",
            json!({"property_id": "42"}),
        )
        .await;

        assert_eq!(
            parsed(&result),
            json!({
                "dataStreams": [{
                    "name": "properties/42/dataStreams/7",
                    "type": "WEB_DATA_STREAM",
                    "displayName": "Site",
                    "webStreamData": {"measurementId": "G-XYZ"}
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_list_annotations_reports_system_generated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/properties/42/reportingDataAnnotations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reportingDataAnnotations": [
                    {
                        "name": "properties/42/reportingDataAnnotations/1",
                        "title": "Mine",
                        "color": "GREEN",
                        "annotationDate": {"year": 2024, "month": 5, "day": 6}
                    },
                    {
                        "name": "properties/42/reportingDataAnnotations/2",
                        "title": "Data change",
                        "color": "PURPLE",
                        "systemGenerated": true,
                        "annotationDate": {"year": 2024, "month": 5, "day": 7}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_list_annotations",
            json!({"property_id": "42"}),
        )
        .await;

        let body = parsed(&result);
        assert_eq!(body["annotations"][0]["systemGenerated"], false);
        assert_eq!(body["annotations"][1]["systemGenerated"], true);
    }

    #[tokio::test]
    async fn test_annotation_id_cannot_target_the_property() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        for annotation_id in ["..", "2?updateMask=title", "2#frag"] {
            let result = call(
                &server,
                "ga4_admin_api_delete_annotation",
                json!({"property_id": "42", "annotation_id": annotation_id}),
            )
            .await;
            assert!(result.is_error());
            assert!(result.joined_text().starts_with("Invalid arguments:"));
        }
    }

    #[tokio::test]
    async fn test_invalid_property_id_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_list_annotations",
            json!({"property_id": "properties/42"}),
        )
        .await;
        assert!(result.is_error());
        assert!(result.joined_text().starts_with("Invalid arguments:"));
    }

    #[tokio::test]
    async fn test_property_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/properties/42"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
            })))
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_get_property_details",
            json!({"property_id": "42"}),
        )
        .await;
        assert!(result.is_error());
        assert!(
            result
                .joined_text()
                .starts_with("Property 'properties/42' not found")
        );
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/properties/42/audiences/3"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_get_audience",
            json!({"property_id": "42", "audience_id": "3"}),
        )
        .await;
        assert_eq!(
            result.joined_text(),
            "Permission denied to access audience 'properties/42/audiences/3'. Check Service Account permissions in GA4."
        );
    }

    #[tokio::test]
    async fn test_create_annotation_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha/properties/42/reportingDataAnnotations"))
            .and(body_json(json!({
                "title": "Campaign",
                "description": "Campaign",
                "color": "BLUE",
                "systemGenerated": false,
                "annotationDateRange": {
                    "startDate": {"year": 2024, "month": 3, "day": 1},
                    "endDate": {"year": 2024, "month": 3, "day": 7}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "properties/42/reportingDataAnnotations/1",
                "title": "Campaign",
                "description": "Campaign",
                "color": "BLUE",
                "annotationDateRange": {
                    "startDate": {"year": 2024, "month": 3, "day": 1},
                    "endDate": {"year": 2024, "month": 3, "day": 7}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_create_annotation",
            json!({
                "property_id": "42",
                "description": "Campaign",
                "start_time": "2024-03-01T00:00:00Z",
                "end_time": "2024-03-07T23:59:59Z"
            }),
        )
        .await;

        let body = parsed(&result);
        assert_eq!(body["message"], "Annotation successfully created");
        assert_eq!(
            body["annotation"]["name"],
            "properties/42/reportingDataAnnotations/1"
        );
    }

    #[tokio::test]
    async fn test_create_annotation_rejects_bad_date() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_create_annotation",
            json!({"property_id": "42", "description": "x", "start_time": "March 1st"}),
        )
        .await;
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn test_update_annotation_description_only() {
        let server = MockServer::start().await;
        let name = "properties/42/reportingDataAnnotations/9";
        let existing = json!({
            "name": name,
            "title": "Launch",
            "description": "Old",
            "color": "RED",
            "annotationDate": {"year": 2024, "month": 1, "day": 2}
        });

        Mock::given(method("GET"))
            .and(path(format!("/v1alpha/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(existing))
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(format!("/v1alpha/{name}")))
            .and(query_param("updateMask", "description"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name,
                "title": "Launch",
                "description": "New",
                "color": "RED",
                "annotationDate": {"year": 2024, "month": 1, "day": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_update_annotation",
            json!({"property_id": "42", "annotation_id": "9", "description": "New"}),
        )
        .await;

        let body = parsed(&result);
        assert_eq!(body["message"], "Annotation successfully updated");
        assert_eq!(body["annotation"]["description"], "New");
    }

    #[tokio::test]
    async fn test_update_annotation_without_fields() {
        let server = MockServer::start().await;
        let name = "properties/42/reportingDataAnnotations/9";

        Mock::given(method("GET"))
            .and(path(format!("/v1alpha/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name,
                "title": "Launch",
                "color": "RED"
            })))
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_update_annotation",
            json!({"property_id": "42", "annotation_id": "9"}),
        )
        .await;

        assert!(!result.is_error());
        assert!(result.joined_text().starts_with("No fields to update"));
    }

    #[tokio::test]
    async fn test_delete_annotation_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1alpha/properties/42/reportingDataAnnotations/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_delete_annotation",
            json!({"property_id": "42", "annotation_id": "9"}),
        )
        .await;

        assert_eq!(
            parsed(&result),
            json!({"message": "Annotation '9' successfully deleted from property '42'."})
        );
    }

    #[tokio::test]
    async fn test_create_audience_out_of_range() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_create_audience",
            json!({
                "property_id": "42",
                "display_name": "Loyal",
                "description": "Came back",
                "membership_duration_days": 541
            }),
        )
        .await;
        assert!(result.is_error());
        assert!(result.joined_text().contains("540"));
    }

    #[tokio::test]
    async fn test_create_custom_dimension_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha/properties/42/customDimensions"))
            .and(body_json(json!({
                "parameterName": "plan_tier",
                "displayName": "Plan tier",
                "scope": "USER"
            })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "Duplicate parameter", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let result = call(
            &server,
            "ga4_admin_api_create_custom_dimension",
            json!({
                "property_id": "42",
                "parameter_name": "plan_tier",
                "display_name": "Plan tier",
                "description": "",
                "scope": "user"
            }),
        )
        .await;
        assert_eq!(
            result.joined_text(),
            "Invalid custom dimension data: Duplicate parameter"
        );
    }
}
