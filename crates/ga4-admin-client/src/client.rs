//! REST client for the Analytics Admin API.

use crate::auth::{Authenticator, Credentials};
use crate::config::{ApiVersion, ClientConfig};
use crate::error::{ApiError, Result};
use ga4_admin_core::{
    AccountId, AccountSummary, AnnotationPatch, AnnotationRecord, AudienceSummary,
    CustomDimensionSummary, DataStreamSummary, NewAudience, NewCustomDimension, PropertyId,
    PropertySummary, UpdateRequest, resolve,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Page size requested from list endpoints.
const PAGE_SIZE: &str = "200";

/// Handle to the Admin API. Cheap to clone; clones share the token cache.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    config: Arc<ClientConfig>,
    auth: Arc<Authenticator>,
}

impl AdminClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let auth = Authenticator::new(http.clone(), credentials, config.scope.clone());
        Ok(Self {
            http,
            config: Arc::new(config),
            auth: Arc::new(auth),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attach the bearer token, send, and turn non-success statuses into `ApiError::Api`.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "API request failed");
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        version: ApiVersion,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.config.endpoint(version, path)?;
        debug!(url = %url, "GET request");
        let response = self.send(self.http.get(url).query(query)).await?;
        Ok(response.json().await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        version: ApiVersion,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.config.endpoint(version, path)?;
        debug!(url = %url, body = %serde_json::to_string(body)?, "POST request");
        let response = self.send(self.http.post(url).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        version: ApiVersion,
        path: &str,
        update_mask: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.config.endpoint(version, path)?;
        debug!(url = %url, update_mask, body = %serde_json::to_string(body)?, "PATCH request");
        let response = self
            .send(self.http.patch(url).query(&[("updateMask", update_mask)]).json(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, version: ApiVersion, path: &str) -> Result<()> {
        let url = self.config.endpoint(version, path)?;
        debug!(url = %url, "DELETE request");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    /// Fetch every page of a list endpoint and collect the items under `key`.
    async fn list_all<T: DeserializeOwned>(
        &self,
        version: ApiVersion,
        path: &str,
        key: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = query.to_vec();
            params.push(("pageSize", PAGE_SIZE));
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let mut page: Value = self.get(version, path, &params).await?;
            if let Some(batch) = page.get_mut(key).map(Value::take) {
                let batch: Vec<T> = serde_json::from_value(batch)?;
                items.extend(batch);
            }

            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string);

            if page_token.is_none() {
                break;
            }
        }

        debug!(path, count = items.len(), "Listed resources");
        Ok(items)
    }

    // --- Accounts, properties, data streams (v1beta) ---

    /// All accounts the caller can access.
    ///
    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        self.list_all(ApiVersion::V1Beta, "accounts", "accounts", &[])
            .await
    }

    /// Full property resource.
    ///
    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn get_property(&self, property: &PropertyId) -> Result<Value> {
        self.get(ApiVersion::V1Beta, &property.name(), &[]).await
    }

    /// Properties directly under an account.
    ///
    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn list_properties(&self, account: &AccountId) -> Result<Vec<PropertySummary>> {
        let filter = account.property_filter();
        self.list_all(
            ApiVersion::V1Beta,
            "properties",
            "properties",
            &[("filter", filter.as_str())],
        )
        .await
    }

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn list_data_streams(&self, property: &PropertyId) -> Result<Vec<DataStreamSummary>> {
        self.list_all(ApiVersion::V1Beta, &property.data_streams(), "dataStreams", &[])
            .await
    }

    // --- Reporting data annotations (v1alpha) ---

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn list_annotations(&self, property: &PropertyId) -> Result<Vec<AnnotationRecord>> {
        self.list_all(
            ApiVersion::V1Alpha,
            &property.annotations(),
            "reportingDataAnnotations",
            &[],
        )
        .await
    }

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn get_annotation(&self, name: &str) -> Result<AnnotationRecord> {
        self.get(ApiVersion::V1Alpha, name, &[]).await
    }

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn create_annotation(
        &self,
        property: &PropertyId,
        annotation: &AnnotationRecord,
    ) -> Result<AnnotationRecord> {
        self.post(ApiVersion::V1Alpha, &property.annotations(), annotation)
            .await
    }

    /// Send a resolved update. Callers should skip no-op requests.
    ///
    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn update_annotation(&self, request: &UpdateRequest) -> Result<AnnotationRecord> {
        self.patch(
            ApiVersion::V1Alpha,
            &request.resource.name,
            &request.field_mask.to_query_value(),
            &request.resource,
        )
        .await
    }

    /// Read the annotation, merge `patch` into it and write back what changed.
    ///
    /// Returns `None` without writing when the patch changes nothing.
    ///
    /// # Errors
    /// Returns `ApiError::Core` for malformed patch dates, otherwise propagates
    /// transport, auth and API errors.
    pub async fn patch_annotation(
        &self,
        name: &str,
        patch: &AnnotationPatch,
    ) -> Result<Option<AnnotationRecord>> {
        let mut existing = self.get_annotation(name).await?;
        if existing.name.is_empty() {
            existing.name = name.to_string();
        }

        let request = resolve(&existing, patch)?;
        if request.is_noop() {
            debug!(name, "Annotation update has nothing to change");
            return Ok(None);
        }

        self.update_annotation(&request).await.map(Some)
    }

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn delete_annotation(&self, name: &str) -> Result<()> {
        self.delete(ApiVersion::V1Alpha, name).await
    }

    // --- Audiences (v1alpha) ---

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn list_audiences(&self, property: &PropertyId) -> Result<Vec<AudienceSummary>> {
        self.list_all(ApiVersion::V1Alpha, &property.audiences(), "audiences", &[])
            .await
    }

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn get_audience(&self, name: &str) -> Result<Value> {
        self.get(ApiVersion::V1Alpha, name, &[]).await
    }

    /// # Errors
    /// Returns `ApiError::Core` if the audience is invalid, otherwise
    /// propagates transport, auth and API errors.
    pub async fn create_audience(&self, property: &PropertyId, audience: &NewAudience) -> Result<Value> {
        let body = audience.to_body()?;
        self.post(ApiVersion::V1Alpha, &property.audiences(), &body)
            .await
    }

    // --- Custom dimensions (v1alpha) ---

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn list_custom_dimensions(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<CustomDimensionSummary>> {
        self.list_all(
            ApiVersion::V1Alpha,
            &property.custom_dimensions(),
            "customDimensions",
            &[],
        )
        .await
    }

    /// # Errors
    /// Propagates transport, auth and API errors.
    pub async fn get_custom_dimension(&self, name: &str) -> Result<Value> {
        self.get(ApiVersion::V1Alpha, name, &[]).await
    }

    /// # Errors
    /// Returns `ApiError::Core` if the dimension is invalid, otherwise
    /// propagates transport, auth and API errors.
    pub async fn create_custom_dimension(
        &self,
        property: &PropertyId,
        dimension: &NewCustomDimension,
    ) -> Result<Value> {
        dimension.validate()?;
        self.post(ApiVersion::V1Alpha, &property.custom_dimensions(), dimension)
            .await
    }
}
