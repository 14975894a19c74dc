//! Client configuration.

use crate::error::Result;
use std::time::Duration;
use url::Url;

/// Production endpoint of the Admin API.
pub const DEFAULT_BASE_URL: &str = "https://analyticsadmin.googleapis.com/";
/// OAuth2 scope needed for reading and editing GA4 configuration.
pub const ANALYTICS_EDIT_SCOPE: &str = "https://www.googleapis.com/auth/analytics.edit";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API surface a resource is served from.
///
/// Accounts, properties and data streams are stable in `v1beta`; annotations,
/// audiences and custom dimensions are only reachable through `v1alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1Beta,
    V1Alpha,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1Beta => "v1beta",
            Self::V1Alpha => "v1alpha",
        }
    }
}

/// Connection settings for [`crate::AdminClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root; always ends with `/`.
    pub base_url: Url,
    pub timeout: Duration,
    pub scope: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: DEFAULT_TIMEOUT,
            scope: ANALYTICS_EDIT_SCOPE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at `base_url`.
    ///
    /// # Errors
    /// Returns `ApiError::Url` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base_url: Url::parse(&base)?,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve `{version}/{path}` against the base URL.
    ///
    /// # Errors
    /// Returns `ApiError::Url` if the joined URL is invalid.
    pub fn endpoint(&self, version: ApiVersion, path: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("{}/{}", version.as_str(), path.trim_start_matches('/')))?)
    }
}
