//! ga4-admin-client: Authenticated REST access to the GA4 Admin API.
//!
//! This crate provides:
//! - `Credentials` and `Authenticator`: service account, authorized user or static tokens
//! - `AdminClient`: typed calls for accounts, properties, annotations, audiences and dimensions
//! - `ClientConfig`: base URL, timeout and scope

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::{Authenticator, AuthorizedUser, Credentials, ServiceAccountKey};
pub use client::AdminClient;
pub use config::{ANALYTICS_EDIT_SCOPE, ApiVersion, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, Result};
