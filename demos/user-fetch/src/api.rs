//! User API client
//!
//! The fetch thunk talks to the network only through [`UserApi`], so tests
//! can swap the HTTP client for a scripted one.

use crate::config::UsersConfig;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when fetching users
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The HTTP client could not be built
    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    /// HTTP request failed (connection, timeout, ...)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Server answered with a non-success status
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body is not a list of user records
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// A user record as returned by the endpoint
///
/// Only `id` is required; any other field in the record is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// User id
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Source of user records
///
/// Explicit boxed futures keep the trait object-safe, so the store
/// environment can hold a `Box<dyn UserApi>`.
pub trait UserApi: Send + Sync {
    /// Fetch every user record
    fn fetch_users(&self) -> BoxFuture<'_, Result<Vec<User>, FetchError>>;
}

/// [`UserApi`] backed by an HTTP `GET`
#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: Client,
    endpoint: String,
}

impl HttpUserApi {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ClientSetup` if the HTTP client cannot be built
    pub fn new(config: &UsersConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The URL this client queries
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl UserApi for HttpUserApi {
    fn fetch_users(&self) -> BoxFuture<'_, Result<Vec<User>, FetchError>> {
        Box::pin(async move {
            tracing::debug!(endpoint = %self.endpoint, "Fetching users");

            let response = self
                .client
                .get(&self.endpoint)
                .send()
                .await
                .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }

            response
                .json::<Vec<User>>()
                .await
                .map_err(|e| FetchError::ResponseParseFailed(e.to_string()))
        })
    }
}
