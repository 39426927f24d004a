//! Leadflow HTTP Client
//!
//! A small, type-safe HTTP client for the two remote collaborators of the
//! orchestration engine: the hosted Job Store (REST rows) and the Job
//! Executor (a fire-and-forget function endpoint).
//!
//! # Example
//!
//! ```no_run
//! use leadflow_client::StoreClient;
//! use leadflow_core::domain::job::JobType;
//! use leadflow_core::dto::job::CreateJob;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), leadflow_client::ClientError> {
//!     let client = StoreClient::new("http://localhost:54321", "http://localhost:54321/run-job");
//!     let owner = uuid::Uuid::new_v4();
//!
//!     let job = client.create_job(CreateJob::new(owner, JobType::SourceCompanies)).await?;
//!     client.invoke_job(job.id).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the Job Store and Job Executor
#[derive(Debug, Clone)]
pub struct StoreClient {
    /// Base URL of the Job Store REST API
    store_url: String,
    /// Full URL of the executor function
    executor_url: String,
    /// Bearer token sent with every request, if any
    api_key: Option<String>,
    client: Client,
}

impl StoreClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `store_url` - Base URL of the Job Store (e.g., "http://localhost:54321")
    /// * `executor_url` - URL of the executor endpoint
    pub fn new(store_url: impl Into<String>, executor_url: impl Into<String>) -> Self {
        Self::with_client(store_url, executor_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        store_url: impl Into<String>,
        executor_url: impl Into<String>,
        client: Client,
    ) -> Self {
        let store_url = store_url.into();
        Self {
            store_url: store_url.trim_end_matches('/').to_string(),
            executor_url: executor_url.into(),
            api_key: None,
            client,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    pub fn executor_url(&self) -> &str {
        &self.executor_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response whose body is ignored
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
