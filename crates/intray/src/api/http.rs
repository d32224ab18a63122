//! HTTP implementation of the platform backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::backend::IngestionBackend;
use crate::api::error::{truncate_error_body, ApiError, Result};
use crate::api::types::{
    AckResponse, BulkAcceptResponse, BulkRejectResponse, BulkRetryResponse, JobPage, JobQuery,
    RetryResponse, VectorRetryResponse,
};
use crate::config::ClientConfig;

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for HTTP requests (30 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectBody<'a> {
    reason: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobIdsBody<'a> {
    job_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkRejectBody<'a> {
    job_ids: &'a [String],
    reason: &'a str,
}

/// HTTP client for the ingestion platform API.
///
/// The bearer token is held as a [`SecretString`] and never logged; request
/// log lines carry only the method, path, status, and duration.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl HttpBackend {
    /// Creates a backend for the given base URL with default timeouts.
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self> {
        Self::with_timeouts(
            base_url,
            token,
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Creates a backend from a client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeouts(
            &config.base_url,
            config.resolve_token(),
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Creates a backend with explicit timeouts.
    pub fn with_timeouts(
        base_url: &str,
        token: Option<SecretString>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Executes a request and decodes the JSON response.
    ///
    /// Network errors and timeouts map to [`ApiError::Transport`]; non-2xx
    /// responses map to [`ApiError::Status`] with a truncated body.
    async fn execute<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T> {
        let start = Instant::now();
        let path = url.path().to_string();

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!(
                    "[API] {} {} FAILED {}ms",
                    method,
                    path,
                    start.elapsed().as_millis()
                );
                return Err(ApiError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        log::debug!(
            "[API] {} {} {} {}ms",
            method,
            path,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let message = match response.text().await {
                Ok(body) => truncate_error_body(&body),
                Err(_) => String::from("<unreadable body>"),
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.execute::<(), T>(Method::GET, url, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        self.execute(Method::POST, url, Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        self.execute::<(), T>(Method::POST, url, None).await
    }
}

#[async_trait]
impl IngestionBackend for HttpBackend {
    async fn list_jobs(&self, query: &JobQuery) -> Result<JobPage> {
        let mut url = self.url("/api/review/jobs")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(status) = query.status {
                pairs.append_pair("status", status.as_str());
            }
            if !query.search.is_empty() {
                pairs.append_pair("search", &query.search);
            }
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("pageSize", &query.page_size.to_string());
        }
        self.get(url).await
    }

    async fn accept_job(&self, job_id: &str) -> Result<AckResponse> {
        self.post_empty(&format!("/api/review/jobs/{job_id}/accept"))
            .await
    }

    async fn reject_job(&self, job_id: &str, reason: &str) -> Result<AckResponse> {
        self.post(
            &format!("/api/review/jobs/{job_id}/reject"),
            &RejectBody { reason },
        )
        .await
    }

    async fn bulk_accept(&self, job_ids: &[String]) -> Result<BulkAcceptResponse> {
        self.post("/api/review/jobs/accept", &JobIdsBody { job_ids })
            .await
    }

    async fn bulk_reject(&self, job_ids: &[String], reason: &str) -> Result<BulkRejectResponse> {
        self.post(
            "/api/review/jobs/reject",
            &BulkRejectBody { job_ids, reason },
        )
        .await
    }

    async fn retry_pipeline_steps(&self, job_id: &str) -> Result<RetryResponse> {
        self.post_empty(&format!("/api/pipeline/jobs/{job_id}/retry"))
            .await
    }

    async fn retry_pipeline_steps_bulk(&self, job_ids: &[String]) -> Result<BulkRetryResponse> {
        self.post("/api/pipeline/jobs/retry", &JobIdsBody { job_ids })
            .await
    }

    async fn retry_vector_index(&self, job_id: &str) -> Result<VectorRetryResponse> {
        self.post_empty(&format!("/api/vector-index/jobs/{job_id}/retry"))
            .await
    }

    async fn retry_vector_index_bulk(&self, job_ids: &[String]) -> Result<BulkRetryResponse> {
        self.post("/api/vector-index/jobs/retry", &JobIdsBody { job_ids })
            .await
    }
}
