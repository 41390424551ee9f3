//! HTTP client for the literature service.
//!
//! [`ApiClient`] is a thin wrapper over `reqwest`: it builds endpoint URLs from
//! the configured base, decodes the service's response envelope, and maps
//! failures into [`ApiError`] with the URL attached.

use std::time::Duration;

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::constants::{
    BATCH_IMPORT_PATH, BATCH_PROGRESS_PATH, CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL,
    DOWNLOAD_PATH, ITEM_PATH, LIST_PATH, MAX_BATCH_FILES, REQUEST_TIMEOUT_SECS, UPLOAD_PATH,
};
use super::error::ApiError;
use super::filename::download_file_name;
use super::model::{
    DownloadedFile, ImportTicket, ListQuery, Literature, LiteraturePage, UploadFile,
    decode_body, error_message,
};
use crate::user_agent;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the endpoint paths are joined onto.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout for API calls; the progress stream is exempt.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: user_agent::default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Default settings pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// HTTP client for the literature service.
///
/// Created once and cloned freely; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Builds a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL does not parse, or
    /// [`ApiError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = parse_base_url(&config.base_url)?;
        let client = build_client(config)
            .map_err(|e| ApiError::invalid_request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base })
    }

    /// Resolves an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the joined URL is malformed.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|_| ApiError::invalid_url(format!("{}{path}", self.base)))
    }

    /// URL of the progress stream for a batch import job.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the joined URL is malformed.
    pub fn progress_url(&self, import_id: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(BATCH_PROGRESS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::invalid_url(self.base.to_string()))?
            .push(import_id);
        Ok(url)
    }

    /// Fetches one page of the literature list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, status, or decode failures.
    #[instrument(skip(self), fields(page = query.page, size = query.size))]
    pub async fn list(&self, query: &ListQuery) -> Result<LiteraturePage, ApiError> {
        let url = self.endpoint(LIST_PATH)?;
        let request = self.client.get(url.clone()).query(&query.to_pairs());
        self.send_json(url.as_str(), request).await
    }

    /// Uploads a single document (multipart field `file`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, status, or decode failures.
    #[instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn upload(&self, file: &UploadFile) -> Result<Literature, ApiError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let form = reqwest::multipart::Form::new().part("file", file.to_part()?);
        let request = self.client.post(url.clone()).multipart(form);
        self.send_json(url.as_str(), request).await
    }

    /// Submits a batch import job (multipart field `files`, one part per file).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty or oversized batch,
    /// otherwise the usual network, status, or decode failures.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn start_batch_import(&self, files: &[UploadFile]) -> Result<ImportTicket, ApiError> {
        if files.is_empty() {
            return Err(ApiError::invalid_request("no files selected for import"));
        }
        if files.len() > MAX_BATCH_FILES {
            return Err(ApiError::invalid_request(format!(
                "at most {MAX_BATCH_FILES} files per batch import (got {})",
                files.len()
            )));
        }

        let url = self.endpoint(BATCH_IMPORT_PATH)?;
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            form = form.part("files", file.to_part()?);
        }
        let request = self.client.post(url.clone()).multipart(form);
        self.send_json(url.as_str(), request).await
    }

    /// Downloads a document's original file into memory.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or status failures.
    #[instrument(skip(self))]
    pub async fn download(&self, id: i64) -> Result<DownloadedFile, ApiError> {
        let url = self.endpoint(&format!("{DOWNLOAD_PATH}/{id}"))?;
        let response = self.send(url.as_str(), self.client.get(url.clone())).await?;

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let file_name = download_file_name(disposition.as_deref());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(url.as_str(), e))?;
        debug!(file_name = %file_name, bytes = bytes.len(), "download received");
        Ok(DownloadedFile {
            file_name,
            bytes: bytes.to_vec(),
        })
    }

    /// Fetches a single literature entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, status, or decode failures.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: i64) -> Result<Literature, ApiError> {
        let url = self.endpoint(&format!("{ITEM_PATH}/{id}"))?;
        self.send_json(url.as_str(), self.client.get(url.clone()))
            .await
    }

    /// Deletes a literature entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or status failures, or when the
    /// response envelope reports a failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("{ITEM_PATH}/{id}"))?;
        let response = self.send(url.as_str(), self.client.delete(url.clone())).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(url.as_str(), e))?;
        if body.is_empty() {
            return Ok(());
        }
        // Only the envelope code matters; the payload is ignored.
        decode_body::<serde_json::Value>(url.as_str(), &body).map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(url, request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(url, e))?;
        decode_body(url, &body)
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::network(url, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = error_message(&body);
        warn!(url, status = status.as_u16(), message = ?message, "request failed");
        Err(ApiError::http_status(url, status.as_u16(), message))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    // A trailing slash makes `Url::join` append rather than replace the last segment.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|_| ApiError::invalid_url(raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::invalid_url(raw));
    }
    Ok(url)
}

fn build_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .gzip(true)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::with_base_url(base)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_onto_base_without_trailing_slash() {
        let api = client("http://localhost:8081/api");
        let url = api.endpoint("literature/list").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/api/literature/list");
    }

    #[test]
    fn test_endpoint_joins_onto_root_base() {
        let api = client("http://localhost:8081");
        let url = api.endpoint("/literature/42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/literature/42");
    }

    #[test]
    fn test_progress_url_is_addressed_by_import_id() {
        let api = client("http://localhost:8081");
        let url = api.progress_url("job-42").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8081/literature/batch-import/progress/job-42"
        );
    }

    #[test]
    fn test_progress_url_escapes_import_id() {
        let api = client("http://localhost:8081");
        let url = api.progress_url("a/b").unwrap();
        assert!(url.as_str().ends_with("/progress/a%2Fb"), "{url}");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = ApiClient::new(&ClientConfig::with_base_url("not a url"));
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));

        let result = ApiClient::new(&ClientConfig::with_base_url("ftp://example.com"));
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_start_batch_import_rejects_empty_batch() {
        let api = client("http://localhost:8081");
        let err = api.start_batch_import(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_start_batch_import_rejects_oversized_batch() {
        let api = client("http://localhost:8081");
        let files: Vec<UploadFile> = (0..=MAX_BATCH_FILES)
            .map(|i| UploadFile::new(format!("{i}.txt"), vec![b'x']))
            .collect();
        let err = api.start_batch_import(&files).await.unwrap_err();
        assert!(err.to_string().contains("at most 16"), "{err}");
    }
}
