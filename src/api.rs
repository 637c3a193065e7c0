//! HTTP client for the research backend.
//!
//! `ApiClient` wraps the backend's REST surface: three ingestion endpoints,
//! the research endpoint, and the health probe. It is stateless between
//! calls and normalizes every failure into [`ApiError`] — callers see one
//! message string regardless of whether the server rejected the request, the
//! connection failed, or the response body was malformed.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// Header carrying the optional research credential.
pub const API_KEY_HEADER: &str = "x-api-key";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Backend acknowledgement for any ingestion call.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestReceipt {
    pub status: String,
    pub message: String,
    pub chunks_count: usize,
}

/// Backend answer to a research query.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchAnswer {
    pub answer: String,
    pub confidence_score: f32,
    pub source_chunk_ids: Vec<String>,
}

/// Response of the health probe.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub environment: String,
}

/// Structured error body the backend attaches to error statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the research backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    server: String,
    api_key: Option<String>,
    request_timeout: Duration,
    upload_timeout: Duration,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| ApiError::Unexpected {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            server: config.server,
            api_key: config.api_key,
            request_timeout: config.request_timeout,
            upload_timeout: config.upload_timeout,
            http,
        })
    }

    /// Server origin this client talks to.
    pub fn server(&self) -> &str {
        &self.server
    }

    // -- helpers --

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{path}", self.server)
    }

    fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        with_credential: bool,
    ) -> ApiResult<T> {
        let url = self.endpoint(path);
        let mut req = self
            .http
            .post(&url)
            .timeout(self.request_timeout)
            .json(body);
        if with_credential {
            if let Some(key) = &self.api_key {
                req = req.header(API_KEY_HEADER, key.as_str());
            }
        }
        let resp = req.send().map_err(ApiError::from_transport)?;
        Self::decode(resp)
    }

    /// Status check + body decoding shared by all calls.
    ///
    /// Error statuses prefer the server's `detail` field; when the body has
    /// no such field the status line itself becomes the message.
    fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::blocking::Response) -> ApiResult<T> {
        let status = resp.status();
        if status.is_success() {
            resp.json::<T>().map_err(|e| ApiError::Unexpected {
                message: format!("malformed response body: {e}"),
            })
        } else {
            let fallback = format!("server returned {status}");
            let message = resp
                .json::<ErrorBody>()
                .map(|b| b.detail)
                .unwrap_or(fallback);
            Err(ApiError::Backend { message })
        }
    }

    // -- operations --

    /// Submit a URL (or other backend-resolvable reference) for indexing.
    pub fn ingest(&self, source: &str) -> ApiResult<IngestReceipt> {
        #[derive(Serialize)]
        struct Req<'a> {
            source: &'a str,
        }
        debug!(source, "ingesting source reference");
        self.post_json("/ingest", &Req { source }, false)
    }

    /// Submit raw text for indexing.
    pub fn ingest_text(&self, text: &str) -> ApiResult<IngestReceipt> {
        #[derive(Serialize)]
        struct Req<'a> {
            text: &'a str,
        }
        debug!(bytes = text.len(), "ingesting raw text");
        self.post_json("/ingest/text", &Req { text }, false)
    }

    /// Upload a PDF as a multipart form (field `file`).
    ///
    /// Uses the extended upload timeout. The client does not validate the
    /// file beyond being able to read it; format filtering is the view's job.
    pub fn ingest_file(&self, path: &Path) -> ApiResult<IngestReceipt> {
        let bytes = std::fs::read(path).map_err(|e| ApiError::Unexpected {
            message: format!("could not read {}: {e}", path.display()),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        debug!(file = %path.display(), bytes = bytes.len(), "uploading file");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| ApiError::Unexpected {
                message: format!("failed to build upload part: {e}"),
            })?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(self.endpoint("/ingest/file"))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .map_err(ApiError::from_transport)?;
        Self::decode(resp)
    }

    /// Ask a question against the ingested material.
    ///
    /// The configured API key, if any, is attached here and nowhere else —
    /// ingestion is treated as a local, unauthenticated operation.
    pub fn research(&self, query: &str) -> ApiResult<ResearchAnswer> {
        #[derive(Serialize)]
        struct Req<'a> {
            query: &'a str,
        }
        debug!(query, "submitting research query");
        self.post_json("/research", &Req { query }, true)
    }

    /// Probe the server's health endpoint (at the origin root, not `/api`).
    pub fn health(&self) -> ApiResult<HealthReport> {
        let url = format!("{}/health", self.server);
        let resp = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .map_err(ApiError::from_transport)?;
        Self::decode(resp)
    }
}
