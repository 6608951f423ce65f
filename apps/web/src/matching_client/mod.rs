//! Matching API client: the single point of entry for the external CV,
//! cover-letter and job-scanning services.
//!
//! Every response is wrapped in a `{success, data | error}` envelope. The
//! envelope is decoded once here; callers only ever see a typed payload or
//! an `ApiError`. Requests are never retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ai::upload::CvUpload;

pub mod types;

pub use types::{
    CoverLetter, CoverLetterRequest, CvAnalysis, JobMatch, JobScanRequest, OptimizeCvRequest,
    OptimizedCv,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("API reported failure: {0}")]
    Rejected(String),

    #[error("API reported success without data")]
    MissingData,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The uniform response wrapper. `data` stays untyped until `success` has
/// been checked so a failure body never trips payload parsing.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Envelope {
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.success {
            let reason = match self.error {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => "unspecified error".to_string(),
            };
            return Err(ApiError::Rejected(reason));
        }
        let data = self.data.ok_or(ApiError::MissingData)?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Decodes an envelope body into the endpoint's payload type.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice::<Envelope>(body)?.into_payload()
}

/// The external services the interaction panels talk to.
///
/// Carried by `InteractionFacade` as `Arc<dyn MatchingApi>` so tests can swap
/// in a fake.
#[async_trait]
pub trait MatchingApi: Send + Sync {
    async fn analyze_cv(&self, upload: &CvUpload) -> Result<CvAnalysis, ApiError>;

    async fn optimize_cv(&self, request: &OptimizeCvRequest) -> Result<OptimizedCv, ApiError>;

    async fn generate_cover_letter(
        &self,
        request: &CoverLetterRequest,
    ) -> Result<CoverLetter, ApiError>;

    async fn scan_jobs(&self, request: &JobScanRequest) -> Result<Vec<JobMatch>, ApiError>;
}

/// reqwest-backed implementation of `MatchingApi`.
#[derive(Clone)]
pub struct HttpMatchingApi {
    client: Client,
    base_url: String,
}

impl HttpMatchingApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        read_envelope(path, response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Matching API {path} returned {status}: {body}");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    debug!("Matching API {path} returned {} bytes", bytes.len());
    decode_envelope(&bytes)
}

#[async_trait]
impl MatchingApi for HttpMatchingApi {
    async fn analyze_cv(&self, upload: &CvUpload) -> Result<CvAnalysis, ApiError> {
        let part = multipart::Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(upload.kind.mime())?;
        let form = multipart::Form::new().part("cv", part);

        let response = self
            .client
            .post(self.endpoint("analyze-cv"))
            .multipart(form)
            .send()
            .await?;
        read_envelope("analyze-cv", response).await
    }

    async fn optimize_cv(&self, request: &OptimizeCvRequest) -> Result<OptimizedCv, ApiError> {
        self.post_json("optimize-cv", request).await
    }

    async fn generate_cover_letter(
        &self,
        request: &CoverLetterRequest,
    ) -> Result<CoverLetter, ApiError> {
        self.post_json("generate-cover-letter", request).await
    }

    async fn scan_jobs(&self, request: &JobScanRequest) -> Result<Vec<JobMatch>, ApiError> {
        self.post_json("scan-jobs", request).await
    }
}
