//! `SpeechBackend` trait and `GoogleSpeechClient` REST implementation.
//!
//! Three calls cover the whole job lifecycle:
//! 1. upload the audio file to a GCS bucket,
//! 2. start a `longrunningrecognize` job against the uploaded object,
//! 3. poll the returned operation until it is done.
//!
//! Authentication is a plain OAuth bearer token carried in [`GcpConfig`]
//! (e.g. from `gcloud auth print-access-token`).  Nothing here reads the
//! environment.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GcpConfig;
use crate::speech::types::{
    LongRunningRecognizeRequest, Operation, RecognitionAudio, RecognitionConfig,
};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors from the speech/storage collaborators.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be parsed as expected JSON.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// Reading the local audio file failed.
    #[error("cannot read audio file {path}: {source}")]
    ReadAudio {
        path: String,
        source: std::io::Error,
    },

    /// No bucket configured — `start` cannot run.
    #[error("no GCS bucket configured; set gcp.bucket in settings.toml or GCS_BUCKET_NAME")]
    MissingBucket,

    /// No access token available.
    #[error("no GCP access token; set GCP_ACCESS_TOKEN (gcloud auth print-access-token)")]
    MissingToken,
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechBackend trait
// ---------------------------------------------------------------------------

/// Async boundary for the transcription-job collaborators, so command
/// handlers can be tested with fakes.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Upload a local audio file to the configured bucket under
    /// `object_name`; returns the resulting `gs://` URI.
    async fn upload(&self, local_path: &Path, object_name: &str) -> Result<String, SpeechError>;

    /// Start a long-running recognition job for `gcs_uri`; returns the
    /// server-assigned operation name.
    async fn start_recognition(&self, gcs_uri: &str) -> Result<String, SpeechError>;

    /// Fetch the current state of an operation.
    async fn poll(&self, operation_name: &str) -> Result<Operation, SpeechError>;
}

// ---------------------------------------------------------------------------
// GoogleSpeechClient
// ---------------------------------------------------------------------------

const SPEECH_API: &str = "https://speech.googleapis.com/v1";
const STORAGE_UPLOAD_API: &str = "https://storage.googleapis.com/upload/storage/v1";

/// REST implementation of [`SpeechBackend`] against the Google APIs.
pub struct GoogleSpeechClient {
    client: reqwest::Client,
    config: GcpConfig,
}

impl GoogleSpeechClient {
    /// Build a client from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.
    pub fn from_config(config: &GcpConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn token(&self) -> Result<&str, SpeechError> {
        self.config
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(SpeechError::MissingToken)
    }

    /// Turn a non-success HTTP response into `SpeechError::Api`.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SpeechError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SpeechBackend for GoogleSpeechClient {
    async fn upload(&self, local_path: &Path, object_name: &str) -> Result<String, SpeechError> {
        let bucket = self
            .config
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or(SpeechError::MissingBucket)?;
        let token = self.token()?;

        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|source| SpeechError::ReadAudio {
                path: local_path.display().to_string(),
                source,
            })?;

        log::info!(
            "uploading {} ({} bytes) to gs://{}/{}",
            local_path.display(),
            bytes.len(),
            bucket,
            object_name
        );

        let url = format!(
            "{}/b/{}/o?uploadType=media&name={}",
            STORAGE_UPLOAD_API, bucket, object_name
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        Self::check_status(response).await?;

        let gcs_uri = format!("gs://{}/{}", bucket, object_name);
        log::info!("upload complete: {}", gcs_uri);
        Ok(gcs_uri)
    }

    async fn start_recognition(&self, gcs_uri: &str) -> Result<String, SpeechError> {
        let token = self.token()?;

        let body = LongRunningRecognizeRequest {
            config: RecognitionConfig::from_config(&self.config),
            audio: RecognitionAudio {
                uri: gcs_uri.to_string(),
            },
        };

        log::info!("starting transcription for {}", gcs_uri);

        let url = format!("{}/speech:longrunningrecognize", SPEECH_API);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| SpeechError::Parse(e.to_string()))?;

        log::info!("operation started: {}", operation.name);
        Ok(operation.name)
    }

    async fn poll(&self, operation_name: &str) -> Result<Operation, SpeechError> {
        let token = self.token()?;

        let url = format!("{}/operations/{}", SPEECH_API, operation_name);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check_status(response).await?;

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| SpeechError::Parse(e.to_string()))?;
        Ok(operation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(bucket: Option<&str>, token: Option<&str>) -> GcpConfig {
        GcpConfig {
            bucket: bucket.map(|s| s.to_string()),
            access_token: token.map(|s| s.to_string()),
            ..GcpConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _client = GoogleSpeechClient::from_config(&make_config(None, None));
    }

    #[tokio::test]
    async fn upload_without_bucket_fails_fast() {
        let client = GoogleSpeechClient::from_config(&make_config(None, Some("tok")));
        let err = client
            .upload(Path::new("/tmp/a.wav"), "a.wav")
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::MissingBucket));
    }

    #[tokio::test]
    async fn upload_without_token_fails_fast() {
        let client = GoogleSpeechClient::from_config(&make_config(Some("bucket"), None));
        let err = client
            .upload(Path::new("/tmp/a.wav"), "a.wav")
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::MissingToken));
    }

    #[tokio::test]
    async fn poll_without_token_fails_fast() {
        let client = GoogleSpeechClient::from_config(&make_config(Some("bucket"), Some("")));
        let err = client.poll("operations/1").await.unwrap_err();
        assert!(matches!(err, SpeechError::MissingToken));
    }

    /// `GoogleSpeechClient` must be usable as `dyn SpeechBackend`.
    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn SpeechBackend> =
            Box::new(GoogleSpeechClient::from_config(&make_config(None, None)));
        drop(client);
    }
}
