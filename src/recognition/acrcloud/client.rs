//! ACRCloud HTTP client
//!
//! Sends one signed segment to the identify endpoint as `multipart/form-data`.
//! See: https://docs.acrcloud.com/reference/identification-api
//!
//! ## API Notes
//!
//! ### Status codes live in the body
//! The endpoint answers HTTP 200 for "no result" and for most provider-side
//! errors; the real outcome is `status.code` in the JSON body. Only transport
//! failures and non-2xx responses are mapped to `Network` here.
//!
//! ### Sample part
//! The segment is a byte range cut from a WAV container, so only the first
//! segment carries a RIFF header. Later segments are sent as-is.

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::dto;
use crate::recognition::domain::RecognitionError;
use crate::recognition::signing::SignedSubmission;

/// ACRCloud identify client
pub struct AcrCloudClient {
    http_client: reqwest::Client,
}

impl AcrCloudClient {
    /// Create a new client whose requests give up after `timeout`.
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send User-Agent header identifying the application
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self { http_client }
    }

    /// Submit a signed segment and parse the provider's answer.
    pub async fn identify(
        &self,
        submission: &SignedSubmission,
    ) -> Result<dto::IdentifyResponse, RecognitionError> {
        let response = self
            .http_client
            .post(&submission.url)
            .multipart(build_form(submission)?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecognitionError::Timeout
                } else {
                    RecognitionError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Network(format!(
                "HTTP {}: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown"),
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<dto::IdentifyResponse>()
            .await
            .map_err(|e| RecognitionError::Parse(e.to_string()))
    }
}

fn build_form(submission: &SignedSubmission) -> Result<Form, RecognitionError> {
    let sample = Part::bytes(submission.sample.clone())
        .file_name("sample.wav")
        .mime_str("audio/wav")
        .map_err(|e| RecognitionError::Network(e.to_string()))?;

    let form = submission
        .text_fields()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    Ok(form.part("sample", sample))
}
