//! Recognition service - the single entry point for identifying captured audio
//!
//! 1. Check that provider credentials are configured (before any I/O)
//! 2. Encode the samples as a WAV container
//! 3. Submit segments until the provider reports a match
//! 4. Map the match to a [`Recognition`]
//!
//! Only a missing credential is reported as an error. Every network, provider
//! and parsing failure is absorbed; the caller gets a recognition or `None`
//! and decides what to show in its place.

use std::sync::Arc;
use std::time::Duration;

use crate::audio::wav::{self, Container};
use crate::capture::AudioSnapshot;
use crate::config::{Config, ProviderConfig};
use crate::recognition::{
    acrcloud::{AcrCloudClient, adapter},
    client::{FingerprintClient, IdentifyReport},
    domain::{ConfigurationError, Credentials, Recognition},
    signing::{Clock, SignedRequestBuilder, SystemClock},
    traits::FingerprintApi,
};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Tuning for the recognizer
#[derive(Debug, Clone)]
pub struct RecognizerOptions {
    /// Upper bound for each segment request
    pub request_timeout: Duration,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Identifies audio through a fingerprint provider.
pub struct Recognizer {
    provider: ProviderConfig,
    options: RecognizerOptions,
    api: Arc<dyn FingerprintApi>,
    clock: Arc<dyn Clock>,
}

impl Recognizer {
    pub fn new(
        provider: ProviderConfig,
        options: RecognizerOptions,
        api: Arc<dyn FingerprintApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            options,
            api,
            clock,
        }
    }

    /// Recognizer backed by the real HTTP client and wall clock.
    pub fn from_config(config: &Config) -> Self {
        let options = RecognizerOptions {
            request_timeout: config.recognition.request_timeout(),
        };
        let api = Arc::new(AcrCloudClient::new(options.request_timeout));
        Self::new(config.provider.clone(), options, api, Arc::new(SystemClock))
    }

    /// Validated credentials, or which one is missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigurationError> {
        self.provider.credentials()
    }

    /// Identify raw mono samples.
    pub async fn identify(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Option<Recognition>, ConfigurationError> {
        let credentials = self.credentials()?;
        if samples.is_empty() {
            tracing::debug!("No samples to identify");
            return Ok(None);
        }
        let container = wav::encode(&AudioSnapshot::new(samples.to_vec(), sample_rate));
        Ok(self.run(credentials, &container).await)
    }

    /// Identify a captured snapshot.
    pub async fn identify_snapshot(
        &self,
        snapshot: &AudioSnapshot,
    ) -> Result<Option<Recognition>, ConfigurationError> {
        let credentials = self.credentials()?;
        if snapshot.is_empty() {
            tracing::debug!("No samples to identify");
            return Ok(None);
        }
        Ok(self.run(credentials, &wav::encode(snapshot)).await)
    }

    /// Identify an already-encoded container.
    pub async fn identify_container(
        &self,
        container: &Container,
    ) -> Result<Option<Recognition>, ConfigurationError> {
        let credentials = self.credentials()?;
        if container.is_empty() {
            tracing::debug!("Container holds no audio");
            return Ok(None);
        }
        Ok(self.run(credentials, container).await)
    }

    async fn run(&self, credentials: Credentials, container: &Container) -> Option<Recognition> {
        tracing::info!(
            "Identifying {} bytes of audio ({}Hz)",
            container.len(),
            container.sample_rate()
        );

        let client = FingerprintClient::new(
            Arc::clone(&self.api),
            SignedRequestBuilder::new(credentials, Arc::clone(&self.clock)),
            self.options.request_timeout,
        );
        let IdentifyReport { matched, attempts } = client.run(container.as_bytes()).await;

        match matched {
            Some(music) => {
                let recognition = adapter::to_recognition(music);
                tracing::info!(
                    "Identified \"{}\" by {} ({}% confidence)",
                    recognition.title,
                    recognition.artist,
                    recognition.confidence
                );
                Some(recognition)
            }
            None => {
                tracing::info!("No match after {} attempt(s)", attempts.len());
                None
            }
        }
    }
}
