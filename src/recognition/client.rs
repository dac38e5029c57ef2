//! Per-segment submission loop.
//!
//! Segments are tried one at a time, in order, each under its own timeout.
//! The first usable match stops the loop; later segments are never sent.
//!
//! ```text
//! Idle ──(no segments)──────────────────────────▶ Failed
//!   │
//!   ▼
//! TryingSegment(i) ──(match)──────────────────────▶ Matched
//!   │  ▲
//!   │  └──(no match / error / timeout, i+1 left)──┘
//!   └──(no match / error / timeout, last)─────────▶ Failed
//! ```

use std::sync::Arc;
use std::time::Duration;

use super::acrcloud::{adapter, dto};
use super::domain::RecognitionError;
use super::segment::{self, Segment};
use super::signing::SignedRequestBuilder;
use super::traits::FingerprintApi;

/// Where the loop is.
#[derive(Debug)]
enum AttemptState {
    Idle,
    /// Index into the planned segments
    TryingSegment(usize),
    Matched(dto::Music),
    Failed,
}

/// How a single segment attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Matched,
    NoMatch,
    ProviderError { code: i64, message: String },
    Transport(String),
    TimedOut,
    /// Successful status without a usable match, or an unreadable body
    Unusable(String),
}

impl From<RecognitionError> for AttemptOutcome {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::NoMatch => Self::NoMatch,
            RecognitionError::Provider { code, message } => Self::ProviderError { code, message },
            RecognitionError::Network(msg) => Self::Transport(msg),
            RecognitionError::Timeout => Self::TimedOut,
            RecognitionError::Parse(msg) => Self::Unusable(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub segment: Segment,
    pub outcome: AttemptOutcome,
}

/// Result of running the loop over one container.
#[derive(Debug)]
pub struct IdentifyReport {
    pub matched: Option<dto::Music>,
    pub attempts: Vec<AttemptRecord>,
}

/// Drives segment planning, signing and submission against a provider.
pub struct FingerprintClient {
    api: Arc<dyn FingerprintApi>,
    signer: SignedRequestBuilder,
    timeout: Duration,
}

impl FingerprintClient {
    pub fn new(api: Arc<dyn FingerprintApi>, signer: SignedRequestBuilder, timeout: Duration) -> Self {
        Self { api, signer, timeout }
    }

    /// Try each planned segment of `container` until one matches.
    pub async fn run(&self, container: &[u8]) -> IdentifyReport {
        let segments = segment::plan(container.len());
        let mut attempts = Vec::with_capacity(segments.len());
        let mut state = AttemptState::Idle;

        loop {
            state = match state {
                AttemptState::Idle if segments.is_empty() => {
                    tracing::debug!("Nothing to submit");
                    AttemptState::Failed
                }
                AttemptState::Idle => AttemptState::TryingSegment(0),
                AttemptState::TryingSegment(i) => {
                    let segment = segments[i];
                    let result = self.attempt(container, &segment).await;
                    let outcome = match &result {
                        Ok(_) => AttemptOutcome::Matched,
                        Err(outcome) => outcome.clone(),
                    };
                    log_outcome(&segment, segments.len(), &outcome);
                    attempts.push(AttemptRecord { segment, outcome });

                    match result {
                        Ok(music) => AttemptState::Matched(music),
                        Err(_) if i + 1 < segments.len() => AttemptState::TryingSegment(i + 1),
                        Err(_) => AttemptState::Failed,
                    }
                }
                AttemptState::Matched(music) => {
                    return IdentifyReport { matched: Some(music), attempts };
                }
                AttemptState::Failed => {
                    return IdentifyReport { matched: None, attempts };
                }
            };
        }
    }

    async fn attempt(&self, container: &[u8], segment: &Segment) -> Result<dto::Music, AttemptOutcome> {
        // Signed per attempt so each request carries a fresh timestamp
        let submission = self.signer.build(container, segment);

        tokio::time::timeout(self.timeout, self.api.identify(&submission))
            .await
            .map_err(|_| RecognitionError::Timeout)
            .and_then(|response| response)
            .and_then(adapter::first_match)
            .map_err(AttemptOutcome::from)
    }
}

fn log_outcome(segment: &Segment, total: usize, outcome: &AttemptOutcome) {
    let (ordinal, start, end) = (segment.ordinal, segment.start, segment.end);
    match outcome {
        AttemptOutcome::Matched => {
            tracing::info!(segment = ordinal, start, end, "Segment {}/{} matched", ordinal, total);
        }
        AttemptOutcome::NoMatch => {
            tracing::info!(segment = ordinal, start, end, "Segment {}/{}: no match", ordinal, total);
        }
        AttemptOutcome::ProviderError { code, message } => {
            tracing::warn!(segment = ordinal, code, "Segment {}/{}: provider error: {}", ordinal, total, message);
        }
        AttemptOutcome::Transport(msg) => {
            tracing::warn!(segment = ordinal, "Segment {}/{}: request failed: {}", ordinal, total, msg);
        }
        AttemptOutcome::TimedOut => {
            tracing::warn!(segment = ordinal, "Segment {}/{}: request timed out", ordinal, total);
        }
        AttemptOutcome::Unusable(msg) => {
            tracing::warn!(segment = ordinal, "Segment {}/{}: unusable response: {}", ordinal, total, msg);
        }
    }
}
