//! Trait definitions for the fingerprint provider.
//!
//! The segment loop only talks to [`FingerprintApi`], so tests can substitute
//! a scripted provider for the real HTTP client.

use async_trait::async_trait;

use super::acrcloud::{AcrCloudClient, dto};
use super::domain::RecognitionError;
use super::signing::SignedSubmission;

/// Submits one signed segment to a fingerprint provider.
#[async_trait]
pub trait FingerprintApi: Send + Sync {
    async fn identify(
        &self,
        submission: &SignedSubmission,
    ) -> Result<dto::IdentifyResponse, RecognitionError>;
}

#[async_trait]
impl FingerprintApi for AcrCloudClient {
    async fn identify(
        &self,
        submission: &SignedSubmission,
    ) -> Result<dto::IdentifyResponse, RecognitionError> {
        self.identify(submission).await
    }
}

/// Scripted provider for testing.
#[cfg(test)]
pub mod mocks {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// One scripted answer.
    #[derive(Debug, Clone)]
    pub enum Scripted {
        /// Status 0 with a titled match
        Match(&'static str),
        /// Status 1001
        NoMatch,
        /// Any other status code
        ProviderError(i64),
        /// Status 0 with no music entries
        Empty,
        /// Connection-level failure
        Transport,
        /// Never answers
        Hang,
    }

    /// Answers submissions in order from a script and records every call.
    pub struct MockProvider {
        script: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<SignedSubmission>>,
    }

    impl MockProvider {
        pub fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Submissions received so far.
        pub fn calls(&self) -> Vec<SignedSubmission> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    pub fn match_response(title: &str) -> dto::IdentifyResponse {
        serde_json::from_value(serde_json::json!({
            "status": {"code": 0, "msg": "Success"},
            "metadata": {"music": [{
                "title": title,
                "artists": [{"name": "Mock Artist"}],
                "album": {"name": "Mock Album"},
                "duration_ms": 180000,
                "score": 95
            }]}
        }))
        .unwrap()
    }

    fn status_response(code: i64, msg: &str) -> dto::IdentifyResponse {
        dto::IdentifyResponse {
            status: dto::Status { code, msg: Some(msg.to_string()) },
            metadata: None,
        }
    }

    #[async_trait]
    impl FingerprintApi for MockProvider {
        async fn identify(
            &self,
            submission: &SignedSubmission,
        ) -> Result<dto::IdentifyResponse, RecognitionError> {
            self.calls.lock().unwrap().push(submission.clone());
            let next = self.script.lock().unwrap().pop_front();

            match next.unwrap_or(Scripted::NoMatch) {
                Scripted::Match(title) => Ok(match_response(title)),
                Scripted::NoMatch => Ok(status_response(1001, "No result")),
                Scripted::ProviderError(code) => Ok(status_response(code, "Provider failure")),
                Scripted::Empty => Ok(dto::IdentifyResponse {
                    status: dto::Status { code: 0, msg: None },
                    metadata: Some(dto::Metadata { music: vec![] }),
                }),
                Scripted::Transport => Err(RecognitionError::Network("connection reset".to_string())),
                Scripted::Hang => std::future::pending().await,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn submission() -> SignedSubmission {
            SignedSubmission {
                url: "https://example.invalid/v1/identify".to_string(),
                ordinal: 1,
                access_key: "k".to_string(),
                data_type: "audio".to_string(),
                signature_version: "1".to_string(),
                signature: "s".to_string(),
                timestamp: "0".to_string(),
                sample: vec![],
            }
        }

        #[tokio::test]
        async fn test_mock_follows_script() {
            let mock = MockProvider::new(vec![Scripted::NoMatch, Scripted::Match("Song")]);

            let first = mock.identify(&submission()).await.unwrap();
            assert_eq!(first.status.code, 1001);

            let second = mock.identify(&submission()).await.unwrap();
            assert_eq!(second.status.code, 0);
            assert_eq!(mock.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_transport_error() {
            let mock = MockProvider::new(vec![Scripted::Transport]);
            let result = mock.identify(&submission()).await;
            assert!(matches!(result, Err(RecognitionError::Network(_))));
        }
    }
}
