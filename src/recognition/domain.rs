//! Internal domain models for track recognition.
//!
//! These types are OUR types - they don't change when the provider's API
//! changes. Provider responses get converted into these via the adapter.

use serde::Serialize;

/// A track identified from captured audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Track length as `m:ss`
    pub duration_text: Option<String>,
    pub album_art_url: Option<String>,
    /// Match confidence (0 to 100)
    pub confidence: u8,
    /// Link to the track on an external service
    pub external_link: Option<String>,
}

/// Validated provider credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Provider host, e.g. `identify-eu-west-1.acrcloud.com`
    pub host: String,
    pub access_key: String,
    pub access_secret: String,
}

/// Required provider settings are missing.
///
/// This is the only error that escapes an identification call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing provider credential: {0}")]
    MissingCredential(&'static str),
}

/// Failure of a single segment attempt.
///
/// These never reach the caller of `identify`; they decide whether the next
/// segment is tried and end up in the logs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("No match found")]
    NoMatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_serializes() {
        let recognition = Recognition {
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            album: None,
            duration_text: Some("3:05".to_string()),
            album_art_url: None,
            confidence: 90,
            external_link: None,
        };

        let json = serde_json::to_value(&recognition).unwrap();
        assert_eq!(json["title"], "Song");
        assert_eq!(json["confidence"], 90);
        assert!(json["album"].is_null());
    }

    #[test]
    fn test_error_display() {
        let err = RecognitionError::Provider {
            code: 3001,
            message: "Missing/Invalid Access Key".to_string(),
        };
        assert!(err.to_string().contains("3001"));

        let err = ConfigurationError::MissingCredential("access_secret");
        assert!(err.to_string().contains("access_secret"));
    }
}
