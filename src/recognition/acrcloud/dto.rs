//! ACRCloud identify API Data Transfer Objects
//!
//! These types match what the identify endpoint returns.
//! DO NOT use these types outside the acrcloud module and the segment loop -
//! convert to domain types via the adapter.
//!
//! Every optional field is parsed leniently: a value of the wrong JSON type
//! becomes `None` instead of failing the whole response.
//!
//! Example response:
//! ```json
//! {
//!   "status": {"code": 0, "msg": "Success", "version": "1.0"},
//!   "metadata": {
//!     "music": [{
//!       "title": "Song Title",
//!       "artists": [{"name": "Artist Name"}],
//!       "album": {"name": "Album", "coverart": "https://..."},
//!       "duration_ms": 215000,
//!       "score": 100,
//!       "external_metadata": {
//!         "spotify": {"track": {"id": "4uLU6hMCjMI75M1A2tKUQC"}},
//!         "youtube": {"vid": "dQw4w9WgXcQ"}
//!       }
//!     }]
//!   }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Status code for a successful identification.
pub const STATUS_SUCCESS: i64 = 0;

/// Status code for "no result".
pub const STATUS_NO_MATCH: i64 = 1001;

/// Top-level identify response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentifyResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Status {
    pub code: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub msg: Option<String>,
}

impl Default for Status {
    // A body without a status block is not a success
    fn default() -> Self {
        Self { code: -1, msg: Some("Missing status".to_string()) }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub music: Vec<Music>,
}

/// One matched recording
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Music {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub artists: Vec<Artist>,
    #[serde(default, deserialize_with = "lenient")]
    pub album: Option<Album>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration_ms: Option<u64>,
    /// Match score (0 to 100)
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub external_metadata: Option<ExternalMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Artist {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Album {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Primary cover art URL
    #[serde(default, deserialize_with = "lenient")]
    pub coverart: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub covers: Vec<Cover>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Cover {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub spotify: Option<Spotify>,
    #[serde(default, deserialize_with = "lenient")]
    pub youtube: Option<Youtube>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Spotify {
    #[serde(default, deserialize_with = "lenient")]
    pub track: Option<SpotifyTrack>,
    #[serde(default, deserialize_with = "lenient")]
    pub album: Option<SpotifyAlbum>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpotifyTrack {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpotifyAlbum {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Image {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Youtube {
    #[serde(default, deserialize_with = "lenient")]
    pub vid: Option<String>,
}

/// Deserialize any JSON value, keeping it only if it has the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`] for lists: malformed entries are dropped individually.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let json = r#"{
            "status": {"msg": "Success", "version": "1.0", "code": 0},
            "metadata": {
                "timestamp_utc": "2024-01-01 12:00:00",
                "music": [{
                    "title": "Test Song",
                    "artists": [{"name": "Test Artist"}],
                    "album": {
                        "name": "Test Album",
                        "coverart": "https://covers.example/1.jpg",
                        "covers": [{"url": "https://covers.example/2.jpg"}]
                    },
                    "duration_ms": 215000,
                    "score": 100,
                    "acrid": "abc123",
                    "external_metadata": {
                        "spotify": {"track": {"id": "sp-track", "name": "Test Song"}},
                        "youtube": {"vid": "yt-vid"}
                    }
                }]
            },
            "cost_time": 0.7,
            "result_type": 0
        }"#;

        let response: IdentifyResponse =
            serde_json::from_str(json).expect("Should parse success response");

        assert_eq!(response.status.code, STATUS_SUCCESS);
        let music = &response.metadata.unwrap().music[0];
        assert_eq!(music.title.as_deref(), Some("Test Song"));
        assert_eq!(music.artists[0].name.as_deref(), Some("Test Artist"));
        let album = music.album.as_ref().unwrap();
        assert_eq!(album.name.as_deref(), Some("Test Album"));
        assert_eq!(album.covers.len(), 1);
        assert_eq!(music.duration_ms, Some(215_000));
        assert_eq!(music.score, Some(100.0));
        let external = music.external_metadata.as_ref().unwrap();
        assert_eq!(
            external.spotify.as_ref().unwrap().track.as_ref().unwrap().id.as_deref(),
            Some("sp-track")
        );
        assert_eq!(external.youtube.as_ref().unwrap().vid.as_deref(), Some("yt-vid"));
    }

    #[test]
    fn test_parse_no_match_response() {
        let json = r#"{"status": {"msg": "No result", "version": "1.0", "code": 1001}}"#;

        let response: IdentifyResponse =
            serde_json::from_str(json).expect("Should parse no-match response");

        assert_eq!(response.status.code, STATUS_NO_MATCH);
        assert_eq!(response.status.msg.as_deref(), Some("No result"));
        assert!(response.metadata.is_none());
    }

    #[test]
    fn test_missing_status_is_not_success() {
        let response: IdentifyResponse = serde_json::from_str("{}").unwrap();
        assert_ne!(response.status.code, STATUS_SUCCESS);
    }

    #[test]
    fn test_wrong_types_degrade_to_none() {
        let json = r#"{
            "status": {"code": 0, "msg": 42},
            "metadata": {
                "music": [{
                    "title": "Song",
                    "artists": "not-a-list",
                    "album": ["wrong"],
                    "duration_ms": "215000",
                    "score": "high",
                    "external_metadata": {"spotify": 7}
                }]
            }
        }"#;

        let response: IdentifyResponse =
            serde_json::from_str(json).expect("Malformed fields must not fail the parse");

        assert!(response.status.msg.is_none());
        let music = &response.metadata.unwrap().music[0];
        assert_eq!(music.title.as_deref(), Some("Song"));
        assert!(music.artists.is_empty());
        assert!(music.album.is_none());
        assert!(music.duration_ms.is_none());
        assert!(music.score.is_none());
        assert!(music.external_metadata.as_ref().unwrap().spotify.is_none());
    }

    #[test]
    fn test_malformed_list_entries_are_skipped() {
        let json = r#"{
            "status": {"code": 0},
            "metadata": {"music": [42, {"title": "Second"}]}
        }"#;

        let response: IdentifyResponse = serde_json::from_str(json).unwrap();
        let music = response.metadata.unwrap().music;
        assert_eq!(music.len(), 1);
        assert_eq!(music[0].title.as_deref(), Some("Second"));
    }
}
