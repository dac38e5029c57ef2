//! Adapter layer: Convert ACRCloud DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! Missing or malformed fields become absent optional fields; mapping never
//! fails once a usable match has been found.

use super::dto;
use crate::recognition::domain::{Recognition, RecognitionError};

/// Confidence reported when the provider omits a score.
pub const DEFAULT_CONFIDENCE: u8 = 70;

const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Classify a response: the first usable match, or why there isn't one.
pub fn first_match(response: dto::IdentifyResponse) -> Result<dto::Music, RecognitionError> {
    match response.status.code {
        dto::STATUS_SUCCESS => {}
        dto::STATUS_NO_MATCH => return Err(RecognitionError::NoMatch),
        code => {
            return Err(RecognitionError::Provider {
                code,
                message: response.status.msg.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }
    }

    response
        .metadata
        .and_then(|m| m.music.into_iter().next())
        .filter(is_usable)
        .ok_or_else(|| RecognitionError::Parse("Success response without a titled match".to_string()))
}

/// A match is usable once it names the track.
pub fn is_usable(music: &dto::Music) -> bool {
    music.title.as_deref().is_some_and(|t| !t.trim().is_empty())
}

/// Convert a provider match to a [`Recognition`].
pub fn to_recognition(music: dto::Music) -> Recognition {
    let album_art_url = album_art(&music);
    let external_link = external_link(&music);

    // Only the lead artist counts; later entries are features
    let artist = music
        .artists
        .into_iter()
        .next()
        .and_then(|a| a.name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Recognition {
        title: music.title.unwrap_or_default(),
        artist,
        album: music.album.and_then(|a| a.name),
        duration_text: music.duration_ms.map(format_duration),
        album_art_url,
        confidence: confidence(music.score),
        external_link,
    }
}

/// Album art: primary cover art, then the covers list, then Spotify images.
fn album_art(music: &dto::Music) -> Option<String> {
    let album = music.album.as_ref();
    album
        .and_then(|a| a.coverart.clone())
        .or_else(|| album.and_then(|a| a.covers.iter().find_map(|c| c.url.clone())))
        .or_else(|| {
            music
                .external_metadata
                .as_ref()
                .and_then(|e| e.spotify.as_ref())
                .and_then(|s| s.album.as_ref())
                .and_then(|a| a.images.iter().find_map(|i| i.url.clone()))
        })
        .filter(|url| !url.is_empty())
}

/// Spotify track page if known, otherwise the YouTube video.
fn external_link(music: &dto::Music) -> Option<String> {
    let external = music.external_metadata.as_ref()?;

    let spotify = external
        .spotify
        .as_ref()
        .and_then(|s| s.track.as_ref())
        .and_then(|t| t.id.as_deref())
        .filter(|id| !id.is_empty())
        .map(|id| format!("https://open.spotify.com/track/{}", id));

    spotify.or_else(|| {
        external
            .youtube
            .as_ref()
            .and_then(|y| y.vid.as_deref())
            .filter(|vid| !vid.is_empty())
            .map(|vid| format!("https://www.youtube.com/watch?v={}", vid))
    })
}

/// Milliseconds to `m:ss`.
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Provider score clamped to 0..=100, or [`DEFAULT_CONFIDENCE`].
fn confidence(score: Option<f64>) -> u8 {
    match score {
        Some(s) if s.is_finite() => s.round().clamp(0.0, 100.0) as u8,
        _ => DEFAULT_CONFIDENCE,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every mapped recognition has a confidence within 0..=100
        #[test]
        fn confidence_always_bounded(score in proptest::option::of(proptest::num::f64::ANY)) {
            let music = dto::Music {
                title: Some("T".to_string()),
                score,
                ..Default::default()
            };
            let recognition = to_recognition(music);
            prop_assert!(recognition.confidence <= 100);
        }
    }
}
