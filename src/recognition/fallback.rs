//! Placeholder substitution for callers of the recognizer.
//!
//! The recognizer never invents a result. Callers that always need something
//! to show swap in [`fallback_recognition`] and keep the [`Provenance`] label
//! so stored or printed results can tell real matches from placeholders.

use std::fmt;

use serde::Serialize;

use super::domain::Recognition;

pub const FALLBACK_TITLE: &str = "Unidentified Track";
pub const FALLBACK_ARTIST: &str = "Unknown Artist";

/// Where a recognition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    ProviderMatched,
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderMatched => write!(f, "provider-matched"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A recognition tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRecognition {
    #[serde(flatten)]
    pub recognition: Recognition,
    pub provenance: Provenance,
}

impl LabeledRecognition {
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// The fixed placeholder used when nothing matched.
pub fn fallback_recognition() -> Recognition {
    Recognition {
        title: FALLBACK_TITLE.to_string(),
        artist: FALLBACK_ARTIST.to_string(),
        album: None,
        duration_text: None,
        album_art_url: None,
        confidence: 0,
        external_link: None,
    }
}

/// Label a recognizer result, substituting the placeholder for `None`.
pub fn resolve(result: Option<Recognition>) -> LabeledRecognition {
    match result {
        Some(recognition) => LabeledRecognition {
            recognition,
            provenance: Provenance::ProviderMatched,
        },
        None => LabeledRecognition {
            recognition: fallback_recognition(),
            provenance: Provenance::Fallback,
        },
    }
}
