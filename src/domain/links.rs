//! Candidate links discovered by the link pipeline and the playable-stream
//! descriptors reported back through the extractor registry.

use serde::{Deserialize, Serialize};

/// Rough media classification from the URL shape alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKindHint {
    Unknown,
    Hls,
    Progressive,
}

/// A discovered URL that might resolve to a playable stream.
///
/// Produced transiently by the link pipeline and handed one-by-one to the
/// external extractor registry; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// Absolute URL.
    pub url: String,
    /// Host name of the URL, when it parses.
    pub source_hint: Option<String>,
    /// True when the URL points at a media file rather than an embed page.
    pub is_direct_media: bool,
    pub media_kind: MediaKindHint,
}

impl CandidateLink {
    /// Classify an absolute URL by its path extension.
    pub fn from_url(url: String) -> Self {
        let source_hint = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned));
        let path = url::Url::parse(&url)
            .map(|u| u.path().to_ascii_lowercase())
            .unwrap_or_else(|_| url.to_ascii_lowercase());
        let media_kind = if path.ends_with(".m3u8") {
            MediaKindHint::Hls
        } else if path.ends_with(".mp4") || path.ends_with(".mkv") {
            MediaKindHint::Progressive
        } else {
            MediaKindHint::Unknown
        };
        Self {
            url,
            source_hint,
            is_direct_media: media_kind != MediaKindHint::Unknown,
            media_kind,
        }
    }
}

/// A playable stream reported by the extractor registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    pub url: String,
    /// Human-readable source label, e.g. the embed host name.
    pub label: String,
    /// Vertical resolution hint, when the extractor knows it.
    pub quality: Option<u32>,
    /// True for adaptive streams (HLS/DASH manifests).
    pub is_adaptive: bool,
}

/// A subtitle track reported by the extractor registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_hls_manifests() {
        let link = CandidateLink::from_url("https://cdn.example.test/v/master.m3u8?token=x".into());
        assert_eq!(link.media_kind, MediaKindHint::Hls);
        assert!(link.is_direct_media);
        assert_eq!(link.source_hint.as_deref(), Some("cdn.example.test"));
    }

    #[test]
    fn classifies_progressive_files() {
        let link = CandidateLink::from_url("https://cdn.example.test/v/movie.mp4".into());
        assert_eq!(link.media_kind, MediaKindHint::Progressive);
        assert!(link.is_direct_media);
    }

    #[test]
    fn embed_pages_stay_unknown() {
        let link = CandidateLink::from_url("https://streamtape.com/e/abc123".into());
        assert_eq!(link.media_kind, MediaKindHint::Unknown);
        assert!(!link.is_direct_media);
    }
}
