//! Catalog entries, detail records and episode references.

use serde::{Deserialize, Serialize};

/// Best-effort classification of a catalog entry.
///
/// Derived from URL path markers or section context; there is no
/// authoritative source, so misclassification is expected and non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Movie,
    Series,
    Anime,
}

/// One row in a browsable listing (home-page section or search results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Absolute URL of the detail page.
    pub detail_url: String,
    /// Absolute poster URL, when one survived the placeholder denylist.
    pub poster_url: Option<String>,
    pub kind: ContentKind,
}

/// A named home-page listing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub entries: Vec<CatalogEntry>,
}

/// Reference to one playable episode of serial content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Absolute URL of the episode player page.
    pub episode_url: String,
    /// Defaults to 1 when only an episode number was recoverable.
    pub season: Option<u32>,
    /// `None` only when no numeric token could be parsed from the source
    /// text. Never defaulted, to avoid giving two episodes the same
    /// identity.
    pub episode: Option<u32>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Full metadata for one title, built once per `load` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// The detail page URL this record was extracted from.
    pub url: String,
    pub title: String,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub year: Option<i32>,
    pub tags: Vec<String>,
    /// Empty for standalone movies.
    pub episodes: Vec<EpisodeRef>,
    pub recommendations: Vec<CatalogEntry>,
    pub kind: ContentKind,
}
