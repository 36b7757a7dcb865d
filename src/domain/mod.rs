//! Domain model for catalog extraction
//!
//! Plain data types produced by the extraction pipeline. Nothing here is
//! persisted or shared across requests; every entry point builds these
//! values fresh from a freshly fetched document.

pub mod catalog;
pub mod links;

pub use catalog::{CatalogEntry, ContentKind, DetailRecord, EpisodeRef, Section};
pub use links::{CandidateLink, MediaKindHint, StreamLink, SubtitleTrack};
