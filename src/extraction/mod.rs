//! Tolerant HTML extraction for Spanish-language catalog sites.
//!
//! Everything in this module is synchronous: documents are parsed and
//! walked on the calling task, and only owned strings cross await points.
//! The async orchestration lives in [`crate::provider`] and in the link
//! pipeline's follow-up stages.

pub mod config;
pub mod detail;
pub mod episode;
pub mod error;
pub mod links;
pub mod listing;
pub mod selector;
pub mod urls;

pub use config::{ProviderConfig, SectionConfig};
pub use detail::DetailExtractor;
pub use episode::{EpisodeNumbering, parse_numbering};
pub use error::{ExtractError, ExtractResult, StageOutcome};
pub use links::{ExtractorRegistry, LinkPipeline, LinkSink, SubtitleSink};
pub use listing::ListingExtractor;
pub use selector::{SelectorChain, SelectorStep};
pub use urls::normalize_url;
