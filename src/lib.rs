//! cartelera: tolerant content extraction for Spanish-language streaming
//! catalogs.
//!
//! The crate turns messy, frequently-redesigned listing sites into typed
//! catalog data through one generic pipeline driven entirely by per-site
//! configuration: an ordered selector-chain resolver, a listing extractor,
//! a detail extractor and a link resolution pipeline. Sites differ only by
//! the data values under [`providers`]; there is no site-specific code
//! path anywhere in the pipeline.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cartelera::{Provider, providers};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider = Provider::new(providers::cuevana::config())?;
//! let sections = provider.get_main_page(1).await?;
//! for section in &sections {
//!     println!("{}: {} entries", section.name, section.entries.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod extraction;
pub mod infrastructure;
pub mod provider;
pub mod providers;

pub use domain::{
    CandidateLink, CatalogEntry, ContentKind, DetailRecord, EpisodeRef, MediaKindHint, Section,
    StreamLink, SubtitleTrack,
};
pub use extraction::{
    ExtractError, ExtractResult, ExtractorRegistry, LinkSink, ProviderConfig, StageOutcome,
    SubtitleSink,
};
pub use infrastructure::{init_logging, init_logging_with_config};
pub use provider::Provider;
