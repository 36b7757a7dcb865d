//! Provider facade: one site, four operations.
//!
//! `get_main_page`, `search`, `load` and `load_links` wrap the synchronous
//! extractors in async orchestration. Documents are parsed inside each
//! method and never cross an await point; only owned strings do.

use std::sync::Arc;

use scraper::Html;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::domain::{CatalogEntry, DetailRecord, Section};
use crate::extraction::config::{ProviderConfig, SectionConfig};
use crate::extraction::detail::DetailExtractor;
use crate::extraction::error::{ExtractError, ExtractResult, StageOutcome};
use crate::extraction::links::{ExtractorRegistry, LinkPipeline, LinkSink, SubtitleSink};
use crate::extraction::listing::ListingExtractor;
use crate::infrastructure::http_client::HttpClient;

pub struct Provider {
    config: ProviderConfig,
    http: Arc<HttpClient>,
    listing: ListingExtractor,
    detail: DetailExtractor,
    links: Arc<LinkPipeline>,
}

impl Provider {
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let http = Arc::new(HttpClient::for_provider(&config)?);
        Self::with_http(config, http)
    }

    /// Build with a shared HTTP client (tests, shared rate limits).
    pub fn with_http(config: ProviderConfig, http: Arc<HttpClient>) -> anyhow::Result<Self> {
        Ok(Self {
            listing: ListingExtractor::new(&config)?,
            detail: DetailExtractor::new(&config)?,
            links: Arc::new(LinkPipeline::new(&config)?),
            http,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Home page: every configured section, independently. Sections that
    /// fail are logged and skipped; the call only errors when no section
    /// produced anything.
    pub async fn get_main_page(&self, page: u32) -> ExtractResult<Vec<Section>> {
        // Sections without their own path share one main-document fetch,
        // performed lazily on first need.
        let mut main_body: Option<String> = None;
        let mut outcomes = Vec::with_capacity(self.config.sections.len());

        for section in &self.config.sections {
            let outcome = match &section.path {
                Some(path) => self.fetch_section(section, path, page).await,
                None => {
                    if main_body.is_none() {
                        match self.http.get_text(&self.config.base_url, &[]).await {
                            Ok(body) => main_body = Some(body),
                            Err(e) => {
                                warn!(section = section.name, error = %e, "main document fetch failed");
                                outcomes.push((section.name.clone(), StageOutcome::Transient(e.to_string())));
                                continue;
                            }
                        }
                    }
                    let body = main_body.as_deref().unwrap_or_default();
                    self.extract_section(section, body, &self.config.base_url)
                }
            };
            outcomes.push((section.name.clone(), outcome));
        }

        collect_sections(outcomes, self.config.sections.len())
    }

    async fn fetch_section(
        &self,
        section: &SectionConfig,
        path: &str,
        page: u32,
    ) -> StageOutcome<Vec<CatalogEntry>> {
        let path = path.replace("{page}", &page.to_string());
        let url = format!("{}{}", self.config.base_url, path);
        match self.http.get_text(&url, &[]).await {
            Ok(body) => self.extract_section(section, &body, &url),
            Err(e) => {
                warn!(section = section.name, url, error = %e, "section fetch failed");
                StageOutcome::Transient(e.to_string())
            }
        }
    }

    fn extract_section(
        &self,
        section: &SectionConfig,
        body: &str,
        page_url: &str,
    ) -> StageOutcome<Vec<CatalogEntry>> {
        let document = Html::parse_document(body);
        let result = match &section.containers {
            Some(containers) => {
                self.listing
                    .extract_with_containers(containers, &document, page_url, section.kind_hint)
            }
            None => self.listing.extract(&document, page_url, section.kind_hint),
        };
        match result {
            Ok(entries) if entries.is_empty() => StageOutcome::NotFound,
            Ok(entries) => StageOutcome::Found(entries),
            Err(e) => {
                warn!(section = section.name, error = %e, "section extraction failed");
                StageOutcome::Transient(e.to_string())
            }
        }
    }

    /// Search the catalog. A layout mismatch on the results page is treated
    /// as an empty result set: sites render a bare page for zero hits.
    pub async fn search(&self, query: &str) -> ExtractResult<Vec<CatalogEntry>> {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let url = format!(
            "{}{}",
            self.config.base_url,
            self.config.search_path.replace("{query}", &encoded)
        );
        let body = self.http.get_text(&url, &[]).await?;
        let document = Html::parse_document(&body);
        match self.listing.extract(&document, &url, None) {
            Ok(entries) => {
                info!(provider = self.config.name, query, hits = entries.len(), "search done");
                Ok(entries)
            }
            Err(ExtractError::LayoutMismatch { .. }) => {
                debug!(provider = self.config.name, query, "search page had no result containers");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Load one detail page. `Ok(None)` means the URL does not point at a
    /// recognizable detail page.
    pub async fn load(&self, url: &str) -> ExtractResult<Option<DetailRecord>> {
        let body = self.http.get_text(url, &[]).await?;
        let document = Html::parse_document(&body);
        self.detail.extract(&document, url)
    }

    /// Resolve playable links for one player page. Returns true when at
    /// least one candidate was handed to the registry. `is_casting` is
    /// forwarded to logging only; candidate discovery does not depend on
    /// the playback target.
    pub async fn load_links(
        &self,
        page_url: &str,
        is_casting: bool,
        registry: Arc<dyn ExtractorRegistry>,
        on_subtitle: Arc<SubtitleSink>,
        on_link: Arc<LinkSink>,
    ) -> ExtractResult<bool> {
        debug!(provider = %self.config.name, page_url, is_casting, "resolving links");
        Arc::clone(&self.links)
            .run(
                Arc::clone(&self.http),
                page_url.to_string(),
                registry,
                on_subtitle,
                on_link,
            )
            .await
    }
}

/// Partial-failure policy for the home page: at least one section found
/// something, or the whole call fails with the number of attempts.
fn collect_sections(
    outcomes: Vec<(String, StageOutcome<Vec<CatalogEntry>>)>,
    sections_tried: usize,
) -> ExtractResult<Vec<Section>> {
    let mut sections = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            StageOutcome::Found(entries) => sections.push(Section { name, entries }),
            StageOutcome::NotFound => debug!(section = name, "section empty"),
            StageOutcome::Transient(reason) => {
                warn!(section = name, reason, "section skipped");
            }
        }
    }
    if sections.is_empty() {
        Err(ExtractError::NothingExtracted { sections_tried })
    } else {
        Ok(sections)
    }
}
