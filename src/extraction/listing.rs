//! Listing extractor: document -> catalog entries.
//!
//! Container selectors are tried in priority order because the sites vary
//! their markup between redesigns; within each container the field chains
//! tolerate the same variation. One unparseable row never aborts the rest
//! of the page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::config::{KindMarkers, ListingSelectors, ProviderConfig};
use super::error::{ExtractError, ExtractResult};
use super::selector::{CompiledChain, compile_selectors};
use super::urls::normalize_url;
use crate::domain::{CatalogEntry, ContentKind};

pub struct ListingExtractor {
    containers: Vec<Selector>,
    container_strings: Vec<String>,
    title: CompiledChain,
    link: CompiledChain,
    poster: CompiledChain,
    drop_on_missing_poster: bool,
    max_entries: usize,
    base_url: String,
    kind_markers: KindMarkers,
}

impl ListingExtractor {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        Self::with_selectors(config, &config.listing)
    }

    pub fn with_selectors(
        config: &ProviderConfig,
        selectors: &ListingSelectors,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            containers: compile_selectors(&selectors.containers)?,
            container_strings: selectors.containers.clone(),
            title: selectors.title.compile(&config.placeholder_denylist),
            link: selectors.link.compile(&config.placeholder_denylist),
            poster: selectors.poster.compile(&config.placeholder_denylist),
            drop_on_missing_poster: selectors.drop_on_missing_poster,
            max_entries: selectors.max_entries,
            base_url: config.base_url.clone(),
            kind_markers: config.kind_markers.clone(),
        })
    }

    /// Extract entries using the configured container chain.
    pub fn extract(
        &self,
        document: &Html,
        page_url: &str,
        kind_hint: Option<ContentKind>,
    ) -> ExtractResult<Vec<CatalogEntry>> {
        self.extract_in(&self.containers, &self.container_strings, document, page_url, kind_hint)
    }

    /// Extract entries using a section-specific container override.
    pub fn extract_with_containers(
        &self,
        containers: &[String],
        document: &Html,
        page_url: &str,
        kind_hint: Option<ContentKind>,
    ) -> ExtractResult<Vec<CatalogEntry>> {
        let compiled = compile_selectors(containers)
            .map_err(|e| ExtractError::InvalidConfig {
                message: e.to_string(),
            })?;
        self.extract_in(&compiled, containers, document, page_url, kind_hint)
    }

    fn extract_in(
        &self,
        containers: &[Selector],
        container_strings: &[String],
        document: &Html,
        page_url: &str,
        kind_hint: Option<ContentKind>,
    ) -> ExtractResult<Vec<CatalogEntry>> {
        let mut any_container_matched = false;

        for (i, selector) in containers.iter().enumerate() {
            let elements: Vec<ElementRef> = document.select(selector).collect();
            if elements.is_empty() {
                continue;
            }
            any_container_matched = true;

            let entries: Vec<CatalogEntry> = elements
                .iter()
                .filter_map(|element| self.entry_from_element(element, kind_hint))
                .take(self.max_entries)
                .collect();

            if !entries.is_empty() {
                debug!(
                    page_url,
                    container = i,
                    count = entries.len(),
                    "extracted listing entries"
                );
                return Ok(entries);
            }
        }

        if any_container_matched {
            // Containers exist but no row survived: a normal "no results"
            // outcome, distinct from a layout change.
            debug!(page_url, "containers matched but yielded no entries");
            Ok(Vec::new())
        } else {
            warn!(page_url, "no container selector matched");
            Err(ExtractError::layout_mismatch(
                page_url,
                container_strings.to_vec(),
            ))
        }
    }

    fn entry_from_element(
        &self,
        element: &ElementRef,
        kind_hint: Option<ContentKind>,
    ) -> Option<CatalogEntry> {
        let title = self.title.resolve(element)?;
        let link = self.link.resolve(element)?;
        let detail_url = normalize_url(&link, &self.base_url)?;

        let poster_url = self
            .poster
            .resolve(element)
            .and_then(|p| normalize_url(&p, &self.base_url));
        if poster_url.is_none() && self.drop_on_missing_poster {
            debug!(title, "dropping entry without poster");
            return None;
        }

        let kind = self.kind_markers.classify(&detail_url, kind_hint);
        Some(CatalogEntry {
            title,
            detail_url,
            poster_url,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.test/peliculas";

    fn config() -> ProviderConfig {
        ProviderConfig::new("test", "https://example.test")
    }

    fn listing_doc() -> Html {
        Html::parse_document(
            r#"
            <div class="MovieList">
              <article class="TPostMv">
                <a href="/pelicula/uno"><h2 class="Title">Uno</h2></a>
                <img data-src="//cdn.example.test/uno.jpg">
              </article>
              <article class="TPostMv">
                <a href="/serie/dos"><h2 class="Title">Dos</h2></a>
              </article>
              <article class="TPostMv">
                <a href="/pelicula/sin-titulo"></a>
              </article>
            </div>
            "#,
        )
    }

    #[test]
    fn extracts_entries_with_normalized_urls() {
        let extractor = ListingExtractor::new(&config()).unwrap();
        let entries = extractor.extract(&listing_doc(), PAGE, None).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Uno");
        assert_eq!(entries[0].detail_url, "https://example.test/pelicula/uno");
        assert_eq!(
            entries[0].poster_url.as_deref(),
            Some("https://cdn.example.test/uno.jpg")
        );
        assert_eq!(entries[0].kind, ContentKind::Movie);
        assert_eq!(entries[1].kind, ContentKind::Series);
        assert_eq!(entries[1].poster_url, None);
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = ListingExtractor::new(&config()).unwrap();
        let doc = listing_doc();
        let first = extractor.extract(&doc, PAGE, None).unwrap();
        let second = extractor.extract(&doc, PAGE, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn poster_policy_drops_entries_when_enabled() {
        let mut config = config();
        config.listing.drop_on_missing_poster = true;
        let extractor = ListingExtractor::new(&config).unwrap();
        let entries = extractor.extract(&listing_doc(), PAGE, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Uno");
    }

    #[test]
    fn falls_back_to_later_container_selector() {
        let doc = Html::parse_document(
            r#"
            <div class="content">
              <div class="item"><a href="/pelicula/tres"><h3>Tres</h3></a></div>
            </div>
            "#,
        );
        let extractor = ListingExtractor::new(&config()).unwrap();
        let entries = extractor.extract(&doc, PAGE, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Tres");
    }

    #[test]
    fn layout_mismatch_is_distinct_from_no_results() {
        let extractor = ListingExtractor::new(&config()).unwrap();

        let unrelated = Html::parse_document("<html><body><p>hola</p></body></html>");
        assert!(matches!(
            extractor.extract(&unrelated, PAGE, None),
            Err(ExtractError::LayoutMismatch { .. })
        ));

        // Containers present but every row invalid: empty, not an error.
        let empty_rows = Html::parse_document(
            r#"<div class="MovieList"><article class="TPostMv"><span>n/a</span></article></div>"#,
        );
        assert_eq!(extractor.extract(&empty_rows, PAGE, None).unwrap(), vec![]);
    }

    #[test]
    fn entry_cap_is_applied() {
        let mut config = config();
        config.listing.max_entries = 1;
        let extractor = ListingExtractor::new(&config).unwrap();
        let entries = extractor.extract(&listing_doc(), PAGE, None).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn section_container_override() {
        let doc = Html::parse_document(
            r#"
            <section class="home-series">
              <li><a href="/serie/cuatro"><h2 class="Title">Cuatro</h2></a></li>
            </section>
            "#,
        );
        let extractor = ListingExtractor::new(&config()).unwrap();
        let entries = extractor
            .extract_with_containers(
                &["section.home-series li".to_string()],
                &doc,
                PAGE,
                Some(ContentKind::Series),
            )
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ContentKind::Series);
    }
}
