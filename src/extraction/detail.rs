//! Detail extractor: document -> full record with episode list.
//!
//! A page that yields no title is not an error; it is simply not a detail
//! page (dead link, redirect to the home page, full redesign). Everything
//! past the title is optional and resolved field by field.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::{KindMarkers, ProviderConfig, ScriptEpisodes};
use super::episode::parse_numbering;
use super::error::ExtractResult;
use super::listing::ListingExtractor;
use super::selector::{CompiledChain, compile_selectors};
use super::urls::normalize_url;
use crate::domain::{ContentKind, DetailRecord, EpisodeRef};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());
static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static SCRIPT_EPISODE_NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*(\d+)").unwrap());

pub struct DetailExtractor {
    title: CompiledChain,
    synopsis: CompiledChain,
    poster: CompiledChain,
    backdrop: CompiledChain,
    year: CompiledChain,
    tags: CompiledChain,
    episode_containers: Vec<Selector>,
    episode_link: CompiledChain,
    episode_title: CompiledChain,
    episode_thumbnail: CompiledChain,
    episode_numbering: CompiledChain,
    recommendation_containers: Vec<String>,
    script_episodes: Option<ScriptEpisodes>,
    recommendations: ListingExtractor,
    kind_markers: KindMarkers,
    base_url: String,
}

impl DetailExtractor {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let detail = &config.detail;
        let denylist = &config.placeholder_denylist;
        Ok(Self {
            title: detail.title.compile(denylist),
            synopsis: detail.synopsis.compile(denylist),
            poster: detail.poster.compile(denylist),
            backdrop: detail.backdrop.compile(denylist),
            year: detail.year.compile(denylist),
            tags: detail.tags.compile(denylist),
            episode_containers: compile_selectors(&detail.episode_containers)?,
            episode_link: detail.episode_link.compile(denylist),
            episode_title: detail.episode_title.compile(denylist),
            episode_thumbnail: detail.episode_thumbnail.compile(denylist),
            episode_numbering: detail.episode_numbering.compile(denylist),
            recommendation_containers: detail.recommendation_containers.clone(),
            script_episodes: detail.script_episodes.clone(),
            recommendations: ListingExtractor::new(config)?,
            kind_markers: config.kind_markers.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Extract a detail record. `Ok(None)` means "not a detail page".
    pub fn extract(&self, document: &Html, page_url: &str) -> ExtractResult<Option<DetailRecord>> {
        let root = document.root_element();

        let Some(title) = self.title.resolve(&root) else {
            debug!(page_url, "no title found, treating as not-a-detail-page");
            return Ok(None);
        };

        let synopsis = self.synopsis.resolve(&root);
        let poster_url = self
            .poster
            .resolve(&root)
            .and_then(|p| normalize_url(&p, &self.base_url));
        let backdrop_url = self
            .backdrop
            .resolve(&root)
            .and_then(|b| normalize_url(&b, &self.base_url));
        let year = self.year.resolve(&root).and_then(|text| {
            YEAR_RE
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        });
        let tags = self.tags.resolve_all(&root);

        let mut episodes = self.extract_dom_episodes(document);
        if episodes.is_empty() {
            if let Some(script_config) = &self.script_episodes {
                episodes = self.extract_script_episodes(document, page_url, script_config);
            }
        }

        let recommendations = self.extract_recommendations(document, page_url);
        let kind = self.decide_kind(page_url, &tags, &episodes);

        debug!(
            page_url,
            title,
            episodes = episodes.len(),
            ?kind,
            "extracted detail record"
        );

        Ok(Some(DetailRecord {
            url: page_url.to_string(),
            title,
            synopsis,
            poster_url,
            backdrop_url,
            year,
            tags,
            episodes,
            recommendations,
            kind,
        }))
    }

    /// Decision table for the page's content kind. Anime markers win, then
    /// an explicit movie URL marker (a movie page whose markup happens to
    /// match the episode containers must stay a movie), then a recovered
    /// episode list makes it a series.
    fn decide_kind(&self, page_url: &str, tags: &[String], episodes: &[EpisodeRef]) -> ContentKind {
        let anime_tag = tags.iter().any(|t| {
            let t = t.to_lowercase();
            t == "anime" || t == "animación" || t == "animacion"
        });
        if self.kind_markers.is_anime(page_url) || anime_tag {
            return ContentKind::Anime;
        }
        if self.kind_markers.is_movie(page_url) {
            return ContentKind::Movie;
        }
        if !episodes.is_empty() {
            return ContentKind::Series;
        }
        ContentKind::Movie
    }

    fn extract_dom_episodes(&self, document: &Html) -> Vec<EpisodeRef> {
        for selector in &self.episode_containers {
            let rows: Vec<ElementRef> = document.select(selector).collect();
            if rows.is_empty() {
                continue;
            }
            let episodes: Vec<EpisodeRef> = rows
                .iter()
                .filter_map(|row| self.episode_from_element(row))
                .collect();
            if !episodes.is_empty() {
                return episodes;
            }
        }
        Vec::new()
    }

    fn episode_from_element(&self, row: &ElementRef) -> Option<EpisodeRef> {
        let link = self.episode_link.resolve(row)?;
        let episode_url = normalize_url(&link, &self.base_url)?;

        let numbering_text = self
            .episode_numbering
            .resolve(row)
            .unwrap_or_else(|| episode_url.clone());
        let numbering = parse_numbering(&numbering_text);

        let thumbnail_url = self
            .episode_thumbnail
            .resolve(row)
            .and_then(|t| normalize_url(&t, &self.base_url));

        Some(EpisodeRef {
            episode_url,
            season: numbering.season,
            episode: numbering.episode,
            title: self.episode_title.resolve(row),
            thumbnail_url,
        })
    }

    /// Mine an inline-script episode array (`var episodes = [[7,...],...]`)
    /// when the DOM carries no episode rows.
    fn extract_script_episodes(
        &self,
        document: &Html,
        page_url: &str,
        config: &ScriptEpisodes,
    ) -> Vec<EpisodeRef> {
        let mut episodes = Vec::new();

        for script in document.select(&SCRIPT_SELECTOR) {
            let body: String = script.text().collect();
            let Some(start) = body.find(&config.marker) else {
                continue;
            };
            let tail = &body[start + config.marker.len()..];
            let array_body = match tail.find(&config.terminator) {
                Some(end) => &tail[..end],
                None => tail,
            };

            let rewritten = match &config.path_rewrite {
                Some((from, to)) => page_url.replace(from.as_str(), to.as_str()),
                None => page_url.to_string(),
            };

            for captures in SCRIPT_EPISODE_NUM_RE.captures_iter(array_body) {
                let Some(number) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok())
                else {
                    continue;
                };
                let episode_url = config
                    .episode_url_template
                    .replace("{page_url}", &rewritten)
                    .replace("{episode}", &number.to_string());
                episodes.push(EpisodeRef {
                    episode_url,
                    season: Some(1),
                    episode: Some(number),
                    title: None,
                    thumbnail_url: None,
                });
            }
            if !episodes.is_empty() {
                break;
            }
        }

        // Sites list newest first; present oldest first.
        episodes.sort_by_key(|e| e.episode);
        episodes
    }

    fn extract_recommendations(&self, document: &Html, page_url: &str) -> Vec<crate::domain::CatalogEntry> {
        if self.recommendation_containers.is_empty() {
            return Vec::new();
        }
        match self.recommendations.extract_with_containers(
            &self.recommendation_containers,
            document,
            page_url,
            None,
        ) {
            Ok(entries) => entries,
            Err(e) => {
                // Recommendations are decoration; never fail the load.
                debug!(page_url, error = %e, "no recommendations extracted");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::selector::SelectorChain;

    const PAGE: &str = "https://example.test/serie/la-casa";

    fn config() -> ProviderConfig {
        ProviderConfig::new("test", "https://example.test")
    }

    fn series_doc() -> Html {
        Html::parse_document(
            r#"
            <h1 class="Title">La Casa</h1>
            <div class="Description"><p>Una serie.</p></div>
            <div class="movtv-info"><div class="Image">
              <img data-src="/poster.jpg">
            </div></div>
            <span class="Date">Estreno 2021</span>
            <nav class="genres"><a>Drama</a><a>Crimen</a></nav>
            <ul class="episodios">
              <li>
                <a href="/episodio/la-casa-1x1">
                  <div class="numerando">1 - 1</div>
                  <img class="lazy" data-src="/ep1.jpg">
                </a>
              </li>
              <li>
                <a href="/episodio/la-casa-1x2"><div class="numerando">1 - 2</div></a>
              </li>
            </ul>
            "#,
        )
    }

    #[test]
    fn extracts_full_series_record() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let record = extractor.extract(&series_doc(), PAGE).unwrap().unwrap();

        assert_eq!(record.title, "La Casa");
        assert_eq!(record.synopsis.as_deref(), Some("Una serie."));
        assert_eq!(
            record.poster_url.as_deref(),
            Some("https://example.test/poster.jpg")
        );
        assert_eq!(record.year, Some(2021));
        assert_eq!(record.tags, vec!["Drama", "Crimen"]);
        assert_eq!(record.kind, ContentKind::Series);

        assert_eq!(record.episodes.len(), 2);
        assert_eq!(record.episodes[0].season, Some(1));
        assert_eq!(record.episodes[0].episode, Some(1));
        assert_eq!(
            record.episodes[0].episode_url,
            "https://example.test/episodio/la-casa-1x1"
        );
        assert_eq!(
            record.episodes[0].thumbnail_url.as_deref(),
            Some("https://example.test/ep1.jpg")
        );
        assert_eq!(record.episodes[1].episode, Some(2));
    }

    #[test]
    fn page_without_title_is_not_a_detail_page() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let doc = Html::parse_document("<html><body><p>404</p></body></html>");
        assert_eq!(extractor.extract(&doc, PAGE).unwrap(), None);
    }

    #[test]
    fn movie_without_episodes() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let doc = Html::parse_document(r#"<h1 class="Title">Una Peli</h1>"#);
        let record = extractor
            .extract(&doc, "https://example.test/pelicula/una-peli")
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, ContentKind::Movie);
        assert!(record.episodes.is_empty());
    }

    #[test]
    fn movie_url_marker_overrides_episode_rows() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let record = extractor
            .extract(&series_doc(), "https://example.test/pelicula/la-casa")
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, ContentKind::Movie);
    }

    #[test]
    fn anime_marker_overrides_series_decision() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let record = extractor
            .extract(&series_doc(), "https://example.test/anime/la-casa")
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, ContentKind::Anime);
    }

    #[test]
    fn numbering_falls_back_to_episode_url() {
        let mut config = config();
        config.detail.episode_numbering = SelectorChain::texts(&[".missing"]);
        let extractor = DetailExtractor::new(&config).unwrap();
        let doc = Html::parse_document(
            r#"
            <h1 class="Title">La Casa</h1>
            <ul class="episodios">
              <li><a href="/serie/la-casa/temporada/2/capitulo/5">ver</a></li>
            </ul>
            "#,
        );
        let record = extractor.extract(&doc, PAGE).unwrap().unwrap();
        assert_eq!(record.episodes[0].season, Some(2));
        assert_eq!(record.episodes[0].episode, Some(5));
    }

    #[test]
    fn unparseable_numbering_keeps_episode_null() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let doc = Html::parse_document(
            r#"
            <h1 class="Title">La Casa</h1>
            <ul class="episodios">
              <li>
                <a href="/episodio/especial">
                  <div class="numerando">Capítulo Especial</div>
                </a>
              </li>
            </ul>
            "#,
        );
        let record = extractor.extract(&doc, PAGE).unwrap().unwrap();
        assert_eq!(record.episodes[0].season, Some(1));
        assert_eq!(record.episodes[0].episode, None);
    }

    #[test]
    fn mines_script_episode_arrays() {
        let mut config = config();
        config.detail.script_episodes = Some(ScriptEpisodes {
            marker: "var episodes = [".to_string(),
            terminator: "];".to_string(),
            episode_url_template: "{page_url}-{episode}".to_string(),
            path_rewrite: Some(("/anime/".to_string(), "/ver/".to_string())),
        });
        let extractor = DetailExtractor::new(&config).unwrap();
        let doc = Html::parse_document(
            r#"
            <h1 class="Title">Mi Anime</h1>
            <script>var episodes = [[3,9955],[2,9321],[1,9100]];</script>
            "#,
        );
        let record = extractor
            .extract(&doc, "https://example.test/anime/mi-anime")
            .unwrap()
            .unwrap();
        assert_eq!(record.episodes.len(), 3);
        assert_eq!(record.episodes[0].episode, Some(1));
        assert_eq!(
            record.episodes[0].episode_url,
            "https://example.test/ver/mi-anime-1"
        );
        assert_eq!(record.kind, ContentKind::Anime);
    }

    #[test]
    fn extracts_recommendations_when_present() {
        let extractor = DetailExtractor::new(&config()).unwrap();
        let doc = Html::parse_document(
            r#"
            <h1 class="Title">Una Peli</h1>
            <div class="related">
              <article class="TPostMv">
                <a href="/pelicula/otra"><h2 class="Title">Otra</h2></a>
              </article>
            </div>
            "#,
        );
        let record = extractor.extract(&doc, PAGE).unwrap().unwrap();
        assert_eq!(record.recommendations.len(), 1);
        assert_eq!(record.recommendations[0].title, "Otra");
    }
}
