//! Per-provider extraction configuration.
//!
//! One generic pipeline serves every target site; the only thing that
//! varies between providers is this configuration record: base URL,
//! selector chains, URL path markers, endpoint templates and policy flags.
//! The defaults carry the cross-site fallback selectors observed in the
//! wild so a new provider starts from something that usually works.

use serde::{Deserialize, Serialize};

use super::selector::{SelectorChain, default_placeholder_denylist};
use crate::domain::ContentKind;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Complete configuration for one target site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    /// BCP 47 language of the catalog, e.g. "es".
    pub lang: String,
    pub base_url: String,
    pub user_agent: String,
    /// Uniform timeout applied to every outbound fetch.
    pub timeout_secs: u64,
    pub max_requests_per_second: u32,
    /// Search path template relative to the base URL; `{query}` is
    /// substituted with the form-encoded query.
    pub search_path: String,
    pub sections: Vec<SectionConfig>,
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
    pub links: LinkConfig,
    pub kind_markers: KindMarkers,
    /// Substrings marking placeholder values (inline base64 posters,
    /// pseudo-protocol iframe targets).
    pub placeholder_denylist: Vec<String>,
}

impl ProviderConfig {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: "es".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 60,
            max_requests_per_second: 4,
            search_path: "/?s={query}".to_string(),
            sections: Vec::new(),
            listing: ListingSelectors::default(),
            detail: DetailSelectors::default(),
            links: LinkConfig::default(),
            kind_markers: KindMarkers::default(),
            placeholder_denylist: default_placeholder_denylist(),
        }
    }
}

/// One home-page listing block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    /// Path template relative to the base URL; `{page}` is substituted for
    /// pagination. `None` means the section is carved out of the main
    /// document instead of its own fetch.
    pub path: Option<String>,
    /// Container selectors overriding `ListingSelectors::containers` for
    /// this section (how sites mark their "Películas" vs "Series" rows).
    pub containers: Option<Vec<String>>,
    /// Kind to assume when the entry URL carries no path marker.
    pub kind_hint: Option<ContentKind>,
}

impl SectionConfig {
    pub fn fetched(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: Some(path.to_string()),
            containers: None,
            kind_hint: None,
        }
    }

    pub fn on_main_document(name: &str, containers: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            containers: Some(containers),
            kind_hint: None,
        }
    }

    pub fn with_kind_hint(mut self, kind: ContentKind) -> Self {
        self.kind_hint = Some(kind);
        self
    }
}

/// Selectors for listing pages (home sections and search results).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Container selectors, tried in priority order; the first one that
    /// matches at least once on the page wins.
    pub containers: Vec<String>,
    pub title: SelectorChain,
    pub link: SelectorChain,
    pub poster: SelectorChain,
    /// Policy flag: the sites disagree on whether a missing poster should
    /// drop the entry or leave it null, so each provider decides.
    pub drop_on_missing_poster: bool,
    /// Per-section entry cap; keeps home pages bounded.
    pub max_entries: usize,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            containers: vec![
                ".MovieList .TPostMv".to_string(),
                "article.TPost".to_string(),
                ".movies .item".to_string(),
                ".content .item".to_string(),
                "article.item".to_string(),
                "ul.ListAnimes li article".to_string(),
            ],
            title: SelectorChain::texts(&["h2.Title", "h3.Title", ".title", "h2", "h3"]),
            link: SelectorChain::attrs("a", &["href"]),
            poster: SelectorChain::attrs("img", &["data-src", "data-lazy-src", "src"]),
            drop_on_missing_poster: false,
            max_entries: 30,
        }
    }
}

/// Inline-script episode mining for sites that render their episode list
/// from a JavaScript array instead of DOM nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEpisodes {
    /// Substring marking the script of interest, e.g. `"var episodes = ["`.
    pub marker: String,
    /// Terminator ending the array body, e.g. `"];"`.
    pub terminator: String,
    /// Episode URL template; `{page_url}` and `{episode}` are substituted.
    pub episode_url_template: String,
    /// Optional path rewrite applied to `{page_url}` first
    /// (e.g. `/anime/` -> `/ver/`).
    pub path_rewrite: Option<(String, String)>,
}

/// Selectors for detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailSelectors {
    pub title: SelectorChain,
    pub synopsis: SelectorChain,
    pub poster: SelectorChain,
    pub backdrop: SelectorChain,
    /// Chain yielding text that contains a four-digit year somewhere.
    pub year: SelectorChain,
    /// Multi-valued chain for genre/tag lists.
    pub tags: SelectorChain,
    /// Episode row containers, tried in priority order.
    pub episode_containers: Vec<String>,
    pub episode_link: SelectorChain,
    pub episode_title: SelectorChain,
    pub episode_thumbnail: SelectorChain,
    /// Chain yielding the free-text numbering token; the episode URL is
    /// used as a fallback source when the chain resolves nothing.
    pub episode_numbering: SelectorChain,
    /// Containers for the "you may also like" block.
    pub recommendation_containers: Vec<String>,
    pub script_episodes: Option<ScriptEpisodes>,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            title: SelectorChain::texts(&["h1.Title", "h1", ".product-title"]),
            synopsis: SelectorChain::texts(&[".Description p", ".overview", ".description"]),
            poster: SelectorChain::attrs(
                ".movtv-info .Image img, .poster img, .AnimeCover .Image figure img",
                &["data-src", "data-lazy-src", "src"],
            ),
            backdrop: SelectorChain::attrs(
                ".backdrop img, .TPostBg img",
                &["data-src", "src"],
            ),
            year: SelectorChain::texts(&[".Date", ".year", ".meta .date"]),
            tags: SelectorChain::texts(&[".genres a", "nav.Nvgnrs a", ".genre"]),
            episode_containers: vec![
                ".all-episodes .TPostMv".to_string(),
                ".episodios li".to_string(),
                ".episode-list li".to_string(),
                ".episodes .episode".to_string(),
            ],
            episode_link: SelectorChain::attrs("a", &["href"]),
            episode_title: SelectorChain::texts(&[".episode-title", ".Title", ".title"]),
            episode_thumbnail: SelectorChain::attrs("img", &["data-src", "data-lazy-src", "src"]),
            episode_numbering: SelectorChain::texts(&[
                ".numerando",
                ".Year",
                ".episode-number",
                ".number",
            ]),
            recommendation_containers: vec![
                ".related .TPostMv".to_string(),
                ".recommendations .item".to_string(),
            ],
            script_episodes: None,
        }
    }
}

/// URL path markers classifying an entry's content kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindMarkers {
    pub movie: Vec<String>,
    pub series: Vec<String>,
    pub anime: Vec<String>,
    pub default: ContentKind,
}

impl Default for KindMarkers {
    fn default() -> Self {
        Self {
            movie: vec!["/pelicula/".to_string(), "/movie/".to_string()],
            series: vec!["/serie/".to_string(), "/series/".to_string()],
            anime: vec!["/anime/".to_string(), "/animes/".to_string()],
            default: ContentKind::Movie,
        }
    }
}

impl KindMarkers {
    /// Classify a destination URL. Anime markers take precedence; the
    /// section hint applies before the configured default.
    pub fn classify(&self, url: &str, hint: Option<ContentKind>) -> ContentKind {
        if self.anime.iter().any(|m| url.contains(m.as_str())) {
            return ContentKind::Anime;
        }
        if self.series.iter().any(|m| url.contains(m.as_str())) {
            return ContentKind::Series;
        }
        if self.movie.iter().any(|m| url.contains(m.as_str())) {
            return ContentKind::Movie;
        }
        hint.unwrap_or(self.default)
    }

    pub fn is_anime(&self, url: &str) -> bool {
        self.anime.iter().any(|m| url.contains(m.as_str()))
    }

    pub fn is_movie(&self, url: &str) -> bool {
        self.movie.iter().any(|m| url.contains(m.as_str()))
    }
}

/// WordPress-style AJAX player endpoint triggered by server-option buttons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxEndpoint {
    /// Path relative to the base URL, e.g. `/wp-admin/admin-ajax.php`.
    pub path: String,
    /// Form fields; `{value}` is substituted with the button's data value.
    pub form: Vec<(String, String)>,
}

/// Fembed-style key exchange: an embed URL carrying a key query parameter
/// on a matching host is swapped for the real URL via a sibling API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedExchange {
    /// Substring identifying the embed host, e.g. `"fembed"`.
    pub host_marker: String,
    /// Query parameter carrying the key, e.g. `"h"`.
    pub key_param: String,
    /// API path joined to the embed URL's origin, e.g. `"/fembed/api.php"`.
    pub api_path: String,
}

/// Configuration for the link resolution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub iframe_selectors: Vec<String>,
    pub iframe_attrs: Vec<String>,
    /// Elements carrying a server/post identifier in a data attribute.
    pub option_selectors: Vec<String>,
    pub option_attrs: Vec<String>,
    pub ajax: Option<AjaxEndpoint>,
    /// GET alternative to the AJAX endpoint; `{value}` is substituted.
    pub player_get_template: Option<String>,
    pub embed_exchanges: Vec<EmbedExchange>,
    /// Hosts never worth handing to the extractor registry.
    pub host_denylist: Vec<String>,
    /// Bound on concurrent follow-up fetches and registry handoffs.
    pub max_concurrent_fetches: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            iframe_selectors: vec![
                "div.play-video iframe".to_string(),
                "iframe#player".to_string(),
                "iframe".to_string(),
            ],
            iframe_attrs: vec![
                "src".to_string(),
                "data-src".to_string(),
                "data-lazy-src".to_string(),
            ],
            option_selectors: vec![
                "[data-option]".to_string(),
                "[data-server]".to_string(),
                ".TPlayerTb .Button".to_string(),
            ],
            option_attrs: vec![
                "data-option".to_string(),
                "data-server".to_string(),
                "data-tplayernv".to_string(),
            ],
            ajax: None,
            player_get_template: None,
            embed_exchanges: vec![EmbedExchange {
                host_marker: "fembed".to_string(),
                key_param: "h".to_string(),
                api_path: "/fembed/api.php".to_string(),
            }],
            host_denylist: vec![
                "facebook.com".to_string(),
                "twitter.com".to_string(),
                "google.com".to_string(),
                "googletagmanager.com".to_string(),
                "google-analytics.com".to_string(),
                "youtube.com".to_string(),
                "disqus.com".to_string(),
            ],
            max_concurrent_fetches: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anime_marker_takes_precedence() {
        let markers = KindMarkers::default();
        assert_eq!(
            markers.classify("https://x.test/anime/serie-one-piece", None),
            ContentKind::Anime
        );
    }

    #[test]
    fn hint_applies_before_default() {
        let markers = KindMarkers::default();
        assert_eq!(
            markers.classify("https://x.test/ver/algo", Some(ContentKind::Series)),
            ContentKind::Series
        );
        assert_eq!(
            markers.classify("https://x.test/ver/algo", None),
            ContentKind::Movie
        );
    }

    #[test]
    fn base_url_is_stored_without_trailing_slash() {
        let config = ProviderConfig::new("x", "https://x.test/");
        assert_eq!(config.base_url, "https://x.test");
    }
}
