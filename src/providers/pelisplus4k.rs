//! Pelisplus4K: same family as PelisplusHD but with card-based listing
//! markup, an `/api/search/` results page and og:image backdrops. The
//! player hop base64-encodes its server token, which the templated
//! follow-up shapes do not cover, so links rely on iframe and script
//! discovery.

use crate::domain::ContentKind;
use crate::extraction::config::{ProviderConfig, SectionConfig};
use crate::extraction::selector::SelectorChain;

pub fn config() -> ProviderConfig {
    let mut config = ProviderConfig::new("Pelisplus4K", "https://ww3.pelisplus.to");

    config.search_path = "/api/search/{query}".to_string();

    config.sections = vec![
        SectionConfig::fetched("Películas", "/peliculas").with_kind_hint(ContentKind::Movie),
        SectionConfig::fetched("Series", "/series").with_kind_hint(ContentKind::Series),
        SectionConfig::fetched("Doramas", "/doramas").with_kind_hint(ContentKind::Series),
        SectionConfig::fetched("Animes", "/animes").with_kind_hint(ContentKind::Anime),
    ];

    config.listing.containers = vec![
        ".articlesList article".to_string(),
        "article.item".to_string(),
    ];
    config.listing.title = SelectorChain::texts(&["a h2", "h2"]);
    config.listing.link = SelectorChain::attrs("a.itemA, a", &["href"]);
    config.listing.poster = SelectorChain::attrs("picture img, img", &["data-src", "src"]);

    config.kind_markers.movie = vec!["/pelicula".to_string()];
    config.kind_markers.default = ContentKind::Series;

    config.detail.title = SelectorChain::texts(&[".slugh1"]);
    config.detail.synopsis = SelectorChain::texts(&["div.description"]);
    config.detail.backdrop =
        SelectorChain::attrs(r#"head meta[property="og:image"]"#, &["content"]);
    config.detail.tags = SelectorChain::texts(&["div.home__slider .genres a"]);

    config.links.option_selectors = vec!["div ul.subselect li".to_string()];
    config.links.option_attrs = vec!["data-server".to_string()];

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    #[test]
    fn builds_a_working_provider() {
        let provider = Provider::new(config()).unwrap();
        assert_eq!(provider.name(), "Pelisplus4K");
    }

    #[test]
    fn movie_marker_without_trailing_slash_still_classifies() {
        let markers = config().kind_markers;
        assert_eq!(
            markers.classify("https://ww3.pelisplus.to/pelicula/dune-2", None),
            ContentKind::Movie
        );
        assert_eq!(
            markers.classify("https://ww3.pelisplus.to/serie/dark", None),
            ContentKind::Series
        );
    }
}
