//! Cinecalidad: dooplay theme. Player options carry full embed URLs in
//! `data-option`; entries without a poster are dropped because the site
//! uses poster-only cards.

use crate::domain::ContentKind;
use crate::extraction::config::{ProviderConfig, SectionConfig};
use crate::extraction::selector::SelectorChain;

pub fn config() -> ProviderConfig {
    let mut config = ProviderConfig::new("Cinecalidad", "https://cinecalidad.lol");

    config.sections = vec![
        SectionConfig::fetched("Series", "/ver-serie/page/{page}")
            .with_kind_hint(ContentKind::Series),
        SectionConfig::fetched("Películas", "/page/{page}").with_kind_hint(ContentKind::Movie),
        SectionConfig::fetched(
            "4K UHD",
            "/genero-de-la-pelicula/peliculas-en-calidad-4k/page/{page}",
        )
        .with_kind_hint(ContentKind::Movie),
    ];

    config.listing.containers = vec![".item.movies".to_string(), "article".to_string()];
    config.listing.title = SelectorChain::texts(&["div.in_title"]);
    config.listing.poster = SelectorChain::attrs(".poster.custom img, img", &["data-src"]);
    config.listing.drop_on_missing_poster = true;

    config.kind_markers.movie = vec!["/ver-pelicula/".to_string()];
    config.kind_markers.series = vec!["/ver-serie/".to_string(), "/episodio/".to_string()];
    config.kind_markers.default = ContentKind::Series;

    config.detail.title = SelectorChain::texts(&[".single_left h1"]);
    config.detail.synopsis =
        SelectorChain::texts(&["div.single_left table tbody tr td p"]);
    config.detail.poster = SelectorChain::attrs(".alignnone", &["data-src", "src"]);
    config.detail.episode_containers =
        vec!["div.se-c div.se-a ul.episodios li".to_string()];
    config.detail.episode_title = SelectorChain::texts(&[".episodiotitle a"]);
    config.detail.episode_thumbnail = SelectorChain::attrs("img.lazy, img", &["data-src"]);
    config.detail.episode_numbering = SelectorChain::texts(&[".numerando"]);

    config.links.option_selectors = vec![".dooplay_player_option".to_string()];
    config.links.option_attrs = vec!["data-option".to_string()];

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    #[test]
    fn builds_a_working_provider() {
        let provider = Provider::new(config()).unwrap();
        assert_eq!(provider.name(), "Cinecalidad");
    }

    #[test]
    fn classifies_by_site_specific_markers() {
        let markers = config().kind_markers;
        assert_eq!(
            markers.classify("https://cinecalidad.lol/ver-pelicula/dune/", None),
            ContentKind::Movie
        );
        assert_eq!(
            markers.classify("https://cinecalidad.lol/episodio/show-1x1/", None),
            ContentKind::Series
        );
    }
}
