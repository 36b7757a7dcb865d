//! PelisplusHD: fetched catalog pages per section, server options resolved
//! through a player endpoint when the data value is not already a URL.

use crate::domain::ContentKind;
use crate::extraction::config::{ProviderConfig, SectionConfig};
use crate::extraction::selector::SelectorChain;

pub fn config() -> ProviderConfig {
    let mut config = ProviderConfig::new("PelisplusHD", "https://pelisplushd.mx");

    config.sections = vec![
        SectionConfig::fetched("Películas", "/peliculas").with_kind_hint(ContentKind::Movie),
        SectionConfig::fetched("Series", "/series").with_kind_hint(ContentKind::Series),
        SectionConfig::fetched("Anime", "/animes").with_kind_hint(ContentKind::Anime),
    ];

    // a.Posters-link cards carry their link on the container itself, so the
    // chain cannot read it; the selector still participates and falls
    // through to the richer containers.
    config.listing.containers = vec![
        ".MovieList .TPostMv".to_string(),
        "a.Posters-link".to_string(),
        ".movies .item".to_string(),
        ".series .item".to_string(),
        ".anime .item".to_string(),
    ];
    config.listing.title = SelectorChain::texts(&[
        "h2.Title",
        "h3.Title",
        ".title",
        ".listing-content p",
    ]);
    config.listing.max_entries = 20;

    config.detail.title = SelectorChain::texts(&["h1", ".title", ".movie-title"]);
    config.detail.synopsis =
        SelectorChain::texts(&[".description", ".synopsis", ".overview", ".plot"]);
    config.detail.episode_containers = vec![
        ".episodes .episode".to_string(),
        ".season .episode".to_string(),
        ".episode-list li".to_string(),
        ".TPostMv".to_string(),
    ];

    config.links.player_get_template =
        Some("/wp-content/plugins/player/player.php?data={value}".to_string());

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    #[test]
    fn builds_a_working_provider() {
        let provider = Provider::new(config()).unwrap();
        assert_eq!(provider.name(), "PelisplusHD");
    }

    #[test]
    fn server_options_use_the_player_endpoint() {
        let config = config();
        assert!(config.links.ajax.is_none());
        assert!(
            config
                .links
                .player_get_template
                .as_deref()
                .is_some_and(|t| t.contains("{value}"))
        );
    }
}
