//! AnimeFLV: browse pages per section, episode list hidden in a
//! `var episodes = [...]` script, episode URLs derived from the detail URL
//! with an `/anime/` to `/ver/` rewrite.

use crate::domain::ContentKind;
use crate::extraction::config::{ProviderConfig, ScriptEpisodes, SectionConfig};
use crate::extraction::selector::SelectorChain;

pub fn config() -> ProviderConfig {
    let mut config = ProviderConfig::new("Animeflv.net", "https://www3.animeflv.net");

    config.search_path = "/browse?q={query}".to_string();

    config.sections = vec![
        SectionConfig::on_main_document(
            "Últimos episodios",
            vec!["main.Main ul.ListEpisodios li".to_string()],
        )
        .with_kind_hint(ContentKind::Anime),
        SectionConfig::fetched("Películas", "/browse?type[]=movie&order=updated&page={page}")
            .with_kind_hint(ContentKind::Anime),
        SectionConfig::fetched("Animes", "/browse?status[]=2&order=default&page={page}")
            .with_kind_hint(ContentKind::Anime),
        SectionConfig::fetched("En emisión", "/browse?status[]=1&order=rating&page={page}")
            .with_kind_hint(ContentKind::Anime),
    ];

    config.listing.containers = vec![
        "ul.ListAnimes li article".to_string(),
        "main.Main ul.ListEpisodios li".to_string(),
    ];
    config.listing.title = SelectorChain::texts(&["h3.Title", "strong.Title", ".Title"]);
    config.listing.poster =
        SelectorChain::attrs("figure img, span img, img", &["src", "data-src"]);

    config.kind_markers.default = ContentKind::Anime;

    config.detail.title = SelectorChain::texts(&["h1.Title"]);
    config.detail.synopsis = SelectorChain::texts(&["div.Description p"]);
    config.detail.poster = SelectorChain::attrs(
        "div.AnimeCover div.Image figure img",
        &["src", "data-src"],
    );
    config.detail.tags = SelectorChain::texts(&["nav.Nvgnrs a"]);
    config.detail.script_episodes = Some(ScriptEpisodes {
        marker: "var episodes = [".to_string(),
        terminator: "];".to_string(),
        episode_url_template: "{page_url}-{episode}".to_string(),
        path_rewrite: Some(("/anime/".to_string(), "/ver/".to_string())),
    });

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    #[test]
    fn builds_a_working_provider() {
        let provider = Provider::new(config()).unwrap();
        assert_eq!(provider.name(), "Animeflv.net");
    }

    #[test]
    fn everything_defaults_to_anime() {
        let config = config();
        assert_eq!(
            config.kind_markers.classify("https://www3.animeflv.net/ver/x-1", None),
            ContentKind::Anime
        );
        assert!(config.detail.script_episodes.is_some());
    }
}
