//! EntrePeliculasySeries: one fetched page per section, generic markup.

use crate::domain::ContentKind;
use crate::extraction::config::{ProviderConfig, SectionConfig};
use crate::extraction::selector::SelectorChain;

pub fn config() -> ProviderConfig {
    let mut config = ProviderConfig::new(
        "EntrePeliculasySeries",
        "https://entrepeliculasyseries.nz",
    );

    config.sections = vec![
        SectionConfig::fetched("Películas", "/peliculas/page/{page}")
            .with_kind_hint(ContentKind::Movie),
        SectionConfig::fetched("Series", "/series/page/{page}")
            .with_kind_hint(ContentKind::Series),
        SectionConfig::fetched("Estrenos", "/estrenos/page/{page}"),
    ];

    config.listing.containers = vec![
        ".MovieList .TPostMv".to_string(),
        ".movies .item".to_string(),
        ".series .item".to_string(),
        ".releases .item".to_string(),
        ".content .item".to_string(),
        "article.item".to_string(),
    ];
    config.listing.max_entries = 20;

    config.detail.title = SelectorChain::texts(&["h1", ".title", ".movie-title"]);
    config.detail.synopsis =
        SelectorChain::texts(&[".description", ".synopsis", ".overview"]);
    config.detail.episode_containers = vec![
        ".episodes .episode".to_string(),
        ".episode-list li".to_string(),
        ".season li".to_string(),
    ];

    config
}
