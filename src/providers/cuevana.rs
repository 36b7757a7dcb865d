//! Cuevana: both home sections live on the main document, and the player
//! buttons go through the WordPress `doo_player_ajax` endpoint.

use crate::domain::ContentKind;
use crate::extraction::config::{AjaxEndpoint, ProviderConfig, SectionConfig};
use crate::extraction::selector::SelectorChain;

pub fn config() -> ProviderConfig {
    let mut config = ProviderConfig::new("Cuevana", "https://cuevana3.vip");

    config.sections = vec![
        SectionConfig::on_main_document(
            "Películas",
            vec![
                "section.home-movies .MovieList .TPostMv".to_string(),
                ".MovieList article".to_string(),
                "article.TPost.C".to_string(),
            ],
        )
        .with_kind_hint(ContentKind::Movie),
        SectionConfig::on_main_document(
            "Series",
            vec![
                "section.home-series .MovieList .TPostMv".to_string(),
                "section.home-series li".to_string(),
            ],
        )
        .with_kind_hint(ContentKind::Series),
    ];

    config.listing.title = SelectorChain::texts(&["h2.Title", ".title", "h3"]);

    config.links.option_selectors = vec![
        ".TPlayerTb .Button".to_string(),
        ".aa-cn".to_string(),
    ];
    config.links.option_attrs = vec!["data-tplayernv".to_string()];
    config.links.ajax = Some(AjaxEndpoint {
        path: "/wp-admin/admin-ajax.php".to_string(),
        form: vec![
            ("action".to_string(), "doo_player_ajax".to_string()),
            ("post".to_string(), "{value}".to_string()),
            ("nume".to_string(), "1".to_string()),
            ("type".to_string(), "movie".to_string()),
        ],
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
        assert_eq!(provider.name(), "Cuevana");
    }

    #[test]
    fn home_sections_share_the_main_document() {
        let config = config();
        assert_eq!(config.sections.len(), 2);
        assert!(config.sections.iter().all(|s| s.path.is_none()));
        assert!(config.links.ajax.is_some());
    }
}
