//! Per-site provider configurations.
//!
//! Sites never get code of their own: each module is a pure data value
//! feeding the generic pipeline. Adding a site means adding one function
//! here.

pub mod animeflv;
pub mod cinecalidad;
pub mod cuevana;
pub mod entrepeliculas;
pub mod pelisplus4k;
pub mod pelisplushd;

use crate::extraction::config::ProviderConfig;

/// Every bundled provider configuration.
pub fn all() -> Vec<ProviderConfig> {
    vec![
        cuevana::config(),
        animeflv::config(),
        entrepeliculas::config(),
        cinecalidad::config(),
        pelisplushd::config(),
        pelisplus4k::config(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use std::collections::HashSet;

    #[test]
    fn every_bundled_config_builds() {
        for config in all() {
            let name = config.name.clone();
            assert!(Provider::new(config).is_ok(), "provider {name} failed to build");
        }
    }

    #[test]
    fn names_and_base_urls_are_unique() {
        let configs = all();
        let names: HashSet<_> = configs.iter().map(|c| c.name.as_str()).collect();
        let bases: HashSet<_> = configs.iter().map(|c| c.base_url.as_str()).collect();
        assert_eq!(names.len(), configs.len());
        assert_eq!(bases.len(), configs.len());
    }

    #[test]
    fn base_urls_never_end_with_a_slash() {
        for config in all() {
            assert!(!config.base_url.ends_with('/'), "{}", config.name);
        }
    }
}
