//! URL normalization against a provider's base URL.
//!
//! The target sites mix absolute, scheme-relative, root-relative and bare
//! relative links, sometimes within one listing. Normalization follows what
//! the sites themselves expect: scheme-relative becomes https, root-relative
//! is joined to the base origin, anything else is treated as relative to the
//! base URL.

use url::Url;

/// Resolve a possibly relative URL. Returns `None` for empty input or a
/// base URL that cannot be parsed when it is needed.
pub fn normalize_url(input: &str, base: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        return Some(input.to_string());
    }
    if let Some(rest) = input.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if input.starts_with('/') {
        return Some(format!("{}{input}", origin_of(base)?));
    }
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        input.trim_start_matches('/')
    ))
}

/// Scheme + host (+ port) of a URL, without a trailing slash.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let origin = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };
    Some(origin)
}

/// Host name of a URL, for source hints and denylist checks.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.test";

    #[test]
    fn root_relative_joins_origin() {
        assert_eq!(
            normalize_url("/foo", BASE).as_deref(),
            Some("https://example.test/foo")
        );
    }

    #[test]
    fn scheme_relative_becomes_https() {
        assert_eq!(
            normalize_url("//cdn.example.test/x.jpg", BASE).as_deref(),
            Some("https://cdn.example.test/x.jpg")
        );
    }

    #[test]
    fn absolute_is_unchanged() {
        assert_eq!(
            normalize_url("https://already.test/y", BASE).as_deref(),
            Some("https://already.test/y")
        );
    }

    #[test]
    fn bare_relative_joins_base() {
        assert_eq!(
            normalize_url("pelicula/la-casa", "https://example.test/").as_deref(),
            Some("https://example.test/pelicula/la-casa")
        );
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(normalize_url("  ", BASE), None);
    }

    #[test]
    fn root_relative_keeps_port() {
        assert_eq!(
            normalize_url("/foo", "http://example.test:8080/x").as_deref(),
            Some("http://example.test:8080/foo")
        );
    }

    #[test]
    fn root_relative_with_bad_base_is_none() {
        assert_eq!(normalize_url("/foo", "not a url"), None);
    }

    #[test]
    fn host_of_parses() {
        assert_eq!(
            host_of("https://streamtape.com/e/x").as_deref(),
            Some("streamtape.com")
        );
        assert_eq!(host_of("garbage"), None);
    }
}
