//! Season/episode numbering parser.
//!
//! The sites encode numbering as free text in wildly different shapes:
//! `"1 - 5"` badges, `"3x07"` labels, `"S1E2"` markers, or a
//! `temporada/N/capitulo/M` path fragment in the episode URL. Patterns are
//! tried in order, most specific first, so an explicit marker is never
//! shadowed by an unrelated numeric substring.

use once_cell::sync::Lazy;
use regex::Regex;

/// Parsed numbering. `season` falls back to 1; `episode` is only set when a
/// numeric token was actually recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeNumbering {
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

enum Shape {
    SeasonEpisode,
    EpisodeOnly,
}

static PATTERNS: Lazy<Vec<(Regex, Shape)>> = Lazy::new(|| {
    vec![
        // temporada/2/capitulo/5, temporada-2-capitulo-5
        (
            Regex::new(r"(?i)temporada[/\-]?\s*(\d+)[/\-]?.*?cap[ií]tulo[/\-]?\s*(\d+)").unwrap(),
            Shape::SeasonEpisode,
        ),
        // S1E2, s01.e02
        (
            Regex::new(r"(?i)\bs(\d+)\s*[.\-]?\s*e(\d+)").unwrap(),
            Shape::SeasonEpisode,
        ),
        // 3x07
        (
            Regex::new(r"(\d+)\s*[xX]\s*(\d+)").unwrap(),
            Shape::SeasonEpisode,
        ),
        // 1 - 5 (the "numerando" badge)
        (
            Regex::new(r"(\d+)\s*-\s*(\d+)").unwrap(),
            Shape::SeasonEpisode,
        ),
        // Episodio 7, Capítulo 7, ep. 7
        (
            Regex::new(r"(?i)(?:episodio|cap[ií]tulo|episode|ep)\s*[.:#\-]?\s*(\d+)").unwrap(),
            Shape::EpisodeOnly,
        ),
    ]
});

/// Parse free-text numbering. Unparseable text yields season 1 and no
/// episode number.
pub fn parse_numbering(text: &str) -> EpisodeNumbering {
    for (pattern, shape) in PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let first = captures.get(1).and_then(|m| m.as_str().parse().ok());
            return match shape {
                Shape::SeasonEpisode => {
                    let second = captures.get(2).and_then(|m| m.as_str().parse().ok());
                    EpisodeNumbering {
                        season: first.or(Some(1)),
                        episode: second,
                    }
                }
                Shape::EpisodeOnly => EpisodeNumbering {
                    season: Some(1),
                    episode: first,
                },
            };
        }
    }
    EpisodeNumbering {
        season: Some(1),
        episode: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3x07", Some(3), Some(7))]
    #[case("temporada/2/capitulo/5", Some(2), Some(5))]
    #[case("S1E2", Some(1), Some(2))]
    #[case("Capítulo Especial", Some(1), None)]
    #[case("1 - 5", Some(1), Some(5))]
    #[case("temporada-4-capitulo-12", Some(4), Some(12))]
    #[case("s02e09", Some(2), Some(9))]
    #[case("Episodio 7", Some(1), Some(7))]
    #[case("ep. 23", Some(1), Some(23))]
    #[case("", Some(1), None)]
    fn parses_known_shapes(
        #[case] text: &str,
        #[case] season: Option<u32>,
        #[case] episode: Option<u32>,
    ) {
        let parsed = parse_numbering(text);
        assert_eq!(parsed.season, season, "season of {text:?}");
        assert_eq!(parsed.episode, episode, "episode of {text:?}");
    }

    #[test]
    fn explicit_markers_beat_bare_numeric_pairs() {
        // The "3-4" substring must not shadow the S/E marker.
        let parsed = parse_numbering("S1E2 (disco 3-4)");
        assert_eq!(parsed.season, Some(1));
        assert_eq!(parsed.episode, Some(2));
    }

    #[test]
    fn path_fragment_beats_embedded_pair() {
        let parsed = parse_numbering("/serie/x/temporada/3/capitulo/11#1-2");
        assert_eq!(parsed.season, Some(3));
        assert_eq!(parsed.episode, Some(11));
    }
}
