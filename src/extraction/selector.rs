//! Ordered selector fallback chains.
//!
//! Target sites change their markup constantly, so every extracted field is
//! described as a chain of (selector, attribute) pairs tried in priority
//! order. The chain itself is a pure configuration value; the compiled form
//! drops malformed selectors with a warning instead of failing, so one bad
//! pattern never takes a provider down.

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Attribute sentinel meaning "read the element's text content".
pub const TEXT_ATTR: &str = "text";

/// One step in a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorStep {
    pub selector: String,
    pub attr: String,
}

impl SelectorStep {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: TEXT_ATTR.to_string(),
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: attr.to_string(),
        }
    }
}

/// Ordered fallback list of selector steps; a configuration value, not
/// runtime state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorChain(pub Vec<SelectorStep>);

impl SelectorChain {
    pub fn new(steps: Vec<SelectorStep>) -> Self {
        Self(steps)
    }

    /// Convenience chain reading text content from each selector in order.
    pub fn texts(selectors: &[&str]) -> Self {
        Self(selectors.iter().map(|s| SelectorStep::text(s)).collect())
    }

    /// Convenience chain reading the same attribute list off one selector,
    /// in order (the lazy-image `data-src`/`data-lazy-src`/`src` pattern).
    pub fn attrs(selector: &str, attrs: &[&str]) -> Self {
        Self(
            attrs
                .iter()
                .map(|a| SelectorStep::attr(selector, a))
                .collect(),
        )
    }

    /// Compile the chain, skipping malformed selectors with a warning.
    pub fn compile(&self, denylist: &[String]) -> CompiledChain {
        let mut steps = Vec::with_capacity(self.0.len());
        for step in &self.0 {
            match Selector::parse(&step.selector) {
                Ok(selector) => steps.push((selector, step.attr.clone())),
                Err(e) => {
                    warn!(selector = %step.selector, error = %e, "skipping malformed selector");
                }
            }
        }
        CompiledChain {
            steps,
            denylist: denylist.to_vec(),
        }
    }
}

/// Values that look like placeholders rather than real content.
pub fn default_placeholder_denylist() -> Vec<String> {
    vec![
        "data:image".to_string(),
        "about:".to_string(),
        "javascript:".to_string(),
    ]
}

/// A compiled chain ready to resolve against DOM nodes.
#[derive(Debug, Clone)]
pub struct CompiledChain {
    steps: Vec<(Selector, String)>,
    denylist: Vec<String>,
}

impl CompiledChain {
    /// Resolve the chain within a node: first step whose first matching
    /// descendant yields a non-empty, non-placeholder value wins.
    pub fn resolve(&self, node: &ElementRef) -> Option<String> {
        for (selector, attr) in &self.steps {
            if let Some(value) = Self::read(node, selector, attr) {
                if !self.is_placeholder(&value) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Resolve every match of the first step that yields at least one valid
    /// value (used for multi-valued fields such as tag lists).
    pub fn resolve_all(&self, node: &ElementRef) -> Vec<String> {
        for (selector, attr) in &self.steps {
            let values: Vec<String> = node
                .select(selector)
                .filter_map(|el| Self::read_element(&el, attr))
                .filter(|v| !self.is_placeholder(v))
                .collect();
            if !values.is_empty() {
                return values;
            }
        }
        Vec::new()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn read(node: &ElementRef, selector: &Selector, attr: &str) -> Option<String> {
        node.select(selector)
            .next()
            .and_then(|el| Self::read_element(&el, attr))
    }

    fn read_element(el: &ElementRef, attr: &str) -> Option<String> {
        let value = if attr == TEXT_ATTR {
            el.text().collect::<String>().trim().to_string()
        } else {
            el.value().attr(attr)?.trim().to_string()
        };
        (!value.is_empty()).then_some(value)
    }

    fn is_placeholder(&self, value: &str) -> bool {
        self.denylist.iter().any(|p| value.contains(p.as_str()))
    }
}

/// Compile container selector strings, warning on and skipping malformed
/// entries. Errors only when a non-empty list produced no usable selector.
pub fn compile_selectors(selector_strings: &[String]) -> anyhow::Result<Vec<Selector>> {
    let mut selectors = Vec::new();
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!(selector = %selector_str, error = %e, "failed to compile selector");
                errors.push(format!("'{selector_str}': {e}"));
            }
        }
    }

    if selectors.is_empty() && !selector_strings.is_empty() {
        anyhow::bail!(
            "no valid selectors compiled from {} attempts: {}",
            selector_strings.len(),
            errors.join(", ")
        );
    }

    Ok(selectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn earlier_pair_wins_over_later() {
        let html = doc(
            r#"<div><h2 class="Title">First</h2><h3 class="title">Second</h3></div>"#,
        );
        let chain = SelectorChain::texts(&["h2.Title", "h3.title"]).compile(&[]);
        assert_eq!(
            chain.resolve(&html.root_element()).as_deref(),
            Some("First")
        );
    }

    #[test]
    fn falls_through_empty_matches() {
        let html = doc(r#"<div><h2 class="Title">  </h2><h3>Fallback</h3></div>"#);
        let chain = SelectorChain::texts(&["h2.Title", "h3"]).compile(&[]);
        assert_eq!(
            chain.resolve(&html.root_element()).as_deref(),
            Some("Fallback")
        );
    }

    #[test]
    fn placeholder_values_are_rejected() {
        let html = doc(
            r#"<div><img data-src="data:image/gif;base64,R0lGOD" src="/real.jpg"></div>"#,
        );
        let chain = SelectorChain::attrs("img", &["data-src", "src"])
            .compile(&default_placeholder_denylist());
        assert_eq!(
            chain.resolve(&html.root_element()).as_deref(),
            Some("/real.jpg")
        );
    }

    #[test]
    fn pseudo_protocols_are_rejected() {
        let html = doc(r#"<div><iframe src="about:blank"></iframe></div>"#);
        let chain = SelectorChain::attrs("iframe", &["src"])
            .compile(&default_placeholder_denylist());
        assert_eq!(chain.resolve(&html.root_element()), None);
    }

    #[test]
    fn malformed_selector_is_skipped_silently() {
        let html = doc(r#"<div><p class="ok">value</p></div>"#);
        let chain = SelectorChain::texts(&["p..[", "p.ok"]).compile(&[]);
        assert_eq!(
            chain.resolve(&html.root_element()).as_deref(),
            Some("value")
        );
    }

    #[test]
    fn exhausted_chain_yields_none() {
        let html = doc(r#"<div><span>x</span></div>"#);
        let chain = SelectorChain::texts(&["h1", "h2"]).compile(&[]);
        assert_eq!(chain.resolve(&html.root_element()), None);
    }

    #[test]
    fn resolve_all_returns_every_match_of_first_matching_step() {
        let html = doc(
            r#"<nav class="genres"><a>Drama</a><a>Comedia</a></nav><div class="genre">Ignored</div>"#,
        );
        let chain = SelectorChain::texts(&[".genres a", ".genre"]).compile(&[]);
        assert_eq!(
            chain.resolve_all(&html.root_element()),
            vec!["Drama".to_string(), "Comedia".to_string()]
        );
    }

    #[test]
    fn compile_selectors_requires_one_valid_entry() {
        assert!(compile_selectors(&["div..[".to_string()]).is_err());
        assert!(compile_selectors(&[]).unwrap().is_empty());
        assert_eq!(
            compile_selectors(&["div..[".to_string(), "div.ok".to_string()])
                .unwrap()
                .len(),
            1
        );
    }
}
