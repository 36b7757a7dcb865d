//! Link resolution pipeline: player page -> candidate stream URLs.
//!
//! Three independent discovery stages feed one merged, deduplicated set of
//! candidates: iframe sources, inline-script mining, and server-option
//! buttons whose data attributes trigger a templated follow-up request.
//! Follow-up responses are re-fed through the first two stages exactly once
//! so a follow chain can never recurse unboundedly. Every candidate is
//! handed to the external extractor registry independently; one failed
//! candidate never aborts its siblings.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use super::config::{AjaxEndpoint, EmbedExchange, ProviderConfig};
use super::error::{ExtractResult, StageOutcome};
use super::selector::compile_selectors;
use super::urls::{host_of, normalize_url, origin_of};
use crate::domain::{CandidateLink, StreamLink, SubtitleTrack};
use crate::infrastructure::http_client::HttpClient;

/// Callback receiving playable streams from the extractor registry.
pub type LinkSink = dyn Fn(StreamLink) + Send + Sync;
/// Callback receiving subtitle tracks from the extractor registry.
pub type SubtitleSink = dyn Fn(SubtitleTrack) + Send + Sync;

/// External component that turns a candidate URL into playable streams.
///
/// Implementations may perform network I/O and are expected to tolerate
/// duplicate or irrelevant URLs; resolution failures are reported as
/// errors and swallowed by the pipeline.
#[async_trait]
pub trait ExtractorRegistry: Send + Sync {
    async fn resolve(
        &self,
        url: &str,
        referer: &str,
        on_subtitle: &SubtitleSink,
        on_link: &LinkSink,
    ) -> anyhow::Result<()>;
}

/// Player-configuration keys and URL shapes seen in inline scripts.
static SCRIPT_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)file\s*:\s*["'](https?://[^"']+)["']"#).unwrap(),
        Regex::new(r#"(?i)\bsrc\s*:\s*["'](https?://[^"']+)["']"#).unwrap(),
        Regex::new(r#"(?i)\burl\s*:\s*["'](https?://[^"']+)["']"#).unwrap(),
        Regex::new(r#""embed_url"\s*:\s*"(https?://[^"]+)""#).unwrap(),
        Regex::new(r#"["'](https?://[^"']+\.(?:mp4|m3u8|mkv)[^"']*)["']"#).unwrap(),
        Regex::new(
            r#"(https?://(?:www\.)?(?:fembed|embedsb|streamtape|doodstream|dood|uqload|mixdrop|upstream|voe|streamwish|filemoon)\.[a-z]{2,6}/[^\s"'<>,\)\]]+)"#,
        )
        .unwrap(),
    ]
});

static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

#[derive(Debug, Deserialize)]
struct EmbedExchangeResponse {
    url: String,
}

/// What the synchronous discovery stages found in one document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DocumentScan {
    /// Candidate embed/media URLs (iframes + script mining), absolute.
    pub embeds: Vec<String>,
    /// Server-option data values awaiting a templated follow-up.
    pub options: Vec<String>,
}

pub struct LinkPipeline {
    iframe_selectors: Vec<Selector>,
    iframe_attrs: Vec<String>,
    option_selectors: Vec<Selector>,
    option_attrs: Vec<String>,
    ajax: Option<AjaxEndpoint>,
    player_get_template: Option<String>,
    embed_exchanges: Vec<EmbedExchange>,
    host_denylist: Vec<String>,
    max_concurrent: usize,
    base_url: String,
}

impl LinkPipeline {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let links = &config.links;
        Ok(Self {
            iframe_selectors: compile_selectors(&links.iframe_selectors)?,
            iframe_attrs: links.iframe_attrs.clone(),
            option_selectors: compile_selectors(&links.option_selectors)?,
            option_attrs: links.option_attrs.clone(),
            ajax: links.ajax.clone(),
            player_get_template: links.player_get_template.clone(),
            embed_exchanges: links.embed_exchanges.clone(),
            host_denylist: links.host_denylist.clone(),
            max_concurrent: links.max_concurrent_fetches.max(1),
            base_url: config.base_url.clone(),
        })
    }

    /// Run every synchronous discovery stage over one document.
    pub fn scan_document(&self, document: &Html) -> DocumentScan {
        DocumentScan {
            embeds: {
                let mut embeds = self.scan_iframes(document);
                embeds.extend(self.mine_scripts(document));
                embeds
            },
            options: self.scan_options(document),
        }
    }

    /// Stage 1: iframe `src`/`data-src` collection.
    fn scan_iframes(&self, document: &Html) -> Vec<String> {
        let mut found = Vec::new();
        for selector in &self.iframe_selectors {
            for element in document.select(selector) {
                let src = self
                    .iframe_attrs
                    .iter()
                    .filter_map(|attr| element.value().attr(attr))
                    .map(str::trim)
                    .find(|v| !v.is_empty());
                let Some(src) = src else { continue };
                if src.starts_with("about:") || src.starts_with("javascript:") {
                    continue;
                }
                if let Some(absolute) = normalize_url(src, &self.base_url) {
                    found.push(absolute);
                }
            }
        }
        found
    }

    /// Stage 2: inline-script mining.
    fn mine_scripts(&self, document: &Html) -> Vec<String> {
        let mut found = Vec::new();
        for script in document.select(&SCRIPT_SELECTOR) {
            let body: String = script.text().collect();
            if body.is_empty() {
                continue;
            }
            found.extend(mine_candidate_urls(&body, &self.host_denylist));
        }
        found
    }

    /// Stage 3 discovery: server-option data values.
    fn scan_options(&self, document: &Html) -> Vec<String> {
        let mut values = Vec::new();
        for selector in &self.option_selectors {
            for element in document.select(selector) {
                let value = self
                    .option_attrs
                    .iter()
                    .filter_map(|attr| element.value().attr(attr))
                    .map(str::trim)
                    .find(|v| !v.is_empty());
                if let Some(value) = value {
                    if !values.iter().any(|v: &String| v == value) {
                        values.push(value.to_string());
                    }
                }
            }
        }
        values
    }

    /// Re-scan a follow-up response body (one level deep, no recursion).
    fn extract_from_response(&self, body: &str) -> Vec<String> {
        let mut found = {
            let fragment = Html::parse_document(body);
            self.scan_iframes(&fragment)
        };
        found.extend(mine_candidate_urls(body, &self.host_denylist));
        found
    }

    /// Stage 3 follow-up: templated AJAX POST or GET for one option value.
    /// A value that is already an absolute URL is a candidate by itself.
    async fn follow_option(&self, http: &HttpClient, page_url: &str, value: &str) -> StageOutcome<Vec<String>> {
        if value.starts_with("http") {
            return StageOutcome::Found(vec![value.to_string()]);
        }
        let response = if let Some(ajax) = &self.ajax {
            let endpoint = format!("{}{}", self.base_url, ajax.path);
            let form: Vec<(String, String)> = ajax
                .form
                .iter()
                .map(|(k, v)| (k.clone(), v.replace("{value}", value)))
                .collect();
            http.post_form(
                &endpoint,
                &form,
                &[
                    ("Referer", page_url),
                    ("X-Requested-With", "XMLHttpRequest"),
                ],
            )
            .await
        } else if let Some(template) = &self.player_get_template {
            let target = template.replace("{value}", value);
            match normalize_url(&target, &self.base_url) {
                Some(absolute) => http.get_text(&absolute, &[("Referer", page_url)]).await,
                None => return StageOutcome::NotFound,
            }
        } else {
            return StageOutcome::NotFound;
        };

        match response {
            Ok(body) => {
                let urls = self.extract_from_response(&body);
                if urls.is_empty() {
                    StageOutcome::NotFound
                } else {
                    StageOutcome::Found(urls)
                }
            }
            Err(e) => {
                warn!(value, error = %e, "server-option follow-up failed");
                StageOutcome::Transient(e.to_string())
            }
        }
    }

    /// Stage 4: fembed-style key exchange for one embed URL. Returns the
    /// exchanged URL, or the input untouched when no exchange applies or
    /// the exchange fails.
    async fn exchange_embed(&self, http: &HttpClient, url: String, referer: &str) -> String {
        for exchange in &self.embed_exchanges {
            if !url.contains(&exchange.host_marker) {
                continue;
            }
            let Some(key) = key_param_of(&url, &exchange.key_param) else {
                continue;
            };
            let Some(origin) = origin_of(&url) else {
                continue;
            };
            let api = format!("{origin}{}", exchange.api_path);
            let result = http
                .post_form(
                    &api,
                    &[(exchange.key_param.clone(), key)],
                    &[
                        ("Referer", referer),
                        ("X-Requested-With", "XMLHttpRequest"),
                    ],
                )
                .await;
            match result {
                Ok(body) => match serde_json::from_str::<EmbedExchangeResponse>(&body) {
                    Ok(response) if response.url.starts_with("http") => {
                        debug!(embed = url, exchanged = response.url, "embed key exchanged");
                        return response.url;
                    }
                    Ok(_) | Err(_) => {
                        warn!(embed = url, "embed exchange returned no usable url");
                    }
                },
                Err(e) => warn!(embed = url, error = %e, "embed exchange failed"),
            }
        }
        url
    }

    /// Full pipeline for one player page. Returns true when at least one
    /// candidate was handed to the registry.
    pub async fn run(
        self: Arc<Self>,
        http: Arc<HttpClient>,
        page_url: String,
        registry: Arc<dyn ExtractorRegistry>,
        on_subtitle: Arc<SubtitleSink>,
        on_link: Arc<LinkSink>,
    ) -> ExtractResult<bool> {
        // The primary document is the one fetch allowed to fail loudly.
        let body = http.get_text(&page_url, &[]).await?;
        let scan = {
            let document = Html::parse_document(&body);
            self.scan_document(&document)
        };
        debug!(
            page_url,
            embeds = scan.embeds.len(),
            options = scan.options.len(),
            "initial document scanned"
        );

        let mut discovered = scan.embeds;

        // Bounded fan-out over server-option follow-ups.
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = Vec::new();
        for value in scan.options {
            let pipeline = Arc::clone(&self);
            let http = Arc::clone(&http);
            let semaphore = Arc::clone(&semaphore);
            let page_url = page_url.clone();
            tasks.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return StageOutcome::NotFound;
                };
                pipeline.follow_option(&http, &page_url, &value).await
            }));
        }
        for joined in join_all(tasks).await {
            match joined {
                Ok(outcome) => {
                    if let Some(urls) = outcome.found() {
                        discovered.extend(urls);
                    }
                }
                Err(e) => warn!(error = %e, "follow-up task panicked"),
            }
        }

        // Embed key exchanges, then dedup by absolute URL.
        let mut exchanged = Vec::with_capacity(discovered.len());
        for url in discovered {
            exchanged.push(self.exchange_embed(&http, url, &page_url).await);
        }
        let candidates = dedup_candidates(exchanged, &self.host_denylist);
        debug!(page_url, candidates = candidates.len(), "handing off candidates");

        Ok(hand_off_candidates(
            candidates,
            page_url,
            registry,
            on_subtitle,
            on_link,
            self.max_concurrent,
        )
        .await)
    }
}

/// Apply the script regex battery to arbitrary text.
pub fn mine_candidate_urls(text: &str, host_denylist: &[String]) -> Vec<String> {
    let unescaped = text.replace("\\/", "/");
    let mut found: Vec<String> = Vec::new();
    for pattern in SCRIPT_URL_PATTERNS.iter() {
        for captures in pattern.captures_iter(&unescaped) {
            let Some(url) = captures.get(1).map(|m| m.as_str().to_string()) else {
                continue;
            };
            if !url.starts_with("http") {
                continue;
            }
            if is_denylisted(&url, host_denylist) {
                continue;
            }
            if !found.contains(&url) {
                found.push(url);
            }
        }
    }
    found
}

fn is_denylisted(url: &str, host_denylist: &[String]) -> bool {
    match host_of(url) {
        // Exact host or a subdomain; a suffix alone would also catch
        // unrelated hosts like notfacebook.com.
        Some(host) => host_denylist.iter().any(|d| {
            host == d.as_str()
                || (host.len() > d.len()
                    && host.ends_with(d.as_str())
                    && host.as_bytes()[host.len() - d.len() - 1] == b'.')
        }),
        None => true,
    }
}

fn key_param_of(url: &str, param: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == param)
        .map(|(_, v)| v.into_owned())
}

/// Dedup policy: each absolute URL reaches the registry exactly once per
/// call, regardless of how many stages discovered it.
pub fn dedup_candidates(urls: Vec<String>, host_denylist: &[String]) -> Vec<CandidateLink> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| !is_denylisted(url, host_denylist))
        .filter(|url| seen.insert(url.clone()))
        .map(CandidateLink::from_url)
        .collect()
}

/// Hand each candidate to the registry with bounded concurrency. Individual
/// resolution failures are swallowed; success means at least one candidate
/// was handed off.
pub(crate) async fn hand_off_candidates(
    candidates: Vec<CandidateLink>,
    referer: String,
    registry: Arc<dyn ExtractorRegistry>,
    on_subtitle: Arc<SubtitleSink>,
    on_link: Arc<LinkSink>,
    max_concurrent: usize,
) -> bool {
    if candidates.is_empty() {
        return false;
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let registry = Arc::clone(&registry);
        let on_subtitle = Arc::clone(&on_subtitle);
        let on_link = Arc::clone(&on_link);
        let semaphore = Arc::clone(&semaphore);
        let referer = referer.clone();
        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            if let Err(e) = registry
                .resolve(&candidate.url, &referer, &*on_subtitle, &*on_link)
                .await
            {
                warn!(url = candidate.url, error = %e, "candidate resolution failed");
            }
        }));
    }
    join_all(tasks).await;
    true
}
