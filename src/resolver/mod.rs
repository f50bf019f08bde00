//! Finds a representative photo URL for a person.
//!
//! Strategies are tried in order and the first usable thumbnail wins:
//! curated override on the foreign endpoint, then the original-language
//! name on the foreign endpoint, then the display name on the local one.
//! Every failure inside a strategy just moves on to the next.

pub mod overrides;

use regex::Regex;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::corpus::PersonDescriptor;
use crate::error::ResolveError;
use crate::http::HttpTransport;

pub use overrides::OverrideTable;

/// Which of the two search services a strategy queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// Encyclopedia in the language of `original_name` (English by default).
    Foreign,
    /// Encyclopedia in the language of `display_name` (Russian by default).
    Local,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Foreign => write!(f, "foreign"),
            Locale::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStrategy {
    pub locale: Locale,
    pub query: String,
}

impl SearchStrategy {
    fn new(locale: Locale, query: impl Into<String>) -> Self {
        Self {
            locale,
            query: query.into(),
        }
    }
}

/// A full-size image URL and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub strategy: SearchStrategy,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Default, Deserialize)]
struct Page {
    #[serde(default)]
    missing: Option<IgnoredAny>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    source: Option<String>,
}

/// Key the search API uses for a title it could not find.
const MISSING_PAGE_ID: &str = "-1";

fn width_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\d+px-").unwrap())
}

/// True when every character is outside ASCII or is whitespace, a hyphen
/// or an apostrophe, i.e. the name is already in the local script.
pub fn is_local_script(name: &str) -> bool {
    name.chars()
        .all(|c| !c.is_ascii() || c.is_whitespace() || c == '-' || c == '\'')
}

/// Rewrite the `/<width>px-` segment of a thumbnail URL to `width`.
/// URLs without the segment come back unchanged.
pub fn upgrade_thumbnail_url(url: &str, width: u32) -> String {
    width_token_re()
        .replace_all(url, format!("/{}px-", width).as_str())
        .into_owned()
}

pub struct ImageResolver {
    transport: Arc<dyn HttpTransport>,
    foreign_endpoint: String,
    local_endpoint: String,
    thumbnail_size: u32,
    full_width: u32,
    timeout: Duration,
    overrides: OverrideTable,
}

impl ImageResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: &ResolverConfig,
        overrides: OverrideTable,
    ) -> Self {
        Self {
            transport,
            foreign_endpoint: config.foreign_endpoint.clone(),
            local_endpoint: config.local_endpoint.clone(),
            thumbnail_size: config.thumbnail_size,
            full_width: config.full_width,
            timeout: Duration::from_secs(config.timeout_secs),
            overrides,
        }
    }

    /// Strategies for `person`, in the order they are tried.
    pub fn plan(&self, person: &PersonDescriptor) -> Vec<SearchStrategy> {
        let mut strategies = Vec::with_capacity(3);

        if let Some(title) = self.overrides.get(&person.display_name) {
            strategies.push(SearchStrategy::new(Locale::Foreign, title));
        }

        if let Some(original) = person.original_name.as_deref() {
            if !is_local_script(original) {
                strategies.push(SearchStrategy::new(Locale::Foreign, original));
            }
        }

        strategies.push(SearchStrategy::new(Locale::Local, &person.display_name));

        // Same query twice would only repeat the same miss
        let mut unique: Vec<SearchStrategy> = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            if !unique.contains(&strategy) {
                unique.push(strategy);
            }
        }
        unique
    }

    /// First full-size image URL any strategy yields, or `None`.
    pub fn resolve(&self, person: &PersonDescriptor) -> Option<Resolution> {
        for strategy in self.plan(person) {
            match self.query_thumbnail(&strategy) {
                Ok(Some(thumbnail)) => {
                    info!("  found via {} endpoint: '{}'", strategy.locale, strategy.query);
                    if !width_token_re().is_match(&thumbnail) {
                        debug!("  thumbnail has no width segment, using it as is: {}", thumbnail);
                    }
                    return Some(Resolution {
                        url: upgrade_thumbnail_url(&thumbnail, self.full_width),
                        strategy,
                    });
                }
                Ok(None) => {
                    debug!("  no image on {} endpoint for '{}'", strategy.locale, strategy.query);
                }
                Err(e) => {
                    debug!("  {} endpoint query '{}' failed: {}", strategy.locale, strategy.query, e);
                }
            }
        }

        None
    }

    fn endpoint(&self, locale: Locale) -> &str {
        match locale {
            Locale::Foreign => &self.foreign_endpoint,
            Locale::Local => &self.local_endpoint,
        }
    }

    fn query_thumbnail(&self, strategy: &SearchStrategy) -> Result<Option<String>, ResolveError> {
        let size = self.thumbnail_size.to_string();
        let query = [
            ("action", "query"),
            ("titles", strategy.query.as_str()),
            ("prop", "pageimages"),
            ("format", "json"),
            ("pithumbsize", size.as_str()),
            ("redirects", "1"),
        ];

        let response = self
            .transport
            .get(self.endpoint(strategy.locale), &query, self.timeout)?;
        let parsed: QueryResponse = serde_json::from_reader(response.body)?;

        let pages = parsed.query.map(|q| q.pages).unwrap_or_default();
        let thumbnail = pages
            .into_iter()
            .filter(|(id, page)| id != MISSING_PAGE_ID && page.missing.is_none())
            .filter_map(|(_, page)| page.thumbnail.and_then(|t| t.source))
            .find(|source| !source.trim().is_empty());

        Ok(thumbnail)
    }
}
