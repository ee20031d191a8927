//! Mention resolution pipeline.
//!
//! ## Flow
//!
//! 1. Scan the text for mentions and parse each one (synchronous)
//! 2. Deduplicate by [`CacheKey`], keeping first-appearance order
//! 3. Resolve distinct keys concurrently, bounded by `max_concurrent`,
//!    through the shared [`ResolutionCache`]
//! 4. Once every key has resolved, rewrite the text
//!
//! Nothing in this pipeline fails. A lookup that errors or times out yields
//! a search link for that mention only.

use futures::stream::{self, StreamExt};
use lorelink_core::{
    EntityLookup, EntityType, Era, Resolution, ResolutionKind, Result,
};
use lorelink_core::logging::{
    DURATION_MS, MENTION, MENTION_COUNT, RESOLUTION, RESULT_COUNT, UNIQUE_COUNT,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::cache::{CacheKey, ResolutionCache};
use crate::config::LinkerConfig;
use crate::disambiguate::{link_type, select_candidate};
use crate::lookup::SuggestionsClient;
use crate::mention::{scan_mentions, Mention, ParsedMention};
use crate::rewrite::rewrite;
use crate::urls::LinkBuilder;

/// How one mention in a text was linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMention {
    /// Inner text of the mention as written.
    pub raw: String,
    /// Label used for the link.
    pub clean_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<EntityType>,
    pub url: String,
    pub kind: ResolutionKind,
}

/// Rewritten text plus per-mention detail, in text order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub text: String,
    pub mentions: Vec<ResolvedMention>,
}

/// Rewrites `{{mentions}}` in generated text into canonical links.
pub struct MentionResolver {
    lookup: Arc<dyn EntityLookup>,
    cache: ResolutionCache,
    links: LinkBuilder,
    max_concurrent: usize,
}

impl MentionResolver {
    pub fn new(lookup: Arc<dyn EntityLookup>, cache: ResolutionCache, links: LinkBuilder) -> Self {
        Self {
            lookup,
            cache,
            links,
            max_concurrent: lorelink_core::defaults::MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Bound the number of lookups in flight for one rewrite (minimum 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Build a resolver backed by the HTTP suggestions client.
    pub fn from_config(config: &LinkerConfig) -> Result<Self> {
        config.validate()?;
        let lookup = SuggestionsClient::from_config(config)?;
        let cache = ResolutionCache::new(config.cache_policy());

        info!(
            link_base = %config.link_base,
            lookup_base = %config.lookup_base,
            max_concurrent = config.max_concurrent_lookups,
            cache_policy = ?cache.policy(),
            "Initializing mention resolver"
        );

        Ok(Self::new(
            Arc::new(lookup),
            cache,
            LinkBuilder::new(config.link_base.clone()),
        )
        .with_max_concurrent(config.max_concurrent_lookups))
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }

    /// Resolve a single mention through the cache.
    pub async fn resolve_mention(&self, mention: &ParsedMention, era: Era) -> Resolution {
        let key = CacheKey::new(era, mention);
        let lookup = Arc::clone(&self.lookup);
        let links = self.links.clone();
        let mention = mention.clone();

        self.cache
            .get_or_resolve(key, move || resolve_uncached(lookup, links, mention, era))
            .await
    }

    /// Rewrite every mention in `text` into a markdown link.
    pub async fn rewrite_mentions(&self, text: &str, era: Era) -> String {
        self.rewrite_with_report(text, era).await.text
    }

    /// Rewrite every mention in `text` and report how each was linked.
    #[instrument(skip(self, text), fields(subsystem = "links", component = "resolver", op = "rewrite_mentions", era = %era, text_len = text.len()))]
    pub async fn rewrite_with_report(&self, text: &str, era: Era) -> RewriteReport {
        let start = Instant::now();
        let mentions: Vec<(Mention<'_>, ParsedMention)> =
            scan_mentions(text).map(|m| (m, m.parse())).collect();

        if mentions.is_empty() {
            debug!("No mentions found");
            return RewriteReport {
                text: text.to_string(),
                mentions: Vec::new(),
            };
        }

        let mut seen = HashSet::new();
        let unique: Vec<(CacheKey, &ParsedMention)> = mentions
            .iter()
            .filter_map(|(_, parsed)| {
                let key = CacheKey::new(era, parsed);
                seen.insert(key.clone()).then_some((key, parsed))
            })
            .collect();
        let unique_count = unique.len();

        let resolutions: HashMap<CacheKey, Resolution> = stream::iter(unique)
            .map(|(key, parsed)| async move {
                let resolution = self.resolve_mention(parsed, era).await;
                (key, resolution)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let rewritten = rewrite(text, &mentions, era, &resolutions, &self.links);

        let report: Vec<ResolvedMention> = mentions
            .iter()
            .map(|(mention, parsed)| {
                let (url, kind) = match resolutions.get(&CacheKey::new(era, parsed)) {
                    Some(resolution) => (resolution.url.clone(), resolution.kind),
                    None => (
                        self.links.search(era.scope(), &parsed.clean_name),
                        ResolutionKind::Fallback,
                    ),
                };
                ResolvedMention {
                    raw: mention.raw.to_string(),
                    clean_name: parsed.clean_name.clone(),
                    type_hint: parsed.type_hint,
                    url,
                    kind,
                }
            })
            .collect();

        debug!(
            era = %era,
            { MENTION_COUNT } = mentions.len(),
            { UNIQUE_COUNT } = unique_count,
            { DURATION_MS } = start.elapsed().as_millis() as u64,
            "Rewrite complete"
        );

        RewriteReport {
            text: rewritten,
            mentions: report,
        }
    }
}

/// Look a mention up and turn the outcome into a link.
async fn resolve_uncached(
    lookup: Arc<dyn EntityLookup>,
    links: LinkBuilder,
    mention: ParsedMention,
    era: Era,
) -> Resolution {
    let name = mention.clean_name.as_str();
    let hint = mention.type_hint;

    debug!(
        mention = name,
        type_hint = hint.map(EntityType::slug).unwrap_or("none"),
        backend = lookup.backend_name(),
        "Resolving mention"
    );

    let response = lookup.search(name, era).await;
    let scope = response.scope;

    if let Some(failure) = &response.failure {
        debug!(
            scope,
            { MENTION } = name,
            { RESOLUTION } = ResolutionKind::Degraded.as_str(),
            error = %failure,
            "Lookup failed"
        );
        return Resolution::degraded(links.search(scope, name));
    }

    match select_candidate(&response.candidates, hint, name) {
        Some(candidate) => {
            let entity_type = link_type(candidate, hint);
            let url = links.canonical(scope, entity_type, candidate.id);
            debug!(
                scope,
                { MENTION } = name,
                id = candidate.id,
                entity_type = %entity_type,
                { RESOLUTION } = ResolutionKind::Canonical.as_str(),
                "Resolved mention"
            );
            Resolution::canonical(url)
        }
        None => {
            debug!(
                scope,
                { MENTION } = name,
                { RESULT_COUNT } = response.candidates.len(),
                { RESOLUTION } = ResolutionKind::Fallback.as_str(),
                "No direct match, linking to search"
            );
            Resolution::fallback(links.search(scope, name))
        }
    }
}
