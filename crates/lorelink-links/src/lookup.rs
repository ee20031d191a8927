//! HTTP client for the era-scoped suggestions endpoint.
//!
//! Issues `GET {lookup base}/search/suggestions-template?q=<name>` and reads
//! the ranked `results` array. Every failure mode is folded into an empty
//! [`LookupResponse`] carrying a [`LookupFailure`], so callers never see a
//! transport error.
//!
//! # Response schema
//!
//! ```json
//! { "results": [ { "id": 19019, "name": "Thunderfury", "type": 3, ... } ] }
//! ```
//!
//! The root must be an object. `results` may be absent or `null` (no
//! candidates) but otherwise must be an array of entries, each with a
//! positive integer `id`, a string `name`, and an integer `type`. Extra
//! fields are ignored.
//! Anything else is a [`LookupFailure::Format`].

use async_trait::async_trait;
use lorelink_core::logging::{DURATION_MS, RESULT_COUNT, SLOW};
use lorelink_core::{EntityLookup, Era, Error, LookupCandidate, LookupFailure, LookupResponse, Result};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace, warn};

use crate::config::LinkerConfig;
use crate::urls::suggestions_url;

/// Suggestions endpoint body.
#[derive(Debug, Deserialize)]
struct SuggestionsBody {
    #[serde(default)]
    results: Option<Vec<SuggestionEntry>>,
}

/// One entry of `results`.
#[derive(Debug, Deserialize)]
struct SuggestionEntry {
    id: u64,
    name: String,
    #[serde(rename = "type")]
    type_code: i64,
}

/// Parse a suggestions body into candidates, enforcing the schema.
pub fn parse_suggestions(body: &[u8]) -> std::result::Result<Vec<LookupCandidate>, LookupFailure> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| LookupFailure::Format(e.to_string()))?;

    if !value.is_object() {
        return Err(LookupFailure::Format(
            "expected a JSON object at the root".to_string(),
        ));
    }

    let parsed: SuggestionsBody =
        serde_json::from_value(value).map_err(|e| LookupFailure::Format(e.to_string()))?;

    parsed
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|entry| {
            if entry.id == 0 {
                return Err(LookupFailure::Format(format!(
                    "result '{}' has a non-positive id",
                    entry.name
                )));
            }
            Ok(LookupCandidate {
                id: entry.id,
                name: entry.name,
                type_code: entry.type_code,
            })
        })
        .collect()
}

/// Suggestions endpoint client.
pub struct SuggestionsClient {
    client: Client,
    lookup_base: String,
    timeout: Duration,
}

impl SuggestionsClient {
    /// Create a client for `lookup_base` (a template containing `{scope}`).
    pub fn new(lookup_base: String, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            lookup_base = %lookup_base,
            timeout_secs = timeout.as_secs(),
            "Initializing suggestions client"
        );

        Ok(Self {
            client,
            lookup_base,
            timeout,
        })
    }

    pub fn from_config(config: &LinkerConfig) -> Result<Self> {
        Self::new(
            config.lookup_base.clone(),
            &config.user_agent,
            Duration::from_secs(config.lookup_timeout_secs),
        )
    }

    pub fn lookup_base(&self) -> &str {
        &self.lookup_base
    }
}

#[async_trait]
impl EntityLookup for SuggestionsClient {
    #[instrument(skip(self), fields(subsystem = "links", component = "lookup", op = "search", era = %era, scope = era.scope()))]
    async fn search(&self, name: &str, era: Era) -> LookupResponse {
        let scope = era.scope();
        let url = suggestions_url(&self.lookup_base, scope, name);
        let start = Instant::now();

        debug!(url = %url, "Fetching suggestions");

        let response = match self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Lookup request failed, falling back to search link");
                return LookupResponse::failed(scope, LookupFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                "Lookup service returned an error status, falling back to search link"
            );
            return LookupResponse::failed(scope, LookupFailure::Status(status.as_u16()));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to read lookup response body");
                return LookupResponse::failed(scope, LookupFailure::Transport(e.to_string()));
            }
        };

        let elapsed = start.elapsed().as_millis() as u64;
        match parse_suggestions(&body) {
            Ok(candidates) => {
                debug!(
                    scope,
                    { RESULT_COUNT } = candidates.len(),
                    { DURATION_MS } = elapsed,
                    "Lookup complete"
                );
                if elapsed > lorelink_core::defaults::SLOW_LOOKUP_MS {
                    warn!(scope, { DURATION_MS } = elapsed, { SLOW } = true, "Slow lookup");
                }
                for candidate in &candidates {
                    trace!(id = candidate.id, name = %candidate.name, type_code = candidate.type_code, "Candidate");
                }
                LookupResponse::found(scope, candidates)
            }
            Err(failure) => {
                warn!(error = %failure, "Unusable lookup response, falling back to search link");
                LookupResponse::failed(scope, failure)
            }
        }
    }

    fn backend_name(&self) -> &str {
        "suggestions"
    }
}
