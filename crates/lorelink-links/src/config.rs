//! Resolver configuration.
//!
//! Configuration is read from environment variables (`LORELINK_*`), with
//! defaults from [`lorelink_core::defaults`]. Unparseable numeric values fall
//! back to their defaults; structural problems are reported by
//! [`LinkerConfig::validate`].
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LORELINK_LINK_BASE` | `https://{scope}.wowhead.com` |
//! | `LORELINK_LOOKUP_BASE` | link base |
//! | `LORELINK_USER_AGENT` | `lorelink/<version> (+mention-resolver)` |
//! | `LORELINK_LOOKUP_TIMEOUT_SECS` | `10` |
//! | `LORELINK_MAX_CONCURRENT_LOOKUPS` | `8` |
//! | `LORELINK_CACHE_MAX_ENTRIES` | unbounded |
//! | `LORELINK_CACHE_TTL_SECS` | no expiry |

use lorelink_core::defaults;
use lorelink_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::cache::CachePolicy;

/// Settings for [`crate::MentionResolver`] and its lookup client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Base template for links written into text; must contain `{scope}`.
    pub link_base: String,
    /// Base template for suggestion lookups; must contain `{scope}`.
    pub lookup_base: String,
    /// `User-Agent` sent with lookups.
    pub user_agent: String,
    /// Per-lookup timeout in seconds.
    pub lookup_timeout_secs: u64,
    /// Maximum lookups in flight for one rewrite.
    pub max_concurrent_lookups: usize,
    /// LRU capacity of the resolution cache; `None` is unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_max_entries: Option<NonZeroUsize>,
    /// Entry lifetime in seconds; `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            link_base: defaults::LINK_BASE.to_string(),
            lookup_base: defaults::LINK_BASE.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            lookup_timeout_secs: defaults::LOOKUP_TIMEOUT_SECS,
            max_concurrent_lookups: defaults::MAX_CONCURRENT_LOOKUPS,
            cache_max_entries: None,
            cache_ttl_secs: None,
        }
    }
}

impl LinkerConfig {
    /// Load from `LORELINK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let link_base = var(defaults::ENV_LINK_BASE)
            .filter(|v| !v.is_empty())
            .unwrap_or(base.link_base);
        let lookup_base = var(defaults::ENV_LOOKUP_BASE)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| link_base.clone());

        Self {
            lookup_base,
            link_base,
            user_agent: var(defaults::ENV_USER_AGENT)
                .filter(|v| !v.is_empty())
                .unwrap_or(base.user_agent),
            lookup_timeout_secs: var(defaults::ENV_LOOKUP_TIMEOUT_SECS)
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.lookup_timeout_secs),
            max_concurrent_lookups: var(defaults::ENV_MAX_CONCURRENT_LOOKUPS)
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.max_concurrent_lookups),
            cache_max_entries: var(defaults::ENV_CACHE_MAX_ENTRIES).and_then(|v| v.parse().ok()),
            cache_ttl_secs: var(defaults::ENV_CACHE_TTL_SECS).and_then(|v| v.parse().ok()),
        }
    }

    /// Cache policy described by this configuration.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            max_entries: self.cache_max_entries,
            ttl: self.cache_ttl_secs.map(Duration::from_secs),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_base("link_base", &self.link_base)?;
        validate_base("lookup_base", &self.lookup_base)?;

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent cannot be empty".to_string()));
        }

        if self.lookup_timeout_secs == 0 {
            return Err(Error::Config(
                "lookup_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrent_lookups == 0 {
            return Err(Error::Config(
                "max_concurrent_lookups must be greater than zero".to_string(),
            ));
        }

        if self.cache_ttl_secs == Some(0) {
            return Err(Error::Config(
                "cache_ttl_secs must be greater than zero when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base(field: &str, value: &str) -> Result<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(Error::Config(format!(
            "{} must start with http:// or https://, got: {}",
            field, value
        )));
    }

    if !value.contains(defaults::SCOPE_PLACEHOLDER) {
        return Err(Error::Config(format!(
            "{} must contain the {} placeholder, got: {}",
            field,
            defaults::SCOPE_PLACEHOLDER,
            value
        )));
    }

    Ok(())
}
