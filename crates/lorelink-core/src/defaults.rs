//! Centralized default constants for lorelink.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration loaders fall back to these when the environment is silent.

// =============================================================================
// LOOKUP SERVICE
// =============================================================================

/// Placeholder substituted with the era scope in base URL templates.
pub const SCOPE_PLACEHOLDER: &str = "{scope}";

/// Public base for canonical and search links.
pub const LINK_BASE: &str = "https://{scope}.wowhead.com";

/// Path of the suggestions endpoint, relative to the lookup base.
pub const SUGGESTIONS_PATH: &str = "/search/suggestions-template";

/// Path of the human-facing search page, relative to the link base.
pub const SEARCH_PATH: &str = "/search";

/// Client identifier sent with every lookup.
pub const USER_AGENT: &str = concat!(
    "lorelink/",
    env!("CARGO_PKG_VERSION"),
    " (+mention-resolver)"
);

/// Timeout for a single lookup request (seconds).
pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Lookups slower than this are logged with `slow = true` (milliseconds).
pub const SLOW_LOOKUP_MS: u64 = 3000;

// =============================================================================
// RESOLVER
// =============================================================================

/// Maximum lookups in flight for a single rewrite call.
pub const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Opening mention delimiter.
pub const MENTION_OPEN: &str = "{{";

/// Closing mention delimiter.
pub const MENTION_CLOSE: &str = "}}";

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Env var: public link base template.
pub const ENV_LINK_BASE: &str = "LORELINK_LINK_BASE";

/// Env var: lookup base template (defaults to the link base).
pub const ENV_LOOKUP_BASE: &str = "LORELINK_LOOKUP_BASE";

/// Env var: client identifier header.
pub const ENV_USER_AGENT: &str = "LORELINK_USER_AGENT";

/// Env var: per-lookup timeout in seconds.
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "LORELINK_LOOKUP_TIMEOUT_SECS";

/// Env var: bounded fan-out per rewrite call.
pub const ENV_MAX_CONCURRENT_LOOKUPS: &str = "LORELINK_MAX_CONCURRENT_LOOKUPS";

/// Env var: LRU capacity of the resolution cache (unset = unbounded).
pub const ENV_CACHE_MAX_ENTRIES: &str = "LORELINK_CACHE_MAX_ENTRIES";

/// Env var: time-to-live of cache entries in seconds (unset = never expire).
pub const ENV_CACHE_TTL_SECS: &str = "LORELINK_CACHE_TTL_SECS";
