//! Structured logging schema and field name constants for lorelink.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation can query resolver events by the same names.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, construction), operation completions |
//! | DEBUG | Decision points: cache hit/miss, selected candidate, no-match |
//! | TRACE | Per-candidate iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "links", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "resolver", "cache", "lookup", "rewriter"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "rewrite_mentions", "resolve_mention", "search"
pub const OPERATION: &str = "op";

// ─── Mention fields ────────────────────────────────────────────────────────

/// Era token the rewrite runs under ("Classic", "TBC", ...).
pub const ERA: &str = "era";

/// Lookup scope (subdomain) derived from the era.
pub const SCOPE: &str = "scope";

/// Clean display name of a mention.
pub const MENTION: &str = "mention";

/// Explicit type hint, when the mention carried one.
pub const TYPE_HINT: &str = "type_hint";

/// Number of mentions found in a text.
pub const MENTION_COUNT: &str = "mention_count";

/// Number of distinct cache keys among those mentions.
pub const UNIQUE_COUNT: &str = "unique_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of candidates returned by the lookup service.
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Whether the resolution came from the cache.
pub const CACHE_HIT: &str = "cache_hit";

/// Resolution kind ("canonical", "fallback", "degraded").
pub const RESOLUTION: &str = "resolution";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
