//! # lorelink-links
//!
//! Mention resolution for generated text.
//!
//! This crate provides:
//! - Two-stage mention tokenizing (`{{type:Name}}` scan, then hint parse)
//! - A shared resolution cache with single-flight lookups and LRU/TTL bounds
//! - An HTTP client for the era-scoped suggestions endpoint
//! - Candidate disambiguation by type hint and exact-name priority
//! - Text rewriting into markdown links
//!
//! # Example
//!
//! ```rust,no_run
//! use lorelink_links::{Era, LinkerConfig, MentionResolver};
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = MentionResolver::from_config(&LinkerConfig::from_env()).unwrap();
//!     let text = resolver
//!         .rewrite_mentions("Farm {{item:Black Lotus}} in {{Winterspring}}.", Era::Classic)
//!         .await;
//!     println!("{}", text);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod disambiguate;
pub mod lookup;
pub mod mention;
pub mod resolver;
pub mod rewrite;
pub mod urls;

// Re-export core types
pub use lorelink_core::*;

pub use cache::{CacheKey, CachePolicy, CacheStats, ResolutionCache};
pub use config::LinkerConfig;
pub use disambiguate::{link_type, select_candidate};
pub use lookup::{parse_suggestions, SuggestionsClient};
pub use mention::{scan_mentions, Mention, MentionScanner, ParsedMention};
pub use resolver::{MentionResolver, ResolvedMention, RewriteReport};
pub use rewrite::{markdown_link, rewrite};
pub use urls::LinkBuilder;
