//! # lorelink-core
//!
//! Core types, traits, and abstractions for the lorelink mention resolver.
//!
//! This crate provides the era and entity-type vocabulary, the lookup
//! backend trait, and the error and logging conventions that the other
//! lorelink crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, LookupFailure, Result};
pub use models::*;
pub use traits::*;
