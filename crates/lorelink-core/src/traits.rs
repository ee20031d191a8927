//! Core traits for lorelink.

use async_trait::async_trait;

use crate::models::{Era, LookupResponse};

/// Backend that searches an era-scoped entity database by name.
///
/// Implementations must not fail: transport and format problems are folded
/// into [`LookupResponse::failed`] so a single bad lookup can never break a
/// rewrite.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Search for entities named like `name` in the database for `era`.
    async fn search(&self, name: &str, era: Era) -> LookupResponse;

    /// Short identifier for logs.
    fn backend_name(&self) -> &str;
}
