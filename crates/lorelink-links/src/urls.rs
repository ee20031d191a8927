//! URL construction for canonical, search, and suggestion links.

use lorelink_core::defaults::{SCOPE_PLACEHOLDER, SEARCH_PATH, SUGGESTIONS_PATH};
use lorelink_core::EntityType;

/// Substitute `scope` into a base template and drop any trailing slash.
pub fn expand_scope(template: &str, scope: &str) -> String {
    template
        .replace(SCOPE_PLACEHOLDER, scope)
        .trim_end_matches('/')
        .to_string()
}

/// Percent-encode a query value.
///
/// Everything except ASCII alphanumerics and `-_.~` is escaped, including
/// `'()!*`, so parentheses in a name cannot end a markdown link target.
pub fn encode_query(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the public links written into rewritten text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_template: String,
}

impl LinkBuilder {
    /// `base_template` must contain `{scope}`, e.g. `https://{scope}.wowhead.com`.
    pub fn new(base_template: impl Into<String>) -> Self {
        Self {
            base_template: base_template.into(),
        }
    }

    pub fn base_template(&self) -> &str {
        &self.base_template
    }

    /// `https://{scope}.<domain>/{slug}={id}`
    pub fn canonical(&self, scope: &str, entity_type: EntityType, id: u64) -> String {
        format!(
            "{}/{}={}",
            expand_scope(&self.base_template, scope),
            entity_type.slug(),
            id
        )
    }

    /// `https://{scope}.<domain>/search?q=<name>`
    pub fn search(&self, scope: &str, name: &str) -> String {
        format!(
            "{}{}?q={}",
            expand_scope(&self.base_template, scope),
            SEARCH_PATH,
            encode_query(name)
        )
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new(lorelink_core::defaults::LINK_BASE)
    }
}

/// `{lookup base}/search/suggestions-template?q=<name>`
pub fn suggestions_url(lookup_template: &str, scope: &str, name: &str) -> String {
    format!(
        "{}{}?q={}",
        expand_scope(lookup_template, scope),
        SUGGESTIONS_PATH,
        encode_query(name)
    )
}
