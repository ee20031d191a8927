//! Substitution of mentions with markdown links.

use lorelink_core::{Era, Resolution};
use std::collections::HashMap;
use tracing::warn;

use crate::cache::CacheKey;
use crate::mention::{Mention, ParsedMention};
use crate::urls::LinkBuilder;

/// `[label](url)`
pub fn markdown_link(label: &str, url: &str) -> String {
    format!("[{}]({})", label, url)
}

/// Replace every scanned mention in `text` with a link to its resolution.
///
/// `mentions` must be in text order (as the scanner yields them). Text
/// between mentions is copied unchanged. A mention whose key has no
/// resolution links to the era's search page instead, so no mention is
/// ever left in place.
pub fn rewrite(
    text: &str,
    mentions: &[(Mention<'_>, ParsedMention)],
    era: Era,
    resolutions: &HashMap<CacheKey, Resolution>,
    links: &LinkBuilder,
) -> String {
    let mut out = String::with_capacity(text.len() + mentions.len() * 48);
    let mut cursor = 0;

    for (mention, parsed) in mentions {
        out.push_str(&text[cursor..mention.start]);

        let key = CacheKey::new(era, parsed);
        let link = match resolutions.get(&key) {
            Some(resolution) => markdown_link(&parsed.clean_name, &resolution.url),
            None => {
                warn!(key = %key, "No resolution for mention, linking to search");
                markdown_link(
                    &parsed.clean_name,
                    &links.search(era.scope(), &parsed.clean_name),
                )
            }
        };
        out.push_str(&link);
        cursor = mention.end;
    }

    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::scan_mentions;

    fn scanned(text: &str) -> Vec<(Mention<'_>, ParsedMention)> {
        scan_mentions(text).map(|m| (m, m.parse())).collect()
    }

    fn resolved(era: Era, raw: &str, url: &str) -> (CacheKey, Resolution) {
        (
            CacheKey::new(era, &ParsedMention::parse(raw)),
            Resolution::canonical(url.to_string()),
        )
    }

    #[test]
    fn test_rewrite_without_mentions_is_identity() {
        let text = "Nothing to link here {not a mention}.";
        let out = rewrite(text, &[], Era::Retail, &HashMap::new(), &LinkBuilder::default());
        assert_eq!(out, text);
    }

    #[test]
    fn test_rewrite_strips_type_hint_from_label() {
        let text = "Learn {{spell:Shadow Mastery}} first.";
        let map = HashMap::from([resolved(
            Era::Classic,
            "spell:Shadow Mastery",
            "https://classic.wowhead.com/spell=18271",
        )]);
        let out = rewrite(text, &scanned(text), Era::Classic, &map, &LinkBuilder::default());
        assert_eq!(
            out,
            "Learn [Shadow Mastery](https://classic.wowhead.com/spell=18271) first."
        );
    }

    #[test]
    fn test_rewrite_replaces_every_duplicate() {
        let text = "{{Thrall}} met {{thrall}} and {{Thrall}}";
        let map = HashMap::from([resolved(Era::Retail, "Thrall", "u")]);
        let out = rewrite(text, &scanned(text), Era::Retail, &map, &LinkBuilder::default());
        assert_eq!(out, "[Thrall](u) met [thrall](u) and [Thrall](u)");
    }

    #[test]
    fn test_rewrite_missing_resolution_links_to_search() {
        let text = "Find {{Foo Bar}}.";
        let out = rewrite(text, &scanned(text), Era::Tbc, &HashMap::new(), &LinkBuilder::default());
        assert_eq!(out, "Find [Foo Bar](https://tbc.wowhead.com/search?q=Foo%20Bar).");
    }

    #[test]
    fn test_rewrite_leaves_malformed_delimiters() {
        let text = "{{}} {{Onyxia}} {{unterminated";
        let map = HashMap::from([resolved(Era::Classic, "Onyxia", "u")]);
        let out = rewrite(text, &scanned(text), Era::Classic, &map, &LinkBuilder::default());
        assert_eq!(out, "{{}} [Onyxia](u) {{unterminated");
    }

    #[test]
    fn test_markdown_link() {
        assert_eq!(markdown_link("Hogger", "https://x/npc=448"), "[Hogger](https://x/npc=448)");
    }
}
