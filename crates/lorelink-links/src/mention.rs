//! Mention tokenization for generated text.
//!
//! Tokenizing runs in two explicit stages:
//!
//! 1. [`scan_mentions`] finds `{{...}}` spans and yields them in text order.
//! 2. [`ParsedMention::parse`] splits an optional type hint from the name.
//!
//! # Scanning rules
//!
//! 1. The first `}}` after a `{{` closes the mention (non-greedy)
//! 2. Nested delimiters are not balanced: `{{a {{b}} c}}` yields `a {{b`
//! 3. An unterminated `{{` ends scanning; the rest is plain text
//! 4. Empty or whitespace-only mentions are skipped and left verbatim
//! 5. Duplicates are yielded once per occurrence
//!
//! # Examples
//!
//! ```
//! use lorelink_links::mention::scan_mentions;
//!
//! let text = "Equip {{item:Thunderfury}} before {{Ragnaros}}.";
//! let raw: Vec<&str> = scan_mentions(text).map(|m| m.raw).collect();
//! assert_eq!(raw, vec!["item:Thunderfury", "Ragnaros"]);
//! ```

use lorelink_core::defaults::{MENTION_CLOSE, MENTION_OPEN};
use lorelink_core::EntityType;

/// A delimited span of text naming an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mention<'a> {
    /// Inner text between the delimiters, untrimmed.
    pub raw: &'a str,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// Zero-based position among all mentions in the text.
    pub index: usize,
}

impl Mention<'_> {
    pub fn parse(&self) -> ParsedMention {
        ParsedMention::parse(self.raw)
    }
}

/// Lazy, restartable iterator over the mentions of a text.
#[derive(Debug, Clone)]
pub struct MentionScanner<'a> {
    text: &'a str,
    pos: usize,
    index: usize,
}

impl<'a> MentionScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            index: 0,
        }
    }
}

impl<'a> Iterator for MentionScanner<'a> {
    type Item = Mention<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.text.get(self.pos..)?;
            let open = self.pos + rest.find(MENTION_OPEN)?;
            let inner_start = open + MENTION_OPEN.len();
            let Some(close_rel) = self.text[inner_start..].find(MENTION_CLOSE) else {
                // Unterminated: nothing after this point can be a mention.
                self.pos = self.text.len();
                return None;
            };
            let inner_end = inner_start + close_rel;
            let end = inner_end + MENTION_CLOSE.len();
            self.pos = end;

            let raw = &self.text[inner_start..inner_end];
            if raw.trim().is_empty() {
                continue;
            }

            let mention = Mention {
                raw,
                start: open,
                end,
                index: self.index,
            };
            self.index += 1;
            return Some(mention);
        }
    }
}

/// Scan `text` for mentions.
pub fn scan_mentions(text: &str) -> MentionScanner<'_> {
    MentionScanner::new(text)
}

/// A mention split into its display name and optional type hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedMention {
    /// Trimmed display name, case preserved.
    pub clean_name: String,
    /// Forced entity type from a `type:` prefix.
    pub type_hint: Option<EntityType>,
}

impl ParsedMention {
    /// Parse the inner text of a mention.
    ///
    /// The text is trimmed, then only a prefix exactly matching a known type
    /// token (case-insensitive) is treated as a hint. `Quest: The Missing
    /// Diplomat` splits; `Ashbringer: Reforged` and `npc :Thrall` do not.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some((prefix, rest)) = trimmed.split_once(':') {
            if let Some(hint) = EntityType::from_hint(prefix) {
                let name = rest.trim();
                if !name.is_empty() {
                    return Self {
                        clean_name: name.to_string(),
                        type_hint: Some(hint),
                    };
                }
            }
        }

        Self {
            clean_name: trimmed.to_string(),
            type_hint: None,
        }
    }

    /// Name normalized for matching and cache keys.
    pub fn normalized_name(&self) -> String {
        self.clean_name.to_lowercase()
    }
}
