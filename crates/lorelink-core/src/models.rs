//! Domain types shared across lorelink crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, LookupFailure};

// =============================================================================
// ERA
// =============================================================================

/// Game-content era a conversation is scoped to.
///
/// Each era selects one database scope on the lookup service. Several eras
/// share a scope (Anniversary realms use the Classic database).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Era {
    Anniversary,
    #[default]
    Classic,
    #[serde(rename = "TBC")]
    Tbc,
    #[serde(rename = "WotLK")]
    Wotlk,
    Retail,
}

impl Era {
    /// All eras in selector order.
    pub const ALL: [Era; 5] = [
        Era::Anniversary,
        Era::Classic,
        Era::Tbc,
        Era::Wotlk,
        Era::Retail,
    ];

    /// Subdomain of the lookup service holding this era's database.
    pub fn scope(self) -> &'static str {
        match self {
            Era::Retail => "www",
            Era::Tbc => "tbc",
            Era::Wotlk => "wotlk",
            Era::Classic | Era::Anniversary => "classic",
        }
    }

    /// Canonical display token ("TBC", "WotLK", ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Era::Anniversary => "Anniversary",
            Era::Classic => "Classic",
            Era::Tbc => "TBC",
            Era::Wotlk => "WotLK",
            Era::Retail => "Retail",
        }
    }

    /// Parse an era token, falling back to the default era for anything
    /// unrecognized. Use this at boundaries that must never fail.
    pub fn parse_lenient(s: &str) -> Era {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for Era {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anniversary" => Ok(Era::Anniversary),
            "classic" | "vanilla" => Ok(Era::Classic),
            "tbc" => Ok(Era::Tbc),
            "wotlk" => Ok(Era::Wotlk),
            "retail" => Ok(Era::Retail),
            _ => Err(Error::InvalidInput(format!("unknown era: {}", s))),
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ENTITY TYPE
// =============================================================================

/// Entity category a mention can be forced to, and the slug used in
/// canonical links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Item,
    Spell,
    Quest,
    Npc,
    Object,
    Achievement,
}

impl EntityType {
    /// Tie-break order for exact-name matches without a hint.
    /// Achievement is intentionally not ranked and sorts with unmapped codes.
    pub const PRIORITY: [EntityType; 5] = [
        EntityType::Item,
        EntityType::Spell,
        EntityType::Quest,
        EntityType::Npc,
        EntityType::Object,
    ];

    /// Map a lookup-service category code to an entity type.
    pub fn from_type_code(code: i64) -> Option<EntityType> {
        match code {
            3 => Some(EntityType::Item),
            6 => Some(EntityType::Spell),
            5 => Some(EntityType::Quest),
            1 => Some(EntityType::Npc),
            2 => Some(EntityType::Object),
            10 => Some(EntityType::Achievement),
            _ => None,
        }
    }

    /// Parse a hint token exactly (case-insensitive, no trimming).
    pub fn from_hint(token: &str) -> Option<EntityType> {
        match token.to_ascii_lowercase().as_str() {
            "item" => Some(EntityType::Item),
            "spell" => Some(EntityType::Spell),
            "quest" => Some(EntityType::Quest),
            "npc" => Some(EntityType::Npc),
            "object" => Some(EntityType::Object),
            "achievement" => Some(EntityType::Achievement),
            _ => None,
        }
    }

    /// Path slug used in canonical links.
    pub fn slug(self) -> &'static str {
        match self {
            EntityType::Item => "item",
            EntityType::Spell => "spell",
            EntityType::Quest => "quest",
            EntityType::Npc => "npc",
            EntityType::Object => "object",
            EntityType::Achievement => "achievement",
        }
    }

    /// Position in [`EntityType::PRIORITY`], if ranked.
    pub fn priority(self) -> Option<usize> {
        Self::PRIORITY.iter().position(|t| *t == self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// =============================================================================
// LOOKUP
// =============================================================================

/// One ranked result from the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCandidate {
    /// Service identifier of the entity.
    pub id: u64,
    /// Display name the service matched.
    pub name: String,
    /// Service category code (see [`EntityType::from_type_code`]).
    #[serde(rename = "type")]
    pub type_code: i64,
}

impl LookupCandidate {
    pub fn new(id: u64, name: impl Into<String>, type_code: i64) -> Self {
        Self {
            id,
            name: name.into(),
            type_code,
        }
    }

    /// Entity type this candidate's category code maps to, if any.
    pub fn entity_type(&self) -> Option<EntityType> {
        EntityType::from_type_code(self.type_code)
    }
}

/// Outcome of one lookup: the scope that was queried and the candidates in
/// the service's ranked order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    /// Scope (subdomain) the query ran against.
    pub scope: &'static str,
    /// Candidates, most relevant first. Empty on any failure.
    pub candidates: Vec<LookupCandidate>,
    /// Set when the candidates are empty because the lookup failed.
    pub failure: Option<LookupFailure>,
}

impl LookupResponse {
    pub fn found(scope: &'static str, candidates: Vec<LookupCandidate>) -> Self {
        Self {
            scope,
            candidates,
            failure: None,
        }
    }

    pub fn failed(scope: &'static str, failure: LookupFailure) -> Self {
        Self {
            scope,
            candidates: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// How a resolution URL was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    /// A candidate was selected; the URL points at the entity record.
    Canonical,
    /// The service answered but nothing was acceptable; search link.
    Fallback,
    /// The lookup failed; search link, not cached.
    Degraded,
}

impl ResolutionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionKind::Canonical => "canonical",
            ResolutionKind::Fallback => "fallback",
            ResolutionKind::Degraded => "degraded",
        }
    }
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final link for one distinct mention. The URL is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub url: String,
    pub kind: ResolutionKind,
}

impl Resolution {
    pub fn canonical(url: String) -> Self {
        Self {
            url,
            kind: ResolutionKind::Canonical,
        }
    }

    pub fn fallback(url: String) -> Self {
        Self {
            url,
            kind: ResolutionKind::Fallback,
        }
    }

    pub fn degraded(url: String) -> Self {
        Self {
            url,
            kind: ResolutionKind::Degraded,
        }
    }

    /// Whether this resolution may be memoized.
    pub fn is_cacheable(&self) -> bool {
        self.kind != ResolutionKind::Degraded
    }
}
