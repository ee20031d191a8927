//! Candidate selection for a mention.
//!
//! ## Selection Order
//!
//! With a type hint, the first candidate of that type wins; if none has that
//! type, nothing is selected and the caller falls back to a search link.
//! A wrong-type link is worse than a search link.
//!
//! Without a hint:
//! 1. Candidates whose name equals the mention (case-insensitive) are preferred
//! 2. Among those, the lowest rank in [`EntityType::PRIORITY`] wins; unranked
//!    types sort last and ties keep the service's order
//! 3. With no exact match, the service's top-ranked candidate wins

use lorelink_core::{EntityType, LookupCandidate};

/// Pick the candidate a mention should link to, if any.
pub fn select_candidate<'a>(
    candidates: &'a [LookupCandidate],
    type_hint: Option<EntityType>,
    clean_name: &str,
) -> Option<&'a LookupCandidate> {
    if let Some(hint) = type_hint {
        return candidates
            .iter()
            .find(|c| c.entity_type() == Some(hint));
    }

    let wanted = clean_name.to_lowercase();
    let best_exact = candidates
        .iter()
        .filter(|c| c.name.to_lowercase() == wanted)
        .min_by_key(|c| rank(c));

    best_exact.or_else(|| candidates.first())
}

/// Slug for the canonical link of a selected candidate.
///
/// A hinted mention always links with its hint. Unmapped category codes
/// link as items.
pub fn link_type(candidate: &LookupCandidate, type_hint: Option<EntityType>) -> EntityType {
    type_hint
        .or_else(|| candidate.entity_type())
        .unwrap_or(EntityType::Item)
}

fn rank(candidate: &LookupCandidate) -> usize {
    candidate
        .entity_type()
        .and_then(EntityType::priority)
        .unwrap_or(usize::MAX)
}
