//! Fuzzy name resolution used by the command layer.

use crate::game::error::{EntityKind, SessionError};
use crate::game::session::Session;
use crate::game::turns::PlayerId;

/// Resolves `entry` against `candidates`: an exact case-insensitive match
/// wins, otherwise the entry must be a prefix of exactly one candidate.
pub fn resolve_prefix<'a, I>(kind: EntityKind, entry: &str, candidates: I) -> Result<&'a str, SessionError>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = entry.trim().to_lowercase();
    if needle.is_empty() {
        return Err(SessionError::InvalidArgument(format!("empty {kind} name")));
    }

    let mut matches = Vec::new();
    for candidate in candidates {
        let lowered = candidate.to_lowercase();
        if lowered == needle {
            return Ok(candidate);
        }
        if lowered.starts_with(&needle) {
            matches.push(candidate);
        }
    }

    match matches.as_slice() {
        [] => Err(SessionError::not_found(kind, entry)),
        [only] => Ok(*only),
        _ => Err(SessionError::Ambiguous {
            kind,
            entry: entry.to_string(),
            candidates: matches.iter().map(|m| m.to_string()).collect(),
        }),
    }
}

pub fn resolve_location(session: &Session, entry: &str) -> Result<String, SessionError> {
    resolve_prefix(EntityKind::Location, entry, session.locations().names()).map(str::to_string)
}

/// Any discovery card: location cards and event cards, drawn or not.
pub fn resolve_card(session: &Session, entry: &str) -> Result<String, SessionError> {
    let names = session.discovery().cards().map(|card| card.name());
    resolve_prefix(EntityKind::Card, entry, names).map(str::to_string)
}

pub fn resolve_player(session: &Session, entry: &str) -> Result<PlayerId, SessionError> {
    let turns = session.turns();
    let name = resolve_prefix(
        EntityKind::Player,
        entry,
        turns.players().iter().map(|player| player.name()),
    )?;
    turns
        .find(name)
        .ok_or_else(|| SessionError::not_found(EntityKind::Player, entry))
}

pub fn resolve_player_by_role(session: &Session, entry: &str) -> Result<PlayerId, SessionError> {
    let turns = session.turns();
    let roles = turns
        .players()
        .iter()
        .filter_map(|player| player.role())
        .map(|role| role.as_str());
    let role = resolve_prefix(EntityKind::Role, entry, roles)?;
    turns
        .player_ids()
        .find(|id| {
            turns
                .player(*id)
                .and_then(|player| player.role())
                .is_some_and(|r| r.as_str() == role)
        })
        .ok_or_else(|| SessionError::not_found(EntityKind::Role, entry))
}

#[cfg(test)]
mod tests {
    use super::resolve_prefix;
    use crate::game::error::{EntityKind, SessionError};

    const CITIES: [&str; 4] = ["Lagos", "Lima", "London", "Los Angeles"];

    #[test]
    fn unique_prefix_resolves() {
        assert_eq!(
            resolve_prefix(EntityKind::Location, "lon", CITIES).unwrap(),
            "London"
        );
    }

    #[test]
    fn exact_match_beats_longer_candidates() {
        let names = ["Lima", "Limassol"];
        assert_eq!(resolve_prefix(EntityKind::Location, "LIMA", names).unwrap(), "Lima");
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        match resolve_prefix(EntityKind::Location, "l", CITIES) {
            Err(SessionError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 4),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn missing_and_empty_entries_fail() {
        assert!(matches!(
            resolve_prefix(EntityKind::Card, "zz", CITIES),
            Err(SessionError::NotFound { .. })
        ));
        assert!(matches!(
            resolve_prefix(EntityKind::Card, "  ", CITIES),
            Err(SessionError::InvalidArgument(_))
        ));
    }
}
