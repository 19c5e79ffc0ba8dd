//! Declarative input consumed once when a session is created.

use crate::game::error::SessionError;
use crate::model::affliction::Affliction;
use crate::model::location::Location;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pre-dealt starting hands hold `HAND_BUDGET - players` cards each.
pub const HAND_BUDGET: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    #[serde(alias = "epidemics_per_game")]
    pub crisis_events: usize,
    pub locations: Vec<LocationSetup>,
    #[serde(default)]
    pub players: Vec<PlayerSetup>,
    #[serde(default, alias = "funded_events")]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSetup {
    pub name: String,
    pub affliction: Affliction,
    /// Set when the location starts the game with an overridden affliction.
    #[serde(default)]
    pub original_affliction: Option<Affliction>,
    #[serde(default)]
    pub neighbors: Vec<String>,
}

impl LocationSetup {
    pub fn build(&self) -> Location {
        let original = self.original_affliction.unwrap_or(self.affliction);
        let mut location = Location::new(self.name.clone(), original, self.neighbors.clone());
        location.override_affliction(self.affliction);
        location
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub starting_cards: Vec<String>,
}

impl GameSetup {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Cards each player must hold when starting hands are pre-dealt.
    pub fn starting_hand_size(&self) -> usize {
        HAND_BUDGET.saturating_sub(self.players.len())
    }

    /// Names of every card the discovery deck is built from.
    pub fn card_names(&self) -> impl Iterator<Item = &str> {
        self.locations
            .iter()
            .map(|location| location.name.as_str())
            .chain(self.events.iter().map(String::as_str))
    }

    /// Checks everything the session constructor relies on. Graph edges are
    /// checked separately when the location graph is built.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.locations.is_empty() {
            return Err(config("at least one location is required"));
        }

        let mut cards = HashSet::new();
        for name in self.card_names() {
            if name.trim().is_empty() {
                return Err(config("card and location names must not be empty"));
            }
            if !cards.insert(name) {
                return Err(config(format!("{name} is defined more than once")));
            }
        }

        validate_players(self, &cards)
    }
}

fn validate_players(setup: &GameSetup, cards: &HashSet<&str>) -> Result<(), SessionError> {
    let mut names = HashSet::new();
    let mut roles = HashSet::new();
    let mut dealt = HashSet::new();
    let hand_size = setup.starting_hand_size();

    for player in &setup.players {
        if player.name.trim().is_empty() {
            return Err(config("player names must not be empty"));
        }
        if !names.insert(player.name.to_lowercase()) {
            return Err(config(format!("{} has already been added to the game", player.name)));
        }
        if let Some(role) = player.role {
            if !roles.insert(role) {
                return Err(config(format!(
                    "{} cannot be {role}: another player already has that role",
                    player.name
                )));
            }
        }
        if let Some(location) = player.location.as_deref() {
            if !setup.locations.iter().any(|l| l.name == location) {
                return Err(config(format!(
                    "{} starts at unknown location {location}",
                    player.name
                )));
            }
        }

        if player.starting_cards.is_empty() {
            continue;
        }
        if player.starting_cards.len() != hand_size {
            return Err(config(format!(
                "each player must start with {hand_size} cards, {} has {}",
                player.name,
                player.starting_cards.len()
            )));
        }
        for card in &player.starting_cards {
            if !cards.contains(card.as_str()) {
                return Err(config(format!("{card} is not a valid start card")));
            }
            if !dealt.insert(card.as_str()) {
                return Err(config(format!("{card} is dealt more than once")));
            }
        }
    }

    // A pre-dealt game deals every player, not just some of them.
    let expected = hand_size * setup.players.len();
    if !dealt.is_empty() && dealt.len() != expected {
        return Err(config(format!(
            "starting hands must deal {hand_size} cards to each of {} players ({expected} in total), got {}",
            setup.players.len(),
            dealt.len()
        )));
    }
    Ok(())
}

fn config(message: impl Into<String>) -> SessionError {
    SessionError::Configuration(message.into())
}

#[cfg(test)]
mod tests {
    use super::{GameSetup, LocationSetup, PlayerSetup};
    use crate::game::error::SessionError;
    use crate::model::affliction::Affliction;
    use crate::model::role::Role;

    fn location(name: &str) -> LocationSetup {
        LocationSetup {
            name: name.into(),
            affliction: Affliction::Blue,
            original_affliction: None,
            neighbors: vec![],
        }
    }

    fn player(name: &str, role: Option<Role>, cards: &[&str]) -> PlayerSetup {
        PlayerSetup {
            name: name.into(),
            role,
            location: None,
            starting_cards: cards.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn base() -> GameSetup {
        GameSetup {
            crisis_events: 2,
            locations: ["a", "b", "c", "d", "e", "f", "g", "h", "i"]
                .iter()
                .map(|n| location(n))
                .collect(),
            players: vec![],
            events: vec!["Airlift".into()],
        }
    }

    fn is_config(result: Result<(), SessionError>) -> bool {
        matches!(result, Err(SessionError::Configuration(_)))
    }

    #[test]
    fn accepts_matching_starting_hands() {
        let mut setup = base();
        setup.players = vec![
            player("Ana", Some(Role::Medic), &["a", "b", "c", "d"]),
            player("Bo", Some(Role::Scientist), &["e", "f", "g", "Airlift"]),
        ];
        assert_eq!(setup.starting_hand_size(), 4);
        setup.validate().unwrap();
    }

    #[test]
    fn rejects_hand_size_mismatch() {
        let mut setup = base();
        setup.players = vec![player("Ana", None, &["a"]), player("Bo", None, &[])];
        assert!(is_config(setup.validate()));
    }

    #[test]
    fn rejects_partial_deal() {
        let mut setup = base();
        setup.players = vec![
            player("Ana", None, &["a", "b", "c", "d"]),
            player("Bo", None, &[]),
        ];
        assert!(is_config(setup.validate()));

        setup.players[1] = player("Bo", None, &["e", "f", "g", "h"]);
        setup.validate().unwrap();
    }

    #[test]
    fn rejects_duplicate_deal_and_unknown_card() {
        let mut setup = base();
        setup.players = vec![
            player("Ana", None, &["a", "b", "c", "d"]),
            player("Bo", None, &["a", "f", "g", "h"]),
        ];
        assert!(is_config(setup.validate()));

        setup.players[1] = player("Bo", None, &["zz", "f", "g", "h"]);
        assert!(is_config(setup.validate()));
    }

    #[test]
    fn rejects_duplicate_roles_and_names() {
        let mut setup = base();
        setup.players = vec![
            player("Ana", Some(Role::Medic), &[]),
            player("Bo", Some(Role::Medic), &[]),
        ];
        assert!(is_config(setup.validate()));

        setup.players = vec![player("Ana", None, &[]), player("ana", None, &[])];
        assert!(is_config(setup.validate()));
    }

    #[test]
    fn rejects_event_clashing_with_location() {
        let mut setup = base();
        setup.events.push("a".into());
        assert!(is_config(setup.validate()));
    }

    #[test]
    fn parses_original_field_names() {
        let json = r#"{
            "epidemics_per_game": 4,
            "locations": [
                {"name": "Lima", "affliction": "Yellow", "neighbors": ["Bogota"]},
                {"name": "Bogota", "affliction": "Faded", "original_affliction": "Yellow", "neighbors": ["Lima"]}
            ],
            "players": [{"name": "Ana", "role": "QuarantineSpecialist"}],
            "funded_events": ["Airlift"]
        }"#;
        let setup = GameSetup::from_json(json).unwrap();
        assert_eq!(setup.crisis_events, 4);
        assert_eq!(setup.events, vec!["Airlift".to_string()]);
        let bogota = setup.locations[1].build();
        assert_eq!(bogota.affliction(), Affliction::Faded);
        assert_eq!(bogota.original_affliction(), Affliction::Yellow);
    }
}
