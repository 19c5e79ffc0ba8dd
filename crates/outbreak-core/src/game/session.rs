use crate::game::error::{EntityKind, SessionError};
use crate::game::outbreak::{self, CascadeReport, Hit};
use crate::game::setup::GameSetup;
use crate::game::turns::{CARDS_PER_TURN, PlayerId, Turn, TurnScheduler};
use crate::model::affliction::Affliction;
use crate::model::card::Card;
use crate::model::discovery::DiscoveryDeck;
use crate::model::location::{Location, LocationGraph, MAX_SEVERITY};
use crate::model::player::Player;
use crate::model::role::Role;
use crate::model::spread::SpreadDeck;
use crate::odds::Forecaster;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use tracing::info;

pub const INITIAL_CRISIS_RATE: usize = 2;

/// Spread rate after `n` crisis cards have been drawn is `CRISIS_RATE_TRACK[n]`,
/// holding at the last entry.
pub const CRISIS_RATE_TRACK: [usize; 7] = [2, 2, 2, 3, 3, 4, 4];

/// Result of a spread event hitting one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadEffect {
    /// Quarantine absorbed the event. `quarantine_lifted` is set when no
    /// counter-agent held the quarantine in place.
    Suppressed { quarantine_lifted: bool },
    Raised { severity: u8 },
    Overloaded(CascadeReport),
}

impl SpreadEffect {
    pub fn overloads(&self) -> usize {
        match self {
            SpreadEffect::Overloaded(report) => report.overloaded.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfectionOutcome {
    pub location: String,
    pub effect: SpreadEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisOutcome {
    pub location: String,
    pub effect: SpreadEffect,
    pub crisis_rate: usize,
    /// Spread cards shuffled back on top of the deck.
    pub reshuffled: usize,
}

/// A discovery draw. Location cards whose affliction worsens on draw carry
/// the resulting spread effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub player: PlayerId,
    pub card: Card,
    pub effect: Option<SpreadEffect>,
}

/// The aggregate root of a game. All mutation goes through the methods below,
/// each of which checks every precondition before it changes anything.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    seed: u64,
    rng: StdRng,
    locations: LocationGraph,
    discovery: DiscoveryDeck,
    spread: SpreadDeck,
    crisis_rate: usize,
    overloads: usize,
    turns: TurnScheduler,
    started: bool,
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.seed == other.seed
            && self.locations == other.locations
            && self.discovery == other.discovery
            && self.spread == other.spread
            && self.crisis_rate == other.crisis_rate
            && self.overloads == other.overloads
            && self.turns == other.turns
            && self.started == other.started
    }
}

impl Session {
    pub fn new(setup: &GameSetup, name: impl Into<String>, seed: u64) -> Result<Self, SessionError> {
        setup.validate()?;
        let locations = LocationGraph::new(setup.locations.iter().map(|l| l.build()).collect())?;

        let dealt_names: HashSet<&str> = setup
            .players
            .iter()
            .flat_map(|p| p.starting_cards.iter().map(String::as_str))
            .collect();
        let catalogue = setup
            .locations
            .iter()
            .map(|l| Card::location(l.name.clone()))
            .chain(setup.events.iter().map(|e| Card::event(e.clone())));
        let (dealt, undealt): (Vec<Card>, Vec<Card>) =
            catalogue.partition(|card| dealt_names.contains(card.name()));

        let mut rng = StdRng::seed_from_u64(seed);
        let mut discovery = DiscoveryDeck::generate(undealt, setup.crisis_events, &mut rng);
        let spread = SpreadDeck::new(locations.names().map(str::to_string).collect());

        let mut turns = TurnScheduler::new();
        for entry in &setup.players {
            let mut player = Player::new(entry.name.clone(), entry.role);
            if let Some(location) = &entry.location {
                player.set_location(location.clone());
            }
            for name in &entry.starting_cards {
                let card = dealt
                    .iter()
                    .find(|card| card.name() == name)
                    .cloned()
                    .ok_or_else(|| {
                        SessionError::Configuration(format!("{name} is not a valid start card"))
                    })?;
                discovery.set_aside(card.clone());
                player.record_starting_card(card);
            }
            turns.add_player(player);
        }

        let session = Self::from_parts(SessionParts {
            name: name.into(),
            seed,
            locations,
            discovery,
            spread,
            crisis_rate: INITIAL_CRISIS_RATE,
            overloads: 0,
            turns,
            started: false,
        });
        info!(
            session = %session.name,
            seed,
            locations = session.locations.len(),
            striations = session.discovery.striations().len(),
            players = session.turns.players().len(),
            "session created"
        );
        Ok(session)
    }

    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        Self {
            rng: StdRng::seed_from_u64(parts.seed),
            name: parts.name,
            seed: parts.seed,
            locations: parts.locations,
            discovery: parts.discovery,
            spread: parts.spread,
            crisis_rate: parts.crisis_rate,
            overloads: parts.overloads,
            turns: parts.turns,
            started: parts.started,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn locations(&self) -> &LocationGraph {
        &self.locations
    }

    pub fn discovery(&self) -> &DiscoveryDeck {
        &self.discovery
    }

    pub fn spread(&self) -> &SpreadDeck {
        &self.spread
    }

    pub fn crisis_rate(&self) -> usize {
        self.crisis_rate
    }

    pub fn overloads(&self) -> usize {
        self.overloads
    }

    pub fn turns(&self) -> &TurnScheduler {
        &self.turns
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, SessionError> {
        self.turns
            .player(id)
            .ok_or_else(|| SessionError::not_found(EntityKind::Player, format!("#{}", id.index())))
    }

    pub fn forecast(&self) -> Forecaster<'_> {
        Forecaster::new(self)
    }

    pub fn add_player(
        &mut self,
        name: &str,
        role: Option<Role>,
        location: Option<&str>,
    ) -> Result<PlayerId, SessionError> {
        if self.started {
            return Err(SessionError::Sequence(
                "players cannot join once the game has started".to_string(),
            ));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidArgument("player name must not be empty".to_string()));
        }
        let players = self.turns.players();
        if players.iter().any(|p| p.name().eq_ignore_ascii_case(name)) {
            return Err(SessionError::Configuration(format!(
                "{name} has already been added to the game"
            )));
        }
        if let Some(role) = role {
            if players.iter().any(|p| p.role() == Some(role)) {
                return Err(SessionError::Configuration(format!(
                    "{name} cannot be {role}: another player already has that role"
                )));
            }
        }
        if let Some(location) = location {
            self.require_location(location)?;
        }

        let mut player = Player::new(name, role);
        if let Some(location) = location {
            player.set_location(location);
        }
        let id = self.turns.add_player(player);
        info!(player = name, role = ?role, "player added");
        Ok(id)
    }

    pub fn start_game(&mut self) -> Result<(), SessionError> {
        if self.started {
            return Err(SessionError::Sequence("the game has already started".to_string()));
        }
        let turn = self.turns.current_turn()?;
        let first = self.player(turn.player())?.name().to_string();
        self.started = true;
        info!(session = %self.name, first_player = %first, "game started");
        Ok(())
    }

    pub fn next_turn(&mut self) -> Result<&Turn, SessionError> {
        self.turns.next_turn()
    }

    /// Deals a card into the current player's starting hand. Only allowed
    /// before the game starts and not subject to the per-turn limit.
    pub fn draw_starting_card(&mut self, card: &str) -> Result<PlayerId, SessionError> {
        if self.started {
            return Err(SessionError::Sequence(
                "starting cards can only be dealt before the game starts".to_string(),
            ));
        }
        let id = self.turns.current_player()?;
        let card = self.discovery.draw(card)?;
        if let Some(player) = self.turns.player_mut(id) {
            player.record_starting_card(card);
        }
        Ok(id)
    }

    /// The current player draws `card` from the discovery deck.
    pub fn draw_card(&mut self, card: &str) -> Result<DrawOutcome, SessionError> {
        let turn = self.turns.current_turn()?;
        let id = turn.player();
        if self.started && turn.draws() >= CARDS_PER_TURN {
            return Err(SessionError::Sequence(format!(
                "{} has already drawn {CARDS_PER_TURN} cards this turn",
                self.player(id)?.name()
            )));
        }
        if self.discovery.is_drawn(card) {
            return Err(SessionError::AlreadyDrawn(card.to_string()));
        }
        let target = self
            .discovery
            .card(card)
            .ok_or_else(|| SessionError::not_found(EntityKind::Card, card))?
            .location_name()
            .map(|name| self.require_location(name).map(|l| l.to_string()))
            .transpose()?;

        let drawn = self.discovery.draw(card)?;
        self.turns.current_turn_mut()?.record_card(drawn.name());
        if let Some(player) = self.turns.player_mut(id) {
            player.add_card(drawn.clone());
        }

        let worsens = target.filter(|name| {
            self.locations
                .get(name)
                .is_some_and(|l| l.affliction().infects_on_draw() && !l.is_at_cap())
        });
        let effect = match worsens {
            Some(name) => Some(self.spread_to(&name, false)?),
            None => None,
        };
        Ok(DrawOutcome {
            player: id,
            card: drawn,
            effect,
        })
    }

    pub fn give_card(&mut self, from: PlayerId, to: PlayerId, card: &str) -> Result<(), SessionError> {
        if from == to {
            return Err(SessionError::InvalidArgument(
                "a player cannot give a card to themselves".to_string(),
            ));
        }
        let giver = self.player(from)?;
        self.player(to)?;
        if !giver.holds(card) {
            return Err(SessionError::not_found(
                EntityKind::Card,
                format!("{card} in the hand of {}", giver.name()),
            ));
        }

        let taken = self.turns.player_mut(from).and_then(|p| p.take_card(card));
        if let (Some(taken), Some(receiver)) = (taken, self.turns.player_mut(to)) {
            receiver.add_card(taken);
        }
        Ok(())
    }

    pub fn discard(&mut self, player: PlayerId, card: &str) -> Result<Card, SessionError> {
        let holder = self.player(player)?;
        let name = holder.name().to_string();
        self.turns
            .player_mut(player)
            .and_then(|p| p.take_card(card))
            .ok_or_else(|| SessionError::not_found(EntityKind::Card, format!("{card} in the hand of {name}")))
    }

    pub fn move_player(&mut self, player: PlayerId, location: &str) -> Result<(), SessionError> {
        self.player(player)?;
        self.require_location(location)?;
        if let Some(player) = self.turns.player_mut(player) {
            player.set_location(location);
        }
        Ok(())
    }

    /// Ordinary spread draw of `location`.
    pub fn infect(&mut self, location: &str) -> Result<InfectionOutcome, SessionError> {
        self.require_location(location)?;
        if self.spread.is_drawn(location) {
            return Err(SessionError::AlreadyDrawn(location.to_string()));
        }
        self.spread.draw(location)?;
        let effect = self.spread_to(location, false)?;
        Ok(InfectionOutcome {
            location: location.to_string(),
            effect,
        })
    }

    /// Resolves a crisis card: `location` comes off the bottom of the spread
    /// deck, is raised to cap, the rate advances and the spread drawn pile is
    /// shuffled back on top.
    pub fn crisis(&mut self, location: &str) -> Result<CrisisOutcome, SessionError> {
        self.require_location(location)?;
        if !self.spread.is_undrawn(location) {
            return Err(if self.spread.is_drawn(location) {
                SessionError::AlreadyDrawn(location.to_string())
            } else {
                SessionError::not_found(EntityKind::Card, location)
            });
        }
        if self.discovery.crises_remaining() == 0 {
            return Err(SessionError::NoStriationsRemain);
        }
        if self.started {
            let turn = self.turns.current_turn()?;
            if turn.draws() >= CARDS_PER_TURN {
                return Err(SessionError::Sequence(format!(
                    "{} has already drawn {CARDS_PER_TURN} cards this turn",
                    self.player(turn.player())?.name()
                )));
            }
        }

        self.spread.pull_from_bottom(location)?;
        self.discovery.draw_crisis()?;
        if self.started {
            self.turns.current_turn_mut()?.record_crisis();
        }

        let effect = self.spread_to(location, true)?;
        let track = CRISIS_RATE_TRACK
            .get(self.discovery.crises_drawn())
            .or(CRISIS_RATE_TRACK.last())
            .copied()
            .unwrap_or(INITIAL_CRISIS_RATE);
        self.crisis_rate = self.crisis_rate.max(track);

        let reshuffled = self.spread.drawn().len();
        self.spread.shuffle_drawn(&mut self.rng);
        info!(
            location,
            crisis_rate = self.crisis_rate,
            reshuffled,
            overloads = effect.overloads(),
            "crisis resolved"
        );
        Ok(CrisisOutcome {
            location: location.to_string(),
            effect,
            crisis_rate: self.crisis_rate,
            reshuffled,
        })
    }

    pub fn set_severity(&mut self, location: &str, severity: u8) -> Result<(), SessionError> {
        if severity > MAX_SEVERITY {
            return Err(SessionError::InvalidArgument(format!(
                "severity must be between 0 and {MAX_SEVERITY}, got {severity}"
            )));
        }
        self.location_mut(location)?.set_severity(severity);
        Ok(())
    }

    /// Removes up to `levels` severity and returns what is left.
    pub fn treat(&mut self, location: &str, levels: u8) -> Result<u8, SessionError> {
        let location = self.location_mut(location)?;
        location.treat(levels);
        Ok(location.severity())
    }

    pub fn quarantine(&mut self, location: &str) -> Result<(), SessionError> {
        if self.location_mut(location)?.quarantine() {
            Ok(())
        } else {
            Err(SessionError::AlreadyQuarantined(location.to_string()))
        }
    }

    pub fn lift_quarantine(&mut self, location: &str) -> Result<(), SessionError> {
        if self.location_mut(location)?.lift_quarantine() {
            Ok(())
        } else {
            Err(SessionError::NotQuarantined(location.to_string()))
        }
    }

    pub fn set_affliction(&mut self, location: &str, affliction: Affliction) -> Result<(), SessionError> {
        self.location_mut(location)?.override_affliction(affliction);
        Ok(())
    }

    pub fn set_crisis_rate(&mut self, rate: usize) -> Result<(), SessionError> {
        if rate == 0 {
            return Err(SessionError::InvalidArgument(
                "crisis rate must be at least 1".to_string(),
            ));
        }
        self.crisis_rate = rate;
        Ok(())
    }

    /// Hits `location` once (or raises it straight to cap for a crisis) and
    /// cascades any resulting overload.
    fn spread_to(&mut self, location: &str, crisis: bool) -> Result<SpreadEffect, SessionError> {
        let turns = &self.turns;
        let shielded = |name: &str| turns.counter_agent_at(name);

        let hit = if crisis {
            let target = self
                .locations
                .get_mut(location)
                .ok_or_else(|| SessionError::not_found(EntityKind::Location, location))?;
            if target.is_quarantined() {
                let lifted = !shielded(location) && target.lift_quarantine();
                Hit::Suppressed { lifted }
            } else if target.crisis() {
                Hit::Overloaded
            } else {
                Hit::Raised {
                    severity: target.severity(),
                }
            }
        } else {
            outbreak::strike(&mut self.locations, location, shielded)?
        };

        let effect = match hit {
            Hit::Suppressed { lifted } => SpreadEffect::Suppressed {
                quarantine_lifted: lifted,
            },
            Hit::Raised { severity } => SpreadEffect::Raised { severity },
            Hit::Overloaded => {
                let report = outbreak::cascade(&mut self.locations, location, shielded)?;
                self.overloads += report.overloaded.len();
                SpreadEffect::Overloaded(report)
            }
        };
        Ok(effect)
    }

    fn require_location<'a>(&self, location: &'a str) -> Result<&'a str, SessionError> {
        if self.locations.contains(location) {
            Ok(location)
        } else {
            Err(SessionError::not_found(EntityKind::Location, location))
        }
    }

    fn location_mut(&mut self, location: &str) -> Result<&mut Location, SessionError> {
        self.locations
            .get_mut(location)
            .ok_or_else(|| SessionError::not_found(EntityKind::Location, location))
    }
}

/// Everything a session is made of apart from its random source.
pub(crate) struct SessionParts {
    pub name: String,
    pub seed: u64,
    pub locations: LocationGraph,
    pub discovery: DiscoveryDeck,
    pub spread: SpreadDeck,
    pub crisis_rate: usize,
    pub overloads: usize,
    pub turns: TurnScheduler,
    pub started: bool,
}

#[cfg(test)]
mod tests {
    use super::{CRISIS_RATE_TRACK, Session, SpreadEffect};
    use crate::game::error::SessionError;
    use crate::game::setup::{GameSetup, LocationSetup, PlayerSetup};
    use crate::game::turns::CARDS_PER_TURN;
    use crate::model::affliction::Affliction;
    use crate::model::location::MAX_SEVERITY;
    use crate::model::role::Role;

    fn location(name: &str, affliction: Affliction, neighbors: &[&str]) -> LocationSetup {
        LocationSetup {
            name: name.into(),
            affliction,
            original_affliction: None,
            neighbors: neighbors.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn player(name: &str, role: Option<Role>) -> PlayerSetup {
        PlayerSetup {
            name: name.into(),
            role,
            location: Some("Atlanta".into()),
            starting_cards: vec![],
        }
    }

    fn setup() -> GameSetup {
        GameSetup {
            crisis_events: 2,
            locations: vec![
                location("Atlanta", Affliction::Blue, &["Chicago", "Miami"]),
                location("Chicago", Affliction::Blue, &["Atlanta", "Montreal"]),
                location("Miami", Affliction::Yellow, &["Atlanta"]),
                location("Montreal", Affliction::Blue, &["Chicago"]),
                location("Lagos", Affliction::Faded, &[]),
                location("Cairo", Affliction::Black, &[]),
            ],
            players: vec![
                player("Ana", Some(Role::Medic)),
                player("Bo", Some(Role::QuarantineSpecialist)),
            ],
            events: vec!["Airlift".into()],
        }
    }

    fn session() -> Session {
        Session::new(&setup(), "test", 7).unwrap()
    }

    #[test]
    fn new_session_has_initial_counters() {
        let session = session();
        assert_eq!(session.crisis_rate(), 2);
        assert_eq!(session.overloads(), 0);
        assert!(!session.is_started());
        assert_eq!(session.discovery().total_cards(), 7 + 2);
        assert_eq!(session.spread().total(), 6);
        assert_eq!(session.turns().players().len(), 2);
    }

    #[test]
    fn starting_cards_stay_out_of_striations() {
        let mut setup = setup();
        setup.events.extend(["Forecast".into(), "Grant".into(), "Lift".into()]);
        setup.players[0].starting_cards = vec!["Atlanta".into(), "Miami".into(), "Cairo".into(), "Airlift".into()];
        setup.players[1].starting_cards = vec!["Chicago".into(), "Montreal".into(), "Lagos".into(), "Forecast".into()];
        let session = Session::new(&setup, "dealt", 1).unwrap();
        let deck = session.discovery();
        assert_eq!(deck.drawn().len(), 8);
        assert_eq!(deck.remaining_cards(), 2 + 2);
        assert!(deck.striations().iter().all(|s| s.cards().iter().all(|c| c.name() != "Atlanta")));
        let ana = session.player(session.turns().find("Ana").unwrap()).unwrap();
        assert_eq!(ana.hand().len(), 4);
        assert_eq!(ana.starting_cards().len(), 4);
    }

    #[test]
    fn duplicate_roles_abort_setup() {
        let mut setup = setup();
        setup.players[1].role = Some(Role::Medic);
        assert!(matches!(
            Session::new(&setup, "dup", 1),
            Err(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn draw_limit_applies_once_started() {
        let mut session = session();
        let cards: Vec<String> = session
            .discovery()
            .striations()
            .iter()
            .flat_map(|s| s.cards().iter().map(|c| c.name().to_string()))
            .filter(|name| name != "Lagos")
            .collect();
        session.draw_starting_card(&cards[0]).unwrap();
        session.start_game().unwrap();
        for card in &cards[1..=CARDS_PER_TURN] {
            session.draw_card(card).unwrap();
        }
        let err = session.draw_card(&cards[CARDS_PER_TURN + 1]).unwrap_err();
        assert!(matches!(err, SessionError::Sequence(_)));
        session.next_turn().unwrap();
        session.draw_card(&cards[CARDS_PER_TURN + 1]).unwrap();
    }

    #[test]
    fn drawn_card_cannot_be_drawn_again() {
        let mut session = session();
        session.draw_card("Cairo").unwrap();
        assert_eq!(
            session.draw_card("Cairo").unwrap_err(),
            SessionError::AlreadyDrawn("Cairo".into())
        );
        assert!(matches!(
            session.draw_card("Nowhere"),
            Err(SessionError::NotFound { .. })
        ));
    }

    #[test]
    fn faded_card_worsens_its_location_when_drawn() {
        let mut session = session();
        let outcome = session.draw_card("Lagos").unwrap();
        assert_eq!(outcome.effect, Some(SpreadEffect::Raised { severity: 1 }));
        assert_eq!(session.locations().get("Lagos").unwrap().severity(), 1);
    }

    #[test]
    fn infect_cascades_overloads() {
        let mut session = session();
        session.set_severity("Atlanta", MAX_SEVERITY).unwrap();
        session.set_severity("Chicago", MAX_SEVERITY).unwrap();
        let outcome = session.infect("Atlanta").unwrap();
        match outcome.effect {
            SpreadEffect::Overloaded(report) => {
                assert_eq!(report.overloaded, vec!["Atlanta", "Chicago"]);
                assert_eq!(report.depth, 2);
            }
            other => panic!("expected overload, got {other:?}"),
        }
        assert_eq!(session.overloads(), 2);
        assert_eq!(session.locations().get("Miami").unwrap().severity(), 1);
        assert_eq!(session.locations().get("Montreal").unwrap().severity(), 1);
        assert!(session.spread().is_drawn("Atlanta"));
    }

    #[test]
    fn infect_refuses_already_drawn_location() {
        let mut session = session();
        session.infect("Cairo").unwrap();
        assert_eq!(
            session.infect("Cairo").unwrap_err(),
            SessionError::AlreadyDrawn("Cairo".into())
        );
    }

    #[test]
    fn quarantine_absorbs_and_lifts_without_specialist() {
        let mut session = session();
        session.quarantine("Cairo").unwrap();
        assert_eq!(
            session.quarantine("Cairo").unwrap_err(),
            SessionError::AlreadyQuarantined("Cairo".into())
        );
        let outcome = session.infect("Cairo").unwrap();
        assert_eq!(
            outcome.effect,
            SpreadEffect::Suppressed {
                quarantine_lifted: true
            }
        );
        assert_eq!(
            session.lift_quarantine("Cairo").unwrap_err(),
            SessionError::NotQuarantined("Cairo".into())
        );
    }

    #[test]
    fn specialist_holds_quarantine() {
        let mut session = session();
        session.quarantine("Atlanta").unwrap();
        let outcome = session.infect("Atlanta").unwrap();
        assert_eq!(
            outcome.effect,
            SpreadEffect::Suppressed {
                quarantine_lifted: false
            }
        );
        assert!(session.locations().get("Atlanta").unwrap().is_quarantined());
        assert_eq!(session.locations().get("Atlanta").unwrap().severity(), 0);
    }

    #[test]
    fn crisis_raises_to_cap_and_reshuffles() {
        let mut session = session();
        session.infect("Cairo").unwrap();
        let outcome = session.crisis("Montreal").unwrap();
        assert_eq!(outcome.effect, SpreadEffect::Raised { severity: MAX_SEVERITY });
        assert_eq!(outcome.reshuffled, 2);
        assert_eq!(outcome.crisis_rate, CRISIS_RATE_TRACK[1]);
        assert!(session.spread().drawn().is_empty());
        assert_eq!(session.spread().undrawn().len(), 6);
        assert_eq!(session.discovery().crises_drawn(), 1);
    }

    #[test]
    fn crisis_on_infected_location_overloads() {
        let mut session = session();
        session.set_severity("Miami", 1).unwrap();
        let outcome = session.crisis("Miami").unwrap();
        assert!(matches!(outcome.effect, SpreadEffect::Overloaded(_)));
        assert_eq!(session.overloads(), 1);
        assert_eq!(session.locations().get("Atlanta").unwrap().severity(), 1);
    }

    #[test]
    fn crisis_fails_cleanly_when_none_remain() {
        let mut session = session();
        session.crisis("Cairo").unwrap();
        session.crisis("Miami").unwrap();
        let before = session.clone();
        assert_eq!(
            session.crisis("Lagos").unwrap_err(),
            SessionError::NoStriationsRemain
        );
        assert_eq!(session, before);
    }

    #[test]
    fn crisis_rate_follows_track_but_keeps_manual_raise() {
        let mut session = session();
        session.set_crisis_rate(3).unwrap();
        session.crisis("Cairo").unwrap();
        assert_eq!(session.crisis_rate(), 3);
        assert!(matches!(
            session.set_crisis_rate(0),
            Err(SessionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn give_card_validates_before_moving() {
        let mut session = session();
        let ana = session.turns().find("Ana").unwrap();
        let bo = session.turns().find("Bo").unwrap();
        session.draw_card("Cairo").unwrap();
        let before = session.clone();
        assert!(session.give_card(ana, bo, "Miami").is_err());
        assert_eq!(session, before);
        session.give_card(ana, bo, "Cairo").unwrap();
        assert!(session.player(bo).unwrap().holds("Cairo"));
        assert!(!session.player(ana).unwrap().holds("Cairo"));
        session.discard(bo, "Cairo").unwrap();
        assert!(session.player(bo).unwrap().hand().is_empty());
    }

    #[test]
    fn add_player_rules() {
        let mut session = session();
        assert!(matches!(
            session.add_player("ana", None, None),
            Err(SessionError::Configuration(_))
        ));
        assert!(matches!(
            session.add_player("Cy", Some(Role::Medic), None),
            Err(SessionError::Configuration(_))
        ));
        assert!(matches!(
            session.add_player("Cy", None, Some("Atlantis")),
            Err(SessionError::NotFound { .. })
        ));
        session.add_player("Cy", Some(Role::Scientist), Some("Cairo")).unwrap();
        session.start_game().unwrap();
        assert!(matches!(
            session.add_player("Di", None, None),
            Err(SessionError::Sequence(_))
        ));
    }

    #[test]
    fn start_needs_two_players() {
        let mut setup = setup();
        setup.players.truncate(1);
        let mut session = Session::new(&setup, "solo", 3).unwrap();
        assert!(matches!(session.start_game(), Err(SessionError::Sequence(_))));
        assert!(matches!(session.next_turn(), Err(SessionError::Sequence(_))));
    }

    #[test]
    fn location_edits() {
        let mut session = session();
        assert!(matches!(
            session.set_severity("Cairo", 4),
            Err(SessionError::InvalidArgument(_))
        ));
        session.set_severity("Cairo", 3).unwrap();
        assert_eq!(session.treat("Cairo", 2).unwrap(), 1);
        assert_eq!(session.treat("Cairo", 5).unwrap(), 0);
        session.set_affliction("Cairo", Affliction::Red).unwrap();
        let cairo = session.locations().get("Cairo").unwrap();
        assert_eq!(cairo.affliction(), Affliction::Red);
        assert_eq!(cairo.original_affliction(), Affliction::Black);
    }
}
