//! Point-in-time risk queries. Nothing here is cached: every answer is
//! recomputed from the decks and locations it is asked about.

use super::combinatorics::at_least_n_draws;
use crate::game::error::{EntityKind, SessionError};
use crate::game::session::Session;
use crate::game::turns::{CARDS_PER_TURN, PlayerId};
use crate::model::affliction::Affliction;
use crate::model::location::Location;
use crate::model::role::CureModifier;
use std::cmp::Ordering;

/// Matching cards a player needs in hand to cure, before role modifiers.
pub const BASE_CURE_REQUIREMENT: i64 = 5;

/// One entry of the urgency ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Risk {
    pub location: String,
    pub severity: u8,
    pub probability: f64,
    pub can_overload: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Forecaster<'a> {
    session: &'a Session,
}

impl<'a> Forecaster<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn probability_of_crisis(&self) -> f64 {
        self.session.discovery().probability_of_crisis()
    }

    /// Chance `location` worsens before the next spread phase completes.
    pub fn probability_of_location(&self, location: &str) -> Result<f64, SessionError> {
        let target = self.location(location)?;
        Ok(self.risk_of(target))
    }

    /// Whether the location could overload on the next spread phase: it is
    /// afflicted (or worsens on draw), has some risk, and is either at cap or
    /// among the bottom `crisis_rate` spread cards a crisis would pull from.
    pub fn can_overload(&self, location: &str) -> Result<bool, SessionError> {
        let target = self.location(location)?;
        Ok(self.overload_possible(target, self.risk_of(target)))
    }

    /// Chance `player` collects enough `affliction` cards to cure before the
    /// discovery deck runs out.
    pub fn probability_of_curing(
        &self,
        player: PlayerId,
        affliction: Affliction,
    ) -> Result<f64, SessionError> {
        let session = self.session;
        let holder = session.player(player)?;
        let modifier = match holder.role().map(|role| role.cure_modifier()) {
            Some(CureModifier::CannotCure) => return Ok(0.0),
            Some(CureModifier::Adjust(delta)) => delta,
            None => 0,
        };

        let in_hand = holder
            .hand()
            .iter()
            .filter_map(|card| card.location_name())
            .filter_map(|name| session.locations().get(name))
            .filter(|location| location.affliction() == affliction)
            .count() as i64;
        let required = BASE_CURE_REQUIREMENT - in_hand + modifier;

        let deck = session.discovery();
        let remaining = deck.remaining_cards();
        let turns_left = session.turns().remaining_turns_for(player, remaining)? as i64;
        let draws = CARDS_PER_TURN as i64 * (turns_left - 1);
        let successes = deck.remaining_cards_with(affliction, session.locations()) as i64;

        Ok(at_least_n_draws(remaining as i64, draws, required, successes))
    }

    /// Orders `locations` by severity (highest first), then by risk (highest
    /// first), then by name.
    pub fn sort_by_severity(&self, locations: &[String]) -> Result<Vec<String>, SessionError> {
        let mut ranked = locations
            .iter()
            .map(|name| self.assess(name))
            .collect::<Result<Vec<_>, _>>()?;
        ranked.sort_by(compare_risk);
        Ok(ranked.into_iter().map(|risk| risk.location).collect())
    }

    /// The `limit` locations most in need of attention.
    pub fn urgent(&self, limit: usize) -> Vec<Risk> {
        let mut ranked: Vec<Risk> = self
            .session
            .locations()
            .iter()
            .map(|location| self.assess_location(location))
            .filter(|risk| risk.probability > 0.0 || risk.severity > 0)
            .collect();
        ranked.sort_by(compare_risk);
        ranked.truncate(limit);
        ranked
    }

    pub fn assess(&self, location: &str) -> Result<Risk, SessionError> {
        self.location(location).map(|target| self.assess_location(target))
    }

    fn assess_location(&self, location: &Location) -> Risk {
        let probability = self.risk_of(location);
        Risk {
            location: location.name().to_string(),
            severity: location.severity(),
            probability,
            can_overload: self.overload_possible(location, probability),
        }
    }

    fn risk_of(&self, location: &Location) -> f64 {
        if location.is_quarantined() {
            return 0.0;
        }
        let name = location.name();
        let session = self.session;
        let spread = session.spread();
        let rate = session.crisis_rate();
        let p_crisis = self.probability_of_crisis();

        let on_draw = if location.affliction().infects_on_draw() && !location.is_at_cap() {
            session.discovery().probability_of_drawing(name)
        } else {
            0.0
        };

        let bottom = spread.bottom_striation(rate);
        let hit_on_crisis = if bottom.contains(&name) {
            1.0 / bottom.len() as f64
        } else if spread.is_drawn(name) {
            spread.probability_of_drawing(name, rate)
        } else {
            0.0
        };
        let crisis_branch = p_crisis * hit_on_crisis;
        let spread_branch = (1.0 - p_crisis) * spread.probability_of_drawing(name, rate);

        (on_draw + crisis_branch + spread_branch).clamp(0.0, 1.0)
    }

    fn overload_possible(&self, location: &Location, risk: f64) -> bool {
        if location.severity() == 0 && !location.affliction().infects_on_draw() {
            return false;
        }
        if risk <= 0.0 {
            return false;
        }
        location.is_at_cap()
            || self
                .session
                .spread()
                .bottom_striation(self.session.crisis_rate())
                .contains(&location.name())
    }

    fn location(&self, name: &str) -> Result<&'a Location, SessionError> {
        self.session
            .locations()
            .get(name)
            .ok_or_else(|| SessionError::not_found(EntityKind::Location, name))
    }
}

fn compare_risk(a: &Risk, b: &Risk) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| b.probability.total_cmp(&a.probability))
        .then_with(|| a.location.cmp(&b.location))
}
