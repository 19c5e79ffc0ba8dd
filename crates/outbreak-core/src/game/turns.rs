use crate::game::error::SessionError;
use crate::model::player::Player;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CARDS_PER_TURN: usize = 2;
pub const MIN_PLAYERS: usize = 2;

/// Stable handle into the scheduler's player table. Turns refer to players
/// through this handle so hand edits are never made on a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(usize);

impl PlayerId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    player: PlayerId,
    drawn_cards: Vec<String>,
    crises: usize,
}

impl Turn {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            drawn_cards: Vec::new(),
            crises: 0,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn drawn_cards(&self) -> &[String] {
        &self.drawn_cards
    }

    pub fn crises(&self) -> usize {
        self.crises
    }

    /// Discovery draws made this turn, crisis cards included.
    pub fn draws(&self) -> usize {
        self.drawn_cards.len() + self.crises
    }

    pub(crate) fn record_card(&mut self, name: &str) {
        self.drawn_cards.push(name.to_string());
    }

    pub(crate) fn record_crisis(&mut self) {
        self.crises += 1;
    }
}

/// Round-robin turn order. Turn operations are refused until at least
/// `MIN_PLAYERS` players are registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScheduler {
    players: Vec<Player>,
    current: usize,
    turns: Vec<Turn>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&mut self, player: Player) -> PlayerId {
        let id = PlayerId(self.players.len());
        self.players.push(player);
        if self.players.len() == 1 {
            self.turns.push(Turn::new(id));
        }
        id
    }

    pub fn is_active(&self) -> bool {
        self.players.len() >= MIN_PLAYERS
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.players.len()).map(PlayerId)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .position(|player| player.name() == name)
            .map(PlayerId)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// 1-based number of the live turn.
    pub fn turn_number(&self) -> usize {
        self.current + 1
    }

    pub fn current_turn(&self) -> Result<&Turn, SessionError> {
        self.require_active()?;
        self.turns
            .get(self.current)
            .ok_or_else(|| SessionError::Sequence("no turn has been opened".to_string()))
    }

    pub(crate) fn current_turn_mut(&mut self) -> Result<&mut Turn, SessionError> {
        self.require_active()?;
        self.turns
            .get_mut(self.current)
            .ok_or_else(|| SessionError::Sequence("no turn has been opened".to_string()))
    }

    pub fn current_player(&self) -> Result<PlayerId, SessionError> {
        self.current_turn().map(Turn::player)
    }

    pub fn next_turn(&mut self) -> Result<&Turn, SessionError> {
        self.require_active()?;
        self.current += 1;
        let id = PlayerId(self.current % self.players.len());
        self.turns.push(Turn::new(id));
        info!(
            turn = self.turn_number(),
            player = self.players[id.0].name(),
            "turn advanced"
        );
        self.current_turn()
    }

    /// Whether a counter-agent currently stands on `location`.
    pub fn counter_agent_at(&self, location: &str) -> bool {
        self.players
            .iter()
            .any(|player| player.is_counter_agent() && player.location() == Some(location))
    }

    /// Number of turns `player` still gets before the discovery deck runs
    /// out, counting the live turn if it still owes draws.
    pub fn remaining_turns_for(
        &self,
        player: PlayerId,
        remaining_cards: usize,
    ) -> Result<usize, SessionError> {
        let turn = self.current_turn()?;
        let count = self.players.len();

        let mut index = self.current;
        let mut need = CARDS_PER_TURN.saturating_sub(turn.draws());
        if need == 0 {
            index += 1;
            need = CARDS_PER_TURN;
        }

        let mut cards = remaining_cards;
        let mut turns = 0;
        while cards >= need {
            cards -= need;
            if index % count == player.0 {
                turns += 1;
            }
            index += 1;
            need = CARDS_PER_TURN;
        }
        Ok(turns)
    }

    /// Structural checks applied to restored schedulers.
    pub fn validate(&self) -> Result<(), String> {
        if self.players.is_empty() {
            return if self.turns.is_empty() {
                Ok(())
            } else {
                Err("turn log present without players".to_string())
            };
        }
        if self.current >= self.turns.len() {
            return Err(format!(
                "current turn {} is outside the turn log of {}",
                self.current,
                self.turns.len()
            ));
        }
        if let Some(turn) = self.turns.iter().find(|t| t.player.0 >= self.players.len()) {
            return Err(format!("turn refers to unknown player #{}", turn.player.0));
        }
        Ok(())
    }

    fn require_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::Sequence(format!(
                "need at least {MIN_PLAYERS} players before starting the game, currently have {}",
                self.players.len()
            )))
        }
    }
}
