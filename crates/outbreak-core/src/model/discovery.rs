use crate::model::affliction::Affliction;
use crate::model::card::Card;
use crate::model::deck::DeckError;
use crate::model::location::LocationGraph;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One contiguous block of the discovery deck. Each block holds at most one
/// crisis card, which is tracked as pending until it surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Striation {
    cards: Vec<Card>,
    crisis_pending: bool,
}

impl Striation {
    pub fn new(cards: Vec<Card>, crisis_pending: bool) -> Self {
        Self {
            cards,
            crisis_pending,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn crisis_pending(&self) -> bool {
        self.crisis_pending
    }

    /// Undrawn cards left in the block, the crisis card included.
    pub fn remaining(&self) -> usize {
        self.cards.len() + usize::from(self.crisis_pending)
    }

    fn contains(&self, name: &str) -> bool {
        self.cards.iter().any(|card| card.name() == name)
    }
}

/// The city/resource deck. Index 0 of `striations` is the active block: the
/// one the next draw comes from. `drawn` holds every card that has left the
/// deck, starting hands included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDeck {
    striations: Vec<Striation>,
    drawn: Vec<Card>,
    crises_drawn: usize,
}

impl DiscoveryDeck {
    /// Splits `cards` into one block per crisis card (larger blocks first),
    /// shuffles each block independently and stacks them in order.
    pub fn generate<R: Rng + ?Sized>(cards: Vec<Card>, crisis_count: usize, rng: &mut R) -> Self {
        let has_crises = crisis_count > 0;
        let striations = partition(cards, crisis_count.max(1))
            .into_iter()
            .map(|mut block| {
                block.shuffle(rng);
                Striation::new(block, has_crises)
            })
            .collect();
        Self::from_striations(striations)
    }

    /// Builds a deck with an explicit layout, top block first.
    pub fn from_striations(striations: Vec<Striation>) -> Self {
        let mut deck = Self {
            striations,
            drawn: Vec::new(),
            crises_drawn: 0,
        };
        deck.compact();
        deck
    }

    /// Records a card that never entered the striations (a pre-dealt starting
    /// card) so the catalogue and cardinality stay complete.
    pub fn set_aside(&mut self, card: Card) {
        self.drawn.push(card);
    }

    pub fn striations(&self) -> &[Striation] {
        &self.striations
    }

    pub fn drawn(&self) -> &[Card] {
        &self.drawn
    }

    pub fn crises_drawn(&self) -> usize {
        self.crises_drawn
    }

    pub fn crises_remaining(&self) -> usize {
        self.striations.iter().filter(|s| s.crisis_pending).count()
    }

    pub fn is_drawn(&self, name: &str) -> bool {
        self.drawn.iter().any(|card| card.name() == name)
    }

    /// Looks a card up anywhere in the catalogue, drawn or not.
    pub fn card(&self, name: &str) -> Option<&Card> {
        self.cards().find(|card| card.name() == name)
    }

    /// Every card the deck knows about, undrawn first.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.striations
            .iter()
            .flat_map(|s| s.cards.iter())
            .chain(self.drawn.iter())
    }

    pub fn draw(&mut self, name: &str) -> Result<Card, DeckError> {
        if self.is_drawn(name) {
            return Err(DeckError::AlreadyDrawn(name.to_string()));
        }
        let (striation, position) = self
            .locate(name)
            .ok_or_else(|| DeckError::NotFound(name.to_string()))?;

        let card = self.striations[striation].cards.remove(position);
        if striation != 0 {
            // The card physically came off the active block; swap one of the
            // active block's cards into the slot it was modelled in.
            if let Some(filler) = self.striations[0].cards.pop() {
                warn!(
                    card = card.name(),
                    modelled_striation = striation,
                    "card drawn outside the active striation, rebalancing"
                );
                self.striations[striation].cards.push(filler);
            }
        }

        debug!(card = card.name(), remaining = self.remaining_cards(), "discovery card drawn");
        self.drawn.push(card.clone());
        self.compact();
        Ok(card)
    }

    /// Resolves the crisis card of the first block still holding one. Any
    /// leftover cards from spent blocks above it fold into that block, which
    /// then becomes the active one.
    pub fn draw_crisis(&mut self) -> Result<(), DeckError> {
        let index = self
            .striations
            .iter()
            .position(|s| s.crisis_pending)
            .ok_or(DeckError::NoStriationsRemain)?;

        if index > 0 {
            warn!(skipped = index, "crisis surfaced below the active striation, merging blocks");
            let leftovers: Vec<Card> = self
                .striations
                .drain(..index)
                .flat_map(|s| s.cards)
                .collect();
            self.striations[0].cards.extend(leftovers);
        }

        self.striations[0].crisis_pending = false;
        self.crises_drawn += 1;
        self.compact();
        info!(
            crises_drawn = self.crises_drawn,
            crises_remaining = self.crises_remaining(),
            "crisis drawn from discovery deck"
        );
        Ok(())
    }

    pub fn probability_of_crisis(&self) -> f64 {
        match self.striations.first() {
            Some(active) if active.crisis_pending => 1.0 / active.remaining() as f64,
            _ => 0.0,
        }
    }

    /// Chance the card is the next one out of its own block.
    pub fn probability_of_drawing(&self, name: &str) -> f64 {
        self.striations
            .iter()
            .find(|s| s.contains(name))
            .map(|s| 1.0 / s.remaining() as f64)
            .unwrap_or(0.0)
    }

    /// Undrawn cards, pending crisis cards included.
    pub fn remaining_cards(&self) -> usize {
        self.striations.iter().map(Striation::remaining).sum()
    }

    pub fn remaining_cards_with(&self, affliction: Affliction, locations: &LocationGraph) -> usize {
        self.striations
            .iter()
            .flat_map(|s| s.cards.iter())
            .filter_map(Card::location_name)
            .filter_map(|name| locations.get(name))
            .filter(|location| location.affliction() == affliction)
            .count()
    }

    /// Every card the deck was built with, crisis cards included.
    pub fn total_cards(&self) -> usize {
        self.remaining_cards() + self.drawn.len() + self.crises_drawn
    }

    /// First card name that appears more than once across the deck.
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.cards()
            .map(Card::name)
            .find(|name| !seen.insert(*name))
    }

    fn locate(&self, name: &str) -> Option<(usize, usize)> {
        self.striations.iter().enumerate().find_map(|(index, s)| {
            s.cards
                .iter()
                .position(|card| card.name() == name)
                .map(|position| (index, position))
        })
    }

    fn compact(&mut self) {
        self.striations.retain(|s| s.remaining() > 0);
    }
}

fn partition(cards: Vec<Card>, blocks: usize) -> Vec<Vec<Card>> {
    let base = cards.len() / blocks;
    let extra = cards.len() % blocks;
    let mut iter = cards.into_iter();
    (0..blocks)
        .map(|index| {
            let size = base + usize::from(index < extra);
            iter.by_ref().take(size).collect()
        })
        .collect()
}
