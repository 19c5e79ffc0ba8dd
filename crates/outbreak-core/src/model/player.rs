use crate::model::card::Card;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    role: Option<Role>,
    location: Option<String>,
    hand: Vec<Card>,
    starting_cards: Vec<String>,
}

impl Player {
    pub fn new(name: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            name: name.into(),
            role,
            location: None,
            hand: Vec::new(),
            starting_cards: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_counter_agent(&self) -> bool {
        self.role.is_some_and(Role::is_counter_agent)
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn holds(&self, card_name: &str) -> bool {
        self.hand.iter().any(|card| card.name() == card_name)
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    pub fn take_card(&mut self, card_name: &str) -> Option<Card> {
        let index = self.hand.iter().position(|card| card.name() == card_name)?;
        Some(self.hand.remove(index))
    }

    pub fn starting_cards(&self) -> &[String] {
        &self.starting_cards
    }

    pub fn record_starting_card(&mut self, card: Card) {
        self.starting_cards.push(card.name().to_string());
        self.hand.push(card);
    }
}
