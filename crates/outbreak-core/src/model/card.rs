use core::fmt;
use serde::{Deserialize, Serialize};

/// A discovery-deck card. Location cards carry the name of the location they
/// reference; event cards carry their own display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Card {
    Location(String),
    Event(String),
}

impl Card {
    pub fn location(name: impl Into<String>) -> Self {
        Card::Location(name.into())
    }

    pub fn event(name: impl Into<String>) -> Self {
        Card::Event(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Card::Location(name) | Card::Event(name) => name,
        }
    }

    pub const fn is_location(&self) -> bool {
        matches!(self, Card::Location(_))
    }

    /// The referenced location, if this is a location card.
    pub fn location_name(&self) -> Option<&str> {
        match self {
            Card::Location(name) => Some(name),
            Card::Event(_) => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Location(name) => f.write_str(name),
            Card::Event(name) => write!(f, "{name} (event)"),
        }
    }
}
