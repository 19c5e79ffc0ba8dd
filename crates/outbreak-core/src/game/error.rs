use crate::model::deck::DeckError;
use crate::model::location::GraphError;
use core::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Location,
    Card,
    Player,
    Role,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Location => "location",
            EntityKind::Card => "card",
            EntityKind::Player => "player",
            EntityKind::Role => "role",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no {kind} matches '{name}'")]
    NotFound { kind: EntityKind, name: String },
    #[error("{0} has already been drawn")]
    AlreadyDrawn(String),
    #[error("{0} is already quarantined")]
    AlreadyQuarantined(String),
    #[error("{0} is not quarantined")]
    NotQuarantined(String),
    #[error("'{entry}' is an ambiguous {kind}: {}", .candidates.join(", "))]
    Ambiguous {
        kind: EntityKind,
        entry: String,
        candidates: Vec<String>,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Sequence(String),
    #[error("no crisis striation remains in the discovery deck")]
    NoStriationsRemain,
}

impl SessionError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        SessionError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<DeckError> for SessionError {
    fn from(value: DeckError) -> Self {
        match value {
            DeckError::NotFound(name) => SessionError::not_found(EntityKind::Card, name),
            DeckError::AlreadyDrawn(name) => SessionError::AlreadyDrawn(name),
            DeckError::NoStriationsRemain => SessionError::NoStriationsRemain,
        }
    }
}

impl From<GraphError> for SessionError {
    fn from(value: GraphError) -> Self {
        SessionError::Configuration(value.to_string())
    }
}
