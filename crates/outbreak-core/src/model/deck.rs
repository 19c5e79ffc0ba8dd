use thiserror::Error;

/// Failures shared by the discovery and spread decks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("{0} is not in the deck")]
    NotFound(String),
    #[error("{0} has already been drawn")]
    AlreadyDrawn(String),
    #[error("no crisis striation remains in the discovery deck")]
    NoStriationsRemain,
}
