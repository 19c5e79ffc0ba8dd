use super::error::SessionError;
use super::session::{Session, SessionParts};
use super::turns::TurnScheduler;
use crate::model::discovery::DiscoveryDeck;
use crate::model::location::LocationGraph;
use crate::model::spread::SpreadDeck;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] SessionError),
}

/// Field-tagged record of a whole session. The random source is not stored;
/// a restored session reseeds from `seed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub name: String,
    pub seed: u64,
    pub crisis_rate: usize,
    pub overloads: usize,
    pub started: bool,
    pub locations: LocationGraph,
    pub discovery: DiscoveryDeck,
    pub spread: SpreadDeck,
    pub turns: TurnScheduler,
}

impl SessionSnapshot {
    pub fn capture(session: &Session) -> Self {
        SessionSnapshot {
            name: session.name().to_string(),
            seed: session.seed(),
            crisis_rate: session.crisis_rate(),
            overloads: session.overloads(),
            started: session.is_started(),
            locations: session.locations().clone(),
            discovery: session.discovery().clone(),
            spread: session.spread().clone(),
            turns: session.turns().clone(),
        }
    }

    /// Rebuilds the session after checking the record is internally
    /// consistent. Hand-edited saves are the usual source of failures here.
    pub fn restore(self) -> Result<Session, SessionError> {
        self.validate()?;
        Ok(Session::from_parts(SessionParts {
            name: self.name,
            seed: self.seed,
            locations: self.locations,
            discovery: self.discovery,
            spread: self.spread,
            crisis_rate: self.crisis_rate,
            overloads: self.overloads,
            turns: self.turns,
            started: self.started,
        }))
    }

    pub fn to_json(session: &Session) -> serde_json::Result<String> {
        let snapshot = Self::capture(session);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn save(session: &Session, path: &Path) -> Result<(), SnapshotError> {
        let json = Self::to_json(session)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
        }
        fs::write(path, json).map_err(|source| io_error(path, source))
    }

    pub fn load(path: &Path) -> Result<Session, SnapshotError> {
        let json = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        Ok(Self::from_json(&json)?.restore()?)
    }

    fn validate(&self) -> Result<(), SessionError> {
        self.locations.validate()?;
        if self.crisis_rate == 0 {
            return Err(invalid("crisis rate must be at least 1"));
        }
        if let Some(name) = self.discovery.first_duplicate() {
            return Err(invalid(format!("discovery card {name} appears more than once")));
        }
        if !self.spread.is_consistent() {
            return Err(invalid("spread deck layers do not cover its cards"));
        }
        if let Some(unknown) = self
            .spread
            .undrawn()
            .iter()
            .chain(self.spread.drawn())
            .find(|name| !self.locations.contains(name))
        {
            return Err(invalid(format!("spread deck names unknown location {unknown}")));
        }
        self.turns.validate().map_err(invalid)?;
        if self.started && !self.turns.is_active() {
            return Err(invalid("a started game needs at least two players"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SessionError {
    SessionError::Configuration(message.into())
}

fn io_error(path: &Path, source: io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}
