use crate::model::affliction::Affliction;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const MAX_SEVERITY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    name: String,
    affliction: Affliction,
    original_affliction: Affliction,
    severity: u8,
    quarantined: bool,
    neighbors: Vec<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, affliction: Affliction, neighbors: Vec<String>) -> Self {
        Self {
            name: name.into(),
            affliction,
            original_affliction: affliction,
            severity: 0,
            quarantined: false,
            neighbors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn affliction(&self) -> Affliction {
        self.affliction
    }

    pub fn original_affliction(&self) -> Affliction {
        self.original_affliction
    }

    pub fn severity(&self) -> u8 {
        self.severity
    }

    pub fn is_at_cap(&self) -> bool {
        self.severity >= MAX_SEVERITY
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantined
    }

    pub fn neighbors(&self) -> &[String] {
        &self.neighbors
    }

    pub fn override_affliction(&mut self, affliction: Affliction) {
        self.affliction = affliction;
    }

    /// Adds one level of severity. Returns `true` when the location was
    /// already at cap, i.e. the increment overloads instead of stacking.
    pub fn infect(&mut self) -> bool {
        if self.is_at_cap() {
            return true;
        }
        self.severity += 1;
        false
    }

    /// Crisis effect: jump straight to cap. Overloads if the location already
    /// carried any severity.
    pub fn crisis(&mut self) -> bool {
        let overloads = self.severity > 0;
        self.severity = MAX_SEVERITY;
        overloads
    }

    /// Callers validate `level <= MAX_SEVERITY`; anything above is clamped.
    pub fn set_severity(&mut self, level: u8) {
        self.severity = level.min(MAX_SEVERITY);
    }

    /// Returns how many levels were actually removed.
    pub fn treat(&mut self, levels: u8) -> u8 {
        let removed = levels.min(self.severity);
        self.severity -= removed;
        removed
    }

    pub fn quarantine(&mut self) -> bool {
        !std::mem::replace(&mut self.quarantined, true)
    }

    pub fn lift_quarantine(&mut self) -> bool {
        std::mem::replace(&mut self.quarantined, false)
    }
}

/// The board: every location keyed by unique name, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationGraph {
    locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("{0} is defined more than once")]
    DuplicateLocation(String),
    #[error("{location} lists unknown neighbor {neighbor}")]
    MissingNeighbor { location: String, neighbor: String },
    #[error("{0} lists itself as a neighbor")]
    SelfNeighbor(String),
}

impl LocationGraph {
    pub fn new(locations: Vec<Location>) -> Result<Self, GraphError> {
        let graph = Self { locations };
        graph.validate()?;
        Ok(graph)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        let mut names = HashSet::with_capacity(self.locations.len());
        for location in &self.locations {
            if !names.insert(location.name.as_str()) {
                return Err(GraphError::DuplicateLocation(location.name.clone()));
            }
        }

        for location in &self.locations {
            for neighbor in &location.neighbors {
                if neighbor == &location.name {
                    return Err(GraphError::SelfNeighbor(location.name.clone()));
                }
                if !names.contains(neighbor.as_str()) {
                    return Err(GraphError::MissingNeighbor {
                        location: location.name.clone(),
                        neighbor: neighbor.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Location> {
        self.locations.iter_mut().find(|location| location.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(Location::name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphError, Location, LocationGraph, MAX_SEVERITY};
    use crate::model::affliction::Affliction;

    fn loc(name: &str, neighbors: &[&str]) -> Location {
        Location::new(
            name,
            Affliction::Blue,
            neighbors.iter().map(|n| n.to_string()).collect(),
        )
    }

    #[test]
    fn infect_stacks_until_cap_then_overloads() {
        let mut location = loc("a", &[]);
        assert!(!location.infect());
        assert!(!location.infect());
        assert!(!location.infect());
        assert_eq!(location.severity(), MAX_SEVERITY);
        assert!(location.infect());
        assert_eq!(location.severity(), MAX_SEVERITY);
    }

    #[test]
    fn crisis_overloads_only_when_already_afflicted() {
        let mut clean = loc("a", &[]);
        assert!(!clean.crisis());
        assert_eq!(clean.severity(), MAX_SEVERITY);

        let mut touched = loc("b", &[]);
        touched.infect();
        assert!(touched.crisis());
    }

    #[test]
    fn treat_saturates_at_zero() {
        let mut location = loc("a", &[]);
        location.set_severity(2);
        assert_eq!(location.treat(5), 2);
        assert_eq!(location.severity(), 0);
    }

    #[test]
    fn quarantine_toggles_report_change() {
        let mut location = loc("a", &[]);
        assert!(location.quarantine());
        assert!(!location.quarantine());
        assert!(location.lift_quarantine());
        assert!(!location.lift_quarantine());
    }

    #[test]
    fn override_keeps_original_affliction() {
        let mut location = loc("a", &[]);
        location.override_affliction(Affliction::Faded);
        assert_eq!(location.affliction(), Affliction::Faded);
        assert_eq!(location.original_affliction(), Affliction::Blue);
    }

    #[test]
    fn graph_rejects_missing_neighbor() {
        let err = LocationGraph::new(vec![loc("a", &["b"])]).unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingNeighbor {
                location: "a".into(),
                neighbor: "b".into()
            }
        );
    }

    #[test]
    fn graph_rejects_duplicates_and_self_edges() {
        assert!(matches!(
            LocationGraph::new(vec![loc("a", &[]), loc("a", &[])]),
            Err(GraphError::DuplicateLocation(_))
        ));
        assert!(matches!(
            LocationGraph::new(vec![loc("a", &["a"])]),
            Err(GraphError::SelfNeighbor(_))
        ));
    }
}
