//! Overload cascades across the location graph.

use crate::game::error::SessionError;
use crate::model::location::LocationGraph;
use std::collections::HashSet;
use tracing::{debug, info};

/// What happened to a single location that was hit by a spread event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Quarantine absorbed the hit. `lifted` is set when no counter-agent was
    /// present and the quarantine came down as a result.
    Suppressed { lifted: bool },
    Raised { severity: u8 },
    Overloaded,
}

/// Summary of one propagation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Every location that overloaded, origin first, in visiting order.
    pub overloaded: Vec<String>,
    /// Length of the longest overload chain, origin included.
    pub depth: usize,
    pub quarantines_lifted: Vec<String>,
}

/// Applies one spread hit to `name`, honouring quarantine. Used both for the
/// origin of a spread event and for every neighbor reached by a cascade.
pub fn strike(
    graph: &mut LocationGraph,
    name: &str,
    shielded: impl Fn(&str) -> bool,
) -> Result<Hit, SessionError> {
    let location = graph.get_mut(name).ok_or_else(|| {
        SessionError::Configuration(format!("spread reached unknown location {name}"))
    })?;

    if location.is_quarantined() {
        let lifted = !shielded(name) && location.lift_quarantine();
        debug!(location = name, lifted, "quarantine absorbed spread");
        return Ok(Hit::Suppressed { lifted });
    }

    if location.infect() {
        Ok(Hit::Overloaded)
    } else {
        Ok(Hit::Raised {
            severity: location.severity(),
        })
    }
}

struct Frame {
    neighbors: Vec<String>,
    next: usize,
    depth: usize,
}

/// Cascades an overload that already happened at `origin` to its neighbors,
/// depth first. A location overloads at most once per call: once it is in the
/// visited set further hits on it are skipped. Walks an explicit stack rather
/// than recursing.
pub fn cascade(
    graph: &mut LocationGraph,
    origin: &str,
    shielded: impl Fn(&str) -> bool,
) -> Result<CascadeReport, SessionError> {
    let origin_neighbors = neighbors_of(graph, origin)?;
    let mut visited: HashSet<String> = HashSet::from([origin.to_string()]);
    let mut report = CascadeReport {
        overloaded: vec![origin.to_string()],
        depth: 1,
        quarantines_lifted: Vec::new(),
    };
    let mut stack = vec![Frame {
        neighbors: origin_neighbors,
        next: 0,
        depth: 1,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(neighbor) = frame.neighbors.get(frame.next).cloned() else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let depth = frame.depth + 1;

        if visited.contains(&neighbor) {
            continue;
        }

        match strike(graph, &neighbor, &shielded)? {
            Hit::Overloaded => {
                debug!(location = %neighbor, depth, "overload chained");
                visited.insert(neighbor.clone());
                report.overloaded.push(neighbor.clone());
                report.depth = report.depth.max(depth);
                stack.push(Frame {
                    neighbors: neighbors_of(graph, &neighbor)?,
                    next: 0,
                    depth,
                });
            }
            Hit::Suppressed { lifted: true } => report.quarantines_lifted.push(neighbor),
            Hit::Suppressed { lifted: false } | Hit::Raised { .. } => {}
        }
    }

    info!(
        origin,
        overloads = report.overloaded.len(),
        depth = report.depth,
        "overload cascade resolved"
    );
    Ok(report)
}

fn neighbors_of(graph: &LocationGraph, name: &str) -> Result<Vec<String>, SessionError> {
    graph
        .get(name)
        .map(|location| location.neighbors().to_vec())
        .ok_or_else(|| SessionError::Configuration(format!("unknown location {name} in cascade")))
}
