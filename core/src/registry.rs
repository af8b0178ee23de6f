//! Objective registry.
//!
//! Holds the regular objectives in scene order plus the single terminal
//! objective. Iteration order is fixed at construction, which makes the
//! nearest-objective tie-break reproducible.

use std::collections::HashSet;

use thiserror::Error;

use beacon_types::{Objective, ObjectiveId, Vec3};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("objective registry is empty")]
    Empty,
    #[error("objective registry has no terminal objective")]
    NoTerminal,
    #[error("objective registry has {0} terminal objectives, expected exactly one")]
    MultipleTerminals(usize),
    #[error("duplicate {0}")]
    DuplicateId(ObjectiveId),
    #[error("unknown {0}")]
    Unknown(ObjectiveId),
    #[error("{0} is the terminal objective and has not been revealed yet")]
    TerminalHidden(ObjectiveId),
}

/// Result of resolving an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// First resolution of this objective.
    Resolved { terminal: bool },
    /// The objective was already resolved; nothing changed.
    AlreadyResolved,
    /// The session is not accepting resolutions (not in `Game`).
    Ignored,
}

/// The closest unresolved objective to some point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub id: ObjectiveId,
    pub position: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct ObjectiveRegistry {
    objectives: Vec<Objective>,
    terminal: Objective,
    terminal_revealed: bool,
}

impl ObjectiveRegistry {
    /// Build a registry from scene objectives.
    ///
    /// Exactly one objective must be terminal and ids must be unique. The
    /// terminal objective starts hidden.
    pub fn new(objectives: Vec<Objective>) -> Result<Self, RegistryError> {
        if objectives.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::with_capacity(objectives.len());
        for objective in &objectives {
            if !seen.insert(objective.id()) {
                return Err(RegistryError::DuplicateId(objective.id()));
            }
        }

        let (mut terminals, regular): (Vec<Objective>, Vec<Objective>) =
            objectives.into_iter().partition(Objective::is_terminal);
        let terminal = match terminals.len() {
            0 => return Err(RegistryError::NoTerminal),
            1 => terminals.remove(0),
            n => return Err(RegistryError::MultipleTerminals(n)),
        };

        Ok(Self {
            objectives: regular,
            terminal,
            terminal_revealed: false,
        })
    }

    fn find(&self, id: ObjectiveId) -> Option<&Objective> {
        if self.terminal.id() == id {
            return Some(&self.terminal);
        }
        self.objectives.iter().find(|o| o.id() == id)
    }

    pub fn position(&self, id: ObjectiveId) -> Result<Vec3, RegistryError> {
        self.find(id)
            .map(Objective::position)
            .ok_or(RegistryError::Unknown(id))
    }

    pub fn is_resolved(&self, id: ObjectiveId) -> Result<bool, RegistryError> {
        self.find(id)
            .map(Objective::is_resolved)
            .ok_or(RegistryError::Unknown(id))
    }

    /// Resolve an objective. Idempotent; a hidden terminal objective cannot be resolved.
    pub fn mark_resolved(&mut self, id: ObjectiveId) -> Result<Resolution, RegistryError> {
        let objective = if self.terminal.id() == id {
            if !self.terminal_revealed {
                return Err(RegistryError::TerminalHidden(id));
            }
            &mut self.terminal
        } else {
            self.objectives
                .iter_mut()
                .find(|o| o.id() == id)
                .ok_or(RegistryError::Unknown(id))?
        };

        if objective.resolve() {
            Ok(Resolution::Resolved {
                terminal: objective.is_terminal(),
            })
        } else {
            Ok(Resolution::AlreadyResolved)
        }
    }

    /// Closest unresolved regular objective to `from`.
    ///
    /// Strict less-than comparison: on equal distances the objective that
    /// comes first in scene order wins.
    #[must_use]
    pub fn nearest_unresolved(&self, from: Vec3) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for objective in self.objectives.iter().filter(|o| !o.is_resolved()) {
            let distance = from.distance(objective.position());
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Nearest {
                    id: objective.id(),
                    position: objective.position(),
                    distance,
                });
            }
        }
        best
    }

    #[must_use]
    pub fn terminal(&self) -> &Objective {
        &self.terminal
    }

    #[must_use]
    pub fn is_terminal_revealed(&self) -> bool {
        self.terminal_revealed
    }

    /// Reveal the terminal objective. Returns `true` only on the first call.
    pub fn reveal_terminal(&mut self) -> bool {
        let newly = !self.terminal_revealed;
        self.terminal_revealed = true;
        newly
    }

    /// Regular objectives in scene order.
    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.objectives.iter()
    }

    /// Unresolved objectives, terminal included.
    #[must_use]
    pub fn remaining(&self) -> usize {
        let regular = self.objectives.iter().filter(|o| !o.is_resolved()).count();
        regular + usize::from(!self.terminal.is_resolved())
    }
}
