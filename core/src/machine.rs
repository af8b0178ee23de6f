//! Session state machine.
//!
//! ```text
//! Menu --StartGame--> Game --EndGame--> End --ReturnToMenu--> Menu
//!                      |
//!                      +----CancelGame----> Menu
//! ```

use thiserror::Error;

use beacon_types::{SessionSettings, SessionState};

/// A legal edge of the session graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    StartGame,
    CancelGame,
    EndGame,
    ReturnToMenu,
}

impl Transition {
    #[must_use]
    pub fn between(from: SessionState, to: SessionState) -> Option<Self> {
        match (from, to) {
            (SessionState::Menu, SessionState::Game) => Some(Self::StartGame),
            (SessionState::Game, SessionState::Menu) => Some(Self::CancelGame),
            (SessionState::Game, SessionState::End) => Some(Self::EndGame),
            (SessionState::End, SessionState::Menu) => Some(Self::ReturnToMenu),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid session transition {from} -> {to}")]
pub struct TransitionError {
    pub from: SessionState,
    pub to: SessionState,
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    cursor_visible_in_game: bool,
}

impl SessionMachine {
    #[must_use]
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            state: SessionState::Menu,
            cursor_visible_in_game: settings.cursor_visible_in_game,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Pointer visibility for the current state. Always visible outside `Game`.
    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.state != SessionState::Game || self.cursor_visible_in_game
    }

    pub fn check(&self, to: SessionState) -> Result<Transition, TransitionError> {
        Transition::between(self.state, to).ok_or(TransitionError {
            from: self.state,
            to,
        })
    }

    /// Move to `to`. On error the state is unchanged.
    pub fn request(&mut self, to: SessionState) -> Result<Transition, TransitionError> {
        let transition = self.check(to)?;
        self.state = to;
        Ok(transition)
    }
}
