//! Player domain model.
//!
//! # Responsibility
//! - Define the prospect record shown on the board.
//! - Separate engine-owned fields (`rank`, `note`) from descriptive ones.
//!
//! # Invariants
//! - `id` is stable and distinct from the external profile id.
//! - `profile` is never mutated by the board engine.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable board identity of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive prospect attributes owned by the board-population endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// External player id used for profile navigation.
    pub external_id: Option<i64>,
    pub name: String,
    /// Football position label, e.g. `WR` or `QB`.
    pub football_position: Option<String>,
    pub team: Option<String>,
    pub college: Option<String>,
    pub height_inches: Option<u16>,
    pub weight_lbs: Option<u16>,
}

impl PlayerProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Ranked prospect on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// 1-based ordinal among players only.
    pub rank: u32,
    /// Private note text. `None` means no note exists.
    pub note: Option<String>,
    pub profile: PlayerProfile,
}

impl Player {
    /// Creates a player without a note.
    pub fn new(id: PlayerId, rank: u32, profile: PlayerProfile) -> Self {
        Self {
            id,
            rank,
            note: None,
            profile,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn has_note(&self) -> bool {
        self.note.is_some()
    }
}
