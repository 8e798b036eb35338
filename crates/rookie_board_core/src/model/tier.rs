//! Tier domain model.
//!
//! A tier is a named divider. Its `position` lives in the player rank space
//! and only decides where the divider is merged; it never counts players.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque stable tier identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierId(Uuid);

impl TierId {
    /// Generates a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses the canonical hyphenated form.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Display for TierId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named group divider interleaved with players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub name: String,
    /// Merge placement in player rank space.
    pub position: u32,
}

impl Tier {
    pub fn new(id: TierId, name: impl Into<String>, position: u32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
        }
    }
}
