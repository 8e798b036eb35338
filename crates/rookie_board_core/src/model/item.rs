//! Tagged board items and their composite identity.
//!
//! # Invariants
//! - A player key and a tier key never compare equal, even when the raw ids
//!   would collide numerically.
//! - `ItemKey` ordering is players first, then tiers; only used for
//!   deterministic set iteration.

use crate::model::player::{Player, PlayerId};
use crate::model::tier::{Tier, TierId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Composite identity of one board item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemKey {
    Player(PlayerId),
    Tier(TierId),
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(id) => write!(f, "player:{id}"),
            Self::Tier(id) => write!(f, "tier:{id}"),
        }
    }
}

impl From<PlayerId> for ItemKey {
    fn from(value: PlayerId) -> Self {
        Self::Player(value)
    }
}

impl From<TierId> for ItemKey {
    fn from(value: TierId) -> Self {
        Self::Tier(value)
    }
}

/// One render-ready entry of the merged board sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum BoardItem {
    Player(Player),
    Tier(Tier),
}

impl BoardItem {
    pub fn key(&self) -> ItemKey {
        match self {
            Self::Player(player) => ItemKey::Player(player.id),
            Self::Tier(tier) => ItemKey::Tier(tier.id),
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Self::Player(player) => Some(player),
            Self::Tier(_) => None,
        }
    }

    pub fn as_tier(&self) -> Option<&Tier> {
        match self {
            Self::Tier(tier) => Some(tier),
            Self::Player(_) => None,
        }
    }

    /// Rank for players, position for tiers.
    pub fn ordinal(&self) -> u32 {
        match self {
            Self::Player(player) => player.rank,
            Self::Tier(tier) => tier.position,
        }
    }
}
