//! Ordered board model: merge-insert of players and tiers.
//!
//! # Responsibility
//! - Merge players (by rank) and tiers (by position) into one flat sequence.
//! - Derive implicit tier membership and render groups from that sequence.
//!
//! # Invariants
//! - Every player and every tier appears exactly once in the output.
//! - A tier whose position equals a player's rank is emitted before it.
//! - Tiers at the same position keep their input order (stable sort).

use crate::model::item::{BoardItem, ItemKey};
use crate::model::player::{Player, PlayerId};
use crate::model::tier::{Tier, TierId};
use std::collections::BTreeMap;

/// Merges players and tiers into the render-ready board sequence.
///
/// `players` are expected in ascending rank order; they are stably re-sorted
/// so out-of-order input still yields a valid sequence. `tiers` may arrive in
/// any order.
pub fn merge_board(players: &[Player], tiers: &[Tier]) -> Vec<BoardItem> {
    let mut ordered_players: Vec<&Player> = players.iter().collect();
    ordered_players.sort_by_key(|player| player.rank);

    let mut pending_tiers = sort_tiers(tiers).into_iter().peekable();
    let mut items = Vec::with_capacity(players.len() + tiers.len());

    for player in ordered_players {
        while let Some(tier) = pending_tiers.next_if(|tier| tier.position <= player.rank) {
            items.push(BoardItem::Tier(tier.clone()));
        }
        items.push(BoardItem::Player(player.clone()));
    }
    items.extend(pending_tiers.map(|tier| BoardItem::Tier(tier.clone())));
    items
}

/// Returns tiers in ascending position, ties in input order.
pub fn sort_tiers(tiers: &[Tier]) -> Vec<&Tier> {
    let mut ordered: Vec<&Tier> = tiers.iter().collect();
    ordered.sort_by_key(|tier| tier.position);
    ordered
}

/// Maps each player to the tier that precedes it in the merged sequence.
///
/// Players ahead of the first tier map to `None`.
pub fn tier_membership(items: &[BoardItem]) -> BTreeMap<PlayerId, Option<TierId>> {
    let mut membership = BTreeMap::new();
    let mut current = None;
    for item in items {
        match item {
            BoardItem::Tier(tier) => current = Some(tier.id),
            BoardItem::Player(player) => {
                membership.insert(player.id, current);
            }
        }
    }
    membership
}

/// Players rendered under one tier header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierGroup {
    /// `None` for players ranked ahead of every tier.
    pub tier: Option<Tier>,
    pub players: Vec<Player>,
}

/// Splits a merged sequence into render groups.
///
/// The leading ungrouped section is only emitted when it holds players;
/// every tier gets a group, even an empty one.
pub fn group_by_tier(items: &[BoardItem]) -> Vec<TierGroup> {
    let mut groups = Vec::new();
    let mut current = TierGroup {
        tier: None,
        players: Vec::new(),
    };
    for item in items {
        match item {
            BoardItem::Tier(tier) => {
                let finished = std::mem::replace(
                    &mut current,
                    TierGroup {
                        tier: Some(tier.clone()),
                        players: Vec::new(),
                    },
                );
                if finished.tier.is_some() || !finished.players.is_empty() {
                    groups.push(finished);
                }
            }
            BoardItem::Player(player) => current.players.push(player.clone()),
        }
    }
    if current.tier.is_some() || !current.players.is_empty() {
        groups.push(current);
    }
    groups
}

pub fn index_of(items: &[BoardItem], key: ItemKey) -> Option<usize> {
    items.iter().position(|item| item.key() == key)
}
