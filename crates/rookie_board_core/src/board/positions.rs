//! Position derivation for reordered board sequences.
//!
//! # Responsibility
//! - Move one item inside a merged sequence.
//! - Re-derive every rank and tier position from the whole new sequence.
//!
//! # Invariants
//! - Player ranks are dense and 1-based in sequence order.
//! - A tier takes the rank of the nearest following player, or
//!   `max_rank + 1` when no player follows it.
//! - Re-merging the derived values reproduces the sequence exactly.

use crate::model::item::{BoardItem, ItemKey};
use serde::{Deserialize, Serialize};

/// New ordinal for one item: rank for players, position for tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
    pub key: ItemKey,
    pub position: u32,
}

/// Full outcome of dropping one item at a new index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Dragged item.
    pub moved: ItemKey,
    /// New sequence with ranks and positions already renumbered.
    pub items: Vec<BoardItem>,
    /// One assignment per item, in new sequence order.
    pub assignments: Vec<PositionAssignment>,
    /// The moved key plus every key whose ordinal changed.
    pub changed: Vec<ItemKey>,
}

/// Derives ordinals for every item from sequence order.
pub fn derive_positions(items: &[BoardItem]) -> Vec<PositionAssignment> {
    let mut players_seen = 0u32;
    items
        .iter()
        .map(|item| {
            let position = match item {
                BoardItem::Player(_) => {
                    players_seen += 1;
                    players_seen
                }
                BoardItem::Tier(_) => players_seen + 1,
            };
            PositionAssignment {
                key: item.key(),
                position,
            }
        })
        .collect()
}

/// Returns the sequence with `from` moved to `to`.
///
/// `to` is the final index of the moved item and is clamped into range.
pub fn move_item(items: &[BoardItem], from: usize, to: usize) -> Vec<BoardItem> {
    let mut moved = items.to_vec();
    if from >= moved.len() {
        return moved;
    }
    let item = moved.remove(from);
    let target = to.min(moved.len());
    moved.insert(target, item);
    moved
}

/// Plans a drop of `items[from]` at index `to`.
///
/// Returns `None` when the key order is unchanged, so dropping an item back
/// where it started never touches ranks or positions.
pub fn plan_reorder(items: &[BoardItem], from: usize, to: usize) -> Option<ReorderPlan> {
    let moved_key = items.get(from)?.key();
    let reordered = move_item(items, from, to);
    let unchanged = reordered
        .iter()
        .zip(items)
        .all(|(next, previous)| next.key() == previous.key());
    if unchanged {
        return None;
    }

    let assignments = derive_positions(&reordered);
    let mut changed = vec![moved_key];
    let renumbered = reordered
        .into_iter()
        .zip(&assignments)
        .map(|(item, assignment)| {
            if item.ordinal() != assignment.position && assignment.key != moved_key {
                changed.push(assignment.key);
            }
            with_ordinal(item, assignment.position)
        })
        .collect();

    Some(ReorderPlan {
        moved: moved_key,
        items: renumbered,
        assignments,
        changed,
    })
}

fn with_ordinal(item: BoardItem, position: u32) -> BoardItem {
    match item {
        BoardItem::Player(mut player) => {
            player.rank = position;
            BoardItem::Player(player)
        }
        BoardItem::Tier(mut tier) => {
            tier.position = position;
            BoardItem::Tier(tier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_positions, move_item, plan_reorder};
    use crate::board::merge::merge_board;
    use crate::model::item::{BoardItem, ItemKey};
    use crate::model::player::{Player, PlayerId, PlayerProfile};
    use crate::model::tier::{Tier, TierId};

    fn board() -> (Vec<Player>, Tier) {
        let players = (1..=4)
            .map(|rank| Player::new(PlayerId(rank as i64 * 10), rank, PlayerProfile::default()))
            .collect();
        (players, Tier::new(TierId::generate(), "Tier 2", 3))
    }

    fn split(items: &[BoardItem]) -> (Vec<Player>, Vec<Tier>) {
        let players = items.iter().filter_map(|i| i.as_player().cloned()).collect();
        let tiers = items.iter().filter_map(|i| i.as_tier().cloned()).collect();
        (players, tiers)
    }

    #[test]
    fn trailing_tier_sits_past_last_rank() {
        let (players, tier) = board();
        let items = merge_board(&players, &[]);
        let mut with_tail = items.clone();
        with_tail.push(BoardItem::Tier(tier));
        let positions = derive_positions(&with_tail);
        assert_eq!(positions.last().unwrap().position, 5);
    }

    #[test]
    fn move_item_clamps_target() {
        let (players, _) = board();
        let items = merge_board(&players, &[]);
        let moved = move_item(&items, 0, 99);
        assert_eq!(moved.last().unwrap().key(), ItemKey::Player(PlayerId(10)));
    }

    #[test]
    fn dropping_in_place_is_not_a_reorder() {
        let (players, tier) = board();
        let items = merge_board(&players, &[tier]);
        for index in 0..items.len() {
            assert!(plan_reorder(&items, index, index).is_none());
        }
    }

    #[test]
    fn moving_tier_up_regroups_players_and_round_trips_through_merge() {
        let (players, tier) = board();
        let items = merge_board(&players, &[tier.clone()]);
        // [p1, p2, T, p3, p4] -> [T, p1, p2, p3, p4]
        let plan = plan_reorder(&items, 2, 0).unwrap();
        assert_eq!(plan.items[0].key(), ItemKey::Tier(tier.id));
        assert_eq!(plan.items[0].ordinal(), 1);
        assert_eq!(plan.changed, vec![ItemKey::Tier(tier.id)]);

        let (players, tiers) = split(&plan.items);
        assert_eq!(merge_board(&players, &tiers), plan.items);
    }

    #[test]
    fn moving_player_renumbers_every_shifted_rank() {
        let (players, tier) = board();
        let items = merge_board(&players, &[tier]);
        // drag p4 (index 4) to the top
        let plan = plan_reorder(&items, 4, 0).unwrap();
        let ranks: Vec<u32> = plan
            .items
            .iter()
            .filter_map(|item| item.as_player().map(|p| p.rank))
            .collect();
        assert_eq!(ranks, [1, 2, 3, 4]);
        assert_eq!(plan.moved, ItemKey::Player(PlayerId(40)));
        assert!(plan.changed.contains(&ItemKey::Player(PlayerId(10))));
        assert_eq!(plan.assignments.len(), plan.items.len());
    }
}
