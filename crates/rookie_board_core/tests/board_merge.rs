use rookie_board_core::{
    derive_positions, group_by_tier, merge_board, plan_reorder, tier_membership, BoardItem,
    ItemKey, Player, PlayerId, PlayerProfile, Tier, TierId,
};
use std::collections::HashMap;

fn players(count: u32) -> Vec<Player> {
    (1..=count)
        .map(|rank| Player::new(PlayerId(i64::from(rank)), rank, PlayerProfile::default()))
        .collect()
}

fn tiers(positions: &[u32]) -> Vec<Tier> {
    positions
        .iter()
        .enumerate()
        .map(|(index, position)| Tier::new(TierId::generate(), format!("Tier {index}"), *position))
        .collect()
}

fn keys(items: &[BoardItem]) -> Vec<ItemKey> {
    items.iter().map(BoardItem::key).collect()
}

/// Rebuilds players and tiers from a full assignment, keeping tier
/// tie-break order from the assignment order.
fn apply(items: &[BoardItem], plan: &[rookie_board_core::PositionAssignment]) -> Vec<BoardItem> {
    let positions: HashMap<ItemKey, u32> = plan
        .iter()
        .map(|assignment| (assignment.key, assignment.position))
        .collect();
    let mut next_players = Vec::new();
    let mut next_tiers = Vec::new();
    for key in plan.iter().map(|assignment| assignment.key) {
        let item = items.iter().find(|item| item.key() == key).unwrap();
        match item.clone() {
            BoardItem::Player(mut player) => {
                player.rank = positions[&key];
                next_players.push(player);
            }
            BoardItem::Tier(mut tier) => {
                tier.position = positions[&key];
                next_tiers.push(tier);
            }
        }
    }
    merge_board(&next_players, &next_tiers)
}

/// Tier layouts covering empty boards, leading, trailing and stacked tiers.
fn configurations() -> Vec<(u32, Vec<u32>)> {
    let mut configs = Vec::new();
    for count in 0..=4 {
        let max = count + 1;
        configs.push((count, vec![]));
        for first in 1..=max {
            configs.push((count, vec![first]));
            for second in first..=max {
                configs.push((count, vec![first, second]));
            }
        }
    }
    configs
}

#[test]
fn tier_is_emitted_before_player_at_its_position() {
    let players = players(3);
    let tiers = tiers(&[2]);
    let items = merge_board(&players, &tiers);
    assert_eq!(
        keys(&items),
        vec![
            ItemKey::Player(PlayerId(1)),
            ItemKey::Tier(tiers[0].id),
            ItemKey::Player(PlayerId(2)),
            ItemKey::Player(PlayerId(3)),
        ]
    );
}

#[test]
fn tiers_past_the_last_rank_trail_the_board() {
    let tiers = tiers(&[9, 4]);
    let items = merge_board(&players(2), &tiers);
    assert_eq!(items[2].key(), ItemKey::Tier(tiers[1].id));
    assert_eq!(items[3].key(), ItemKey::Tier(tiers[0].id));
}

#[test]
fn merge_is_a_total_order_and_idempotent() {
    for (count, positions) in configurations() {
        let players = players(count);
        let tiers = tiers(&positions);
        let first = merge_board(&players, &tiers);
        let second = merge_board(&players, &tiers);
        assert_eq!(first, second);
        assert_eq!(first.len(), players.len() + tiers.len());

        let mut seen = keys(&first);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), first.len());
    }
}

#[test]
fn derived_positions_reproduce_the_sequence() {
    for (count, positions) in configurations() {
        let items = merge_board(&players(count), &tiers(&positions));
        let assignments = derive_positions(&items);
        assert_eq!(keys(&apply(&items, &assignments)), keys(&items));
    }
}

#[test]
fn every_drop_yields_dense_ranks_and_a_stable_merge() {
    for (count, positions) in configurations() {
        let items = merge_board(&players(count), &tiers(&positions));
        for from in 0..items.len() {
            for to in 0..items.len() {
                let Some(plan) = plan_reorder(&items, from, to) else {
                    assert!(from == to || items.len() < 2);
                    continue;
                };
                let ranks: Vec<u32> = plan
                    .items
                    .iter()
                    .filter_map(BoardItem::as_player)
                    .map(|player| player.rank)
                    .collect();
                assert_eq!(ranks, (1..=count).collect::<Vec<_>>());
                assert_eq!(apply(&items, &plan.assignments), plan.items);
                assert_eq!(plan.items[to].key(), items[from].key());
            }
        }
    }
}

#[test]
fn deleting_a_tier_regroups_players_under_the_previous_tier() {
    let players = players(4);
    let tiers = tiers(&[1, 3]);
    let remaining = vec![tiers[0].clone()];

    let before = tier_membership(&merge_board(&players, &tiers));
    assert_eq!(before[&PlayerId(3)], Some(tiers[1].id));

    let after = tier_membership(&merge_board(&players, &remaining));
    assert!(after.values().all(|tier| *tier == Some(tiers[0].id)));

    let groups = group_by_tier(&merge_board(&players, &remaining));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].players.len(), 4);
}

#[test]
fn players_ahead_of_every_tier_form_a_leading_group() {
    let tiers = tiers(&[3, 3]);
    let groups = group_by_tier(&merge_board(&players(3), &tiers));
    assert_eq!(groups.len(), 3);
    assert!(groups[0].tier.is_none());
    assert_eq!(groups[0].players.len(), 2);
    assert!(groups[1].players.is_empty());
    assert_eq!(groups[2].players.len(), 1);
}
