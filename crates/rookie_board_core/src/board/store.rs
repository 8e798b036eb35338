//! Entity store for one board.
//!
//! # Responsibility
//! - Hold the authoritative player and tier lists plus note edit drafts.
//! - Own the save-state tracker so checks and optimistic writes happen under
//!   one lock.
//! - Expose immutable snapshots to the rendering layer.
//!
//! # Invariants
//! - `players` is sorted by rank and ranks are dense `1..=n`.
//! - `tiers` is sorted by position; equal positions keep tie-break order.
//! - Only services mutate the store, and only through `BoardHandle::write`.

use crate::board::merge::merge_board;
use crate::board::positions::PositionAssignment;
use crate::board::save_state::SaveStateTracker;
use crate::model::item::{BoardItem, ItemKey};
use crate::model::player::{Player, PlayerId};
use crate::model::tier::{Tier, TierId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Raw board contents as returned by the persistence gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    pub players: Vec<Player>,
    pub tiers: Vec<Tier>,
}

/// Board contents that violate the at-rest invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// Ranks are not exactly `1..=n`.
    RankGap { expected: u32, found: u32 },
    DuplicatePlayer(PlayerId),
    DuplicateTier(TierId),
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RankGap { expected, found } => {
                write!(f, "player ranks must be dense: expected {expected}, found {found}")
            }
            Self::DuplicatePlayer(id) => write!(f, "duplicate player id {id}"),
            Self::DuplicateTier(id) => write!(f, "duplicate tier id {id}"),
        }
    }
}

impl Error for IntegrityError {}

/// Open note editor state for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub content: String,
    /// Inline error from the last failed save or validation.
    pub error: Option<String>,
}

/// Ranks and positions captured before an optimistic reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    ranks: HashMap<PlayerId, u32>,
    /// Tier positions in tie-break order.
    tiers: Vec<(TierId, u32)>,
}

/// Immutable view handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Increments on every store mutation.
    pub revision: u64,
    pub items: Vec<BoardItem>,
    pub in_flight: BTreeSet<ItemKey>,
    pub note_drafts: BTreeMap<PlayerId, NoteDraft>,
}

impl BoardSnapshot {
    /// Whether rendering should dim the item and refuse gestures on it.
    pub fn is_saving(&self, key: ItemKey) -> bool {
        self.in_flight.contains(&key)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.items
            .iter()
            .filter_map(BoardItem::as_player)
            .find(|player| player.id == id)
    }

    pub fn tier(&self, id: TierId) -> Option<&Tier> {
        self.items
            .iter()
            .filter_map(BoardItem::as_tier)
            .find(|tier| tier.id == id)
    }
}

/// Authoritative client-side board state.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    players: Vec<Player>,
    tiers: Vec<Tier>,
    save_state: SaveStateTracker,
    note_drafts: BTreeMap<PlayerId, NoteDraft>,
    revision: u64,
}

impl BoardStore {
    /// Builds a store from fetched data, rejecting invalid boards.
    pub fn from_data(data: BoardData) -> Result<Self, IntegrityError> {
        let BoardData {
            mut players,
            mut tiers,
        } = data;
        players.sort_by_key(|player| player.rank);
        tiers.sort_by_key(|tier| tier.position);

        let mut seen_players = HashSet::new();
        for (index, player) in players.iter().enumerate() {
            if !seen_players.insert(player.id) {
                return Err(IntegrityError::DuplicatePlayer(player.id));
            }
            let expected = index as u32 + 1;
            if player.rank != expected {
                return Err(IntegrityError::RankGap {
                    expected,
                    found: player.rank,
                });
            }
        }

        let mut seen_tiers = HashSet::new();
        for tier in &tiers {
            if !seen_tiers.insert(tier.id) {
                return Err(IntegrityError::DuplicateTier(tier.id));
            }
        }

        Ok(Self {
            players,
            tiers,
            ..Self::default()
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn tier(&self, id: TierId) -> Option<&Tier> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        match key {
            ItemKey::Player(id) => self.player(id).is_some(),
            ItemKey::Tier(id) => self.tier(id).is_some(),
        }
    }

    pub fn max_rank(&self) -> u32 {
        self.players.last().map_or(0, |player| player.rank)
    }

    /// Merged render sequence.
    pub fn items(&self) -> Vec<BoardItem> {
        merge_board(&self.players, &self.tiers)
    }

    pub fn save_state(&self) -> &SaveStateTracker {
        &self.save_state
    }

    pub(crate) fn save_state_mut(&mut self) -> &mut SaveStateTracker {
        &mut self.save_state
    }

    pub fn note_draft(&self, id: PlayerId) -> Option<&NoteDraft> {
        self.note_drafts.get(&id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            revision: self.revision,
            items: self.items(),
            in_flight: self.save_state.keys().clone(),
            note_drafts: self.note_drafts.clone(),
        }
    }

    /// Replaces the board contents. Drafts for vanished players are dropped.
    pub(crate) fn replace_data(&mut self, fresh: BoardStore) {
        let drafts = std::mem::take(&mut self.note_drafts);
        self.players = fresh.players;
        self.tiers = fresh.tiers;
        self.note_drafts = drafts
            .into_iter()
            .filter(|(id, _)| self.players.iter().any(|player| player.id == *id))
            .collect();
        self.touch();
    }

    /// Sets a player's note and returns the previous value.
    pub(crate) fn set_note(&mut self, id: PlayerId, note: Option<String>) -> Option<Option<String>> {
        let player = self.players.iter_mut().find(|player| player.id == id)?;
        let previous = std::mem::replace(&mut player.note, note);
        self.touch();
        Some(previous)
    }

    /// Renames a tier and returns the previous name.
    pub(crate) fn rename_tier(&mut self, id: TierId, name: &str) -> Option<String> {
        let tier = self.tiers.iter_mut().find(|tier| tier.id == id)?;
        let previous = std::mem::replace(&mut tier.name, name.to_string());
        self.touch();
        Some(previous)
    }

    /// Inserts a tier after every tier at the same or a lower position.
    pub(crate) fn insert_tier(&mut self, tier: Tier) {
        let index = self
            .tiers
            .partition_point(|existing| existing.position <= tier.position);
        self.tiers.insert(index, tier);
        self.touch();
    }

    pub(crate) fn remove_tier(&mut self, id: TierId) -> Option<Tier> {
        let index = self.tiers.iter().position(|tier| tier.id == id)?;
        let removed = self.tiers.remove(index);
        self.touch();
        Some(removed)
    }

    /// Swaps a provisional tier for its confirmed counterpart.
    ///
    /// Keeps the tie-break slot when the position did not change.
    pub(crate) fn replace_tier(&mut self, provisional: TierId, confirmed: Tier) {
        match self.tiers.iter().position(|tier| tier.id == provisional) {
            Some(index) if self.tiers[index].position == confirmed.position => {
                self.tiers[index] = confirmed;
                self.touch();
            }
            Some(_) => {
                self.remove_tier(provisional);
                self.insert_tier(confirmed);
            }
            None => self.insert_tier(confirmed),
        }
    }

    /// Captures ranks and tier positions for rollback.
    pub(crate) fn capture_layout(&self) -> Layout {
        Layout {
            ranks: self
                .players
                .iter()
                .map(|player| (player.id, player.rank))
                .collect(),
            tiers: self
                .tiers
                .iter()
                .map(|tier| (tier.id, tier.position))
                .collect(),
        }
    }

    /// Restores a captured layout.
    ///
    /// Notes and names are untouched. Tiers created after the capture keep
    /// their position and sort after captured tiers at the same position.
    pub(crate) fn restore_layout(&mut self, layout: &Layout) {
        for player in &mut self.players {
            if let Some(rank) = layout.ranks.get(&player.id) {
                player.rank = *rank;
            }
        }
        self.players.sort_by_key(|player| player.rank);

        let slots: HashMap<TierId, (usize, u32)> = layout
            .tiers
            .iter()
            .enumerate()
            .map(|(slot, (id, position))| (*id, (slot, *position)))
            .collect();
        for tier in &mut self.tiers {
            if let Some((_, position)) = slots.get(&tier.id) {
                tier.position = *position;
            }
        }
        self.tiers.sort_by_key(|tier| {
            let slot = slots.get(&tier.id).map_or(usize::MAX, |(slot, _)| *slot);
            (tier.position, slot)
        });
        self.touch();
    }

    /// Applies a full reorder assignment.
    ///
    /// Tier tie-break order follows the assignment order.
    pub(crate) fn apply_assignments(&mut self, assignments: &[PositionAssignment]) {
        let mut tier_slots = HashMap::new();
        for (slot, assignment) in assignments.iter().enumerate() {
            match assignment.key {
                ItemKey::Player(id) => {
                    if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
                        player.rank = assignment.position;
                    }
                }
                ItemKey::Tier(id) => {
                    if let Some(tier) = self.tiers.iter_mut().find(|t| t.id == id) {
                        tier.position = assignment.position;
                    }
                    tier_slots.insert(id, slot);
                }
            }
        }
        self.players.sort_by_key(|player| player.rank);
        self.tiers.sort_by_key(|tier| {
            let slot = tier_slots.get(&tier.id).copied().unwrap_or(usize::MAX);
            (tier.position, slot)
        });
        self.touch();
    }

    pub(crate) fn open_draft(&mut self, id: PlayerId, content: String) {
        self.note_drafts.insert(
            id,
            NoteDraft {
                content,
                error: None,
            },
        );
        self.touch();
    }

    pub(crate) fn set_draft_error(&mut self, id: PlayerId, content: &str, error: String) {
        let draft = self.note_drafts.entry(id).or_insert_with(|| NoteDraft {
            content: content.to_string(),
            error: None,
        });
        draft.error = Some(error);
        self.touch();
    }

    pub(crate) fn close_draft(&mut self, id: PlayerId) -> Option<NoteDraft> {
        let closed = self.note_drafts.remove(&id);
        self.touch();
        closed
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

/// Shared single-writer handle over one `BoardStore`.
///
/// The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct BoardHandle {
    inner: Arc<Mutex<BoardStore>>,
}

impl BoardHandle {
    pub fn new(store: BoardStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs a read-only closure against the current store.
    pub fn read<T>(&self, f: impl FnOnce(&BoardStore) -> T) -> T {
        f(&self.lock())
    }

    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut BoardStore) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, BoardStore> {
        // Store mutations are infallible once started, so a poisoned lock
        // still guards a consistent board.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
