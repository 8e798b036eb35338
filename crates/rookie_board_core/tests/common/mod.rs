#![allow(dead_code)]

use async_trait::async_trait;
use rookie_board_core::{
    BoardData, GatewayError, GatewayResult, ItemKey, Notice, Notifier, PersistenceGateway, Player,
    PlayerId, PlayerProfile, PositionAssignment, Tier, TierId,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Builds a board with dense players `1..=players` and the given tiers.
pub fn board(players: u32, tiers: &[(&str, u32)]) -> BoardData {
    BoardData {
        players: (1..=players)
            .map(|rank| {
                Player::new(
                    PlayerId(i64::from(rank)),
                    rank,
                    PlayerProfile::named(format!("Prospect {rank}")),
                )
            })
            .collect(),
        tiers: tiers
            .iter()
            .map(|(name, position)| Tier::new(TierId::generate(), *name, *position))
            .collect(),
    }
}

pub fn tier_id(data: &BoardData, name: &str) -> TierId {
    data.tiers
        .iter()
        .find(|tier| tier.name == name)
        .map(|tier| tier.id)
        .unwrap()
}

/// In-memory gateway with call recording, injected failures, a delay and an
/// optional gate that holds mutations until released.
pub struct ScriptedGateway {
    data: Mutex<BoardData>,
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    delay: Mutex<Option<Duration>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    pub fn new(data: BoardData) -> Self {
        Self {
            data: Mutex::new(data),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            gate: None,
        }
    }

    /// Mutations wait for `gate.notify_one()` before resolving.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than `fetch_board`.
    pub fn mutation_calls(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call != "fetch_board")
            .count()
    }

    pub fn data(&self) -> BoardData {
        self.data.lock().unwrap().clone()
    }

    pub fn set_data(&self, data: BoardData) {
        *self.data.lock().unwrap() = data;
    }

    async fn step(&self, op: &'static str) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(op);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if op != "fetch_board" {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(GatewayError::Rejected(format!("{op} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for ScriptedGateway {
    async fn fetch_board(&self) -> GatewayResult<BoardData> {
        self.step("fetch_board").await?;
        Ok(self.data())
    }

    async fn reorder(&self, assignments: &[PositionAssignment]) -> GatewayResult<()> {
        self.step("reorder").await?;
        let mut data = self.data.lock().unwrap();
        let mut tier_order = Vec::new();
        for assignment in assignments {
            match assignment.key {
                ItemKey::Player(id) => {
                    let player = data.players.iter_mut().find(|player| player.id == id);
                    player.ok_or(GatewayError::NotFound(assignment.key))?.rank =
                        assignment.position;
                }
                ItemKey::Tier(id) => {
                    let tier = data.tiers.iter_mut().find(|tier| tier.id == id);
                    tier.ok_or(GatewayError::NotFound(assignment.key))?.position =
                        assignment.position;
                    tier_order.push(id);
                }
            }
        }
        data.players.sort_by_key(|player| player.rank);
        data.tiers.sort_by_key(|tier| {
            let slot = tier_order.iter().position(|id| *id == tier.id);
            (tier.position, slot.unwrap_or(usize::MAX))
        });
        Ok(())
    }

    async fn create_tier(&self, name: &str, position: u32) -> GatewayResult<Tier> {
        self.step("create_tier").await?;
        let tier = Tier::new(TierId::generate(), name, position);
        let mut data = self.data.lock().unwrap();
        let index = data
            .tiers
            .partition_point(|existing| existing.position <= position);
        data.tiers.insert(index, tier.clone());
        Ok(tier)
    }

    async fn rename_tier(&self, tier_id: TierId, name: &str) -> GatewayResult<()> {
        self.step("rename_tier").await?;
        let mut data = self.data.lock().unwrap();
        let tier = data.tiers.iter_mut().find(|tier| tier.id == tier_id);
        tier.ok_or(GatewayError::NotFound(ItemKey::Tier(tier_id)))?.name = name.to_string();
        Ok(())
    }

    async fn delete_tier(&self, tier_id: TierId) -> GatewayResult<()> {
        self.step("delete_tier").await?;
        self.data
            .lock()
            .unwrap()
            .tiers
            .retain(|tier| tier.id != tier_id);
        Ok(())
    }

    async fn save_note(&self, player_id: PlayerId, content: &str) -> GatewayResult<()> {
        self.step("save_note").await?;
        let mut data = self.data.lock().unwrap();
        let player = data.players.iter_mut().find(|player| player.id == player_id);
        player
            .ok_or(GatewayError::NotFound(ItemKey::Player(player_id)))?
            .note = Some(content.to_string());
        Ok(())
    }

    async fn delete_note(&self, player_id: PlayerId) -> GatewayResult<()> {
        self.step("delete_note").await?;
        let mut data = self.data.lock().unwrap();
        let player = data.players.iter_mut().find(|player| player.id == player_id);
        player
            .ok_or(GatewayError::NotFound(ItemKey::Player(player_id)))?
            .note = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
