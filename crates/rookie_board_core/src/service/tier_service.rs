//! Tier lifecycle: create, rename, delete.
//!
//! # Invariants
//! - Blank names and out-of-range anchors are rejected before any gateway
//!   call.
//! - A new tier lands after every tier already at its anchor position.
//! - Deleting a tier removes only the marker; players keep ranks and notes.
//! - Tier deletes wait for a pending reorder; reorders wait for a pending
//!   tier create or delete. Renames block neither.

use crate::board::save_state::StructuralHold;
use crate::gateway::PersistenceGateway;
use crate::model::item::ItemKey;
use crate::model::tier::{Tier, TierId};
use crate::model::validation::{normalize_tier_name, validate_anchor};
use crate::service::error::{BoardError, MutationOp};
use crate::service::mutation::{InFlightGuard, MutationContext};
use log::info;
use std::sync::Arc;

/// Blocking confirmation prompt for destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierDeleteOutcome {
    Deleted,
    /// User declined; nothing changed and nothing was sent.
    Declined,
}

pub struct TierService<G: PersistenceGateway> {
    ctx: MutationContext,
    gateway: Arc<G>,
}

impl<G: PersistenceGateway> TierService<G> {
    pub fn new(ctx: MutationContext, gateway: Arc<G>) -> Self {
        Self { ctx, gateway }
    }

    /// Creates a tier anchored at `anchor_rank`.
    ///
    /// A provisional tier is shown while the call is in flight and is
    /// replaced by the stored record, or removed on failure.
    pub async fn create(&self, name: &str, anchor_rank: u32) -> Result<Tier, BoardError> {
        let name = normalize_tier_name(name)?;
        let provisional = Tier::new(TierId::generate(), name.clone(), anchor_rank);
        let key = ItemKey::Tier(provisional.id);

        self.ctx.board.write(|store| -> Result<(), BoardError> {
            validate_anchor(anchor_rank, store.max_rank())?;
            let tracker = store.save_state_mut();
            if !tracker.begin(key) {
                return Err(BoardError::Busy(key));
            }
            tracker.hold(StructuralHold::TierChange(provisional.id));
            store.insert_tier(provisional.clone());
            Ok(())
        })?;

        let _guard = InFlightGuard::new(&self.ctx.board, vec![key])
            .holding(StructuralHold::TierChange(provisional.id));
        let result = self
            .ctx
            .dispatch(
                MutationOp::CreateTier,
                Some(key),
                self.gateway.create_tier(&name, anchor_rank),
            )
            .await;

        match result {
            Ok(tier) => {
                self.ctx
                    .board
                    .write(|store| store.replace_tier(provisional.id, tier.clone()));
                info!(
                    "event=tier_create module=tier status=ok tier_id={} position={}",
                    tier.id, tier.position
                );
                Ok(tier)
            }
            Err(err) => {
                self.ctx.board.write(|store| store.remove_tier(provisional.id));
                self.ctx.report(MutationOp::CreateTier, Some(key));
                Err(err)
            }
        }
    }

    /// Renames a tier. Blank or unchanged names are a no-op returning
    /// `Ok(false)`.
    pub async fn rename(&self, tier_id: TierId, new_name: &str) -> Result<bool, BoardError> {
        let Ok(name) = normalize_tier_name(new_name) else {
            return Ok(false);
        };
        let key = ItemKey::Tier(tier_id);

        let previous = self.ctx.board.write(|store| -> Result<Option<String>, BoardError> {
            let tier = store.tier(tier_id).ok_or(BoardError::NotFound(key))?;
            if tier.name == name {
                return Ok(None);
            }
            if !store.save_state_mut().begin(key) {
                return Err(BoardError::Busy(key));
            }
            Ok(store.rename_tier(tier_id, &name))
        })?;
        let Some(previous) = previous else {
            return Ok(false);
        };

        let _guard = InFlightGuard::new(&self.ctx.board, vec![key]);
        let result = self
            .ctx
            .dispatch(
                MutationOp::RenameTier,
                Some(key),
                self.gateway.rename_tier(tier_id, &name),
            )
            .await;

        if let Err(err) = result {
            self.ctx
                .board
                .write(|store| store.rename_tier(tier_id, &previous));
            self.ctx.report(MutationOp::RenameTier, Some(key));
            return Err(err);
        }
        Ok(true)
    }

    /// Deletes a tier after a blocking confirmation.
    pub async fn delete(
        &self,
        tier_id: TierId,
        confirm: &impl Confirm,
    ) -> Result<TierDeleteOutcome, BoardError> {
        let key = ItemKey::Tier(tier_id);
        let name = self.ctx.board.read(|store| -> Result<String, BoardError> {
            let tier = store.tier(tier_id).ok_or(BoardError::NotFound(key))?;
            let tracker = store.save_state();
            if tracker.is_saving(key) || tracker.is_reordering() {
                return Err(BoardError::Busy(key));
            }
            Ok(tier.name.clone())
        })?;

        let prompt = format!("Delete tier \"{name}\"? Players stay on the board.");
        if !confirm.confirm(&prompt) {
            info!("event=tier_delete module=tier status=declined tier_id={tier_id}");
            return Ok(TierDeleteOutcome::Declined);
        }

        self.ctx.board.write(|store| -> Result<(), BoardError> {
            if !store.contains(key) {
                return Err(BoardError::NotFound(key));
            }
            // A pending reorder names this tier in its assignment.
            let tracker = store.save_state_mut();
            if tracker.is_reordering() || !tracker.begin(key) {
                return Err(BoardError::Busy(key));
            }
            tracker.hold(StructuralHold::TierChange(tier_id));
            Ok(())
        })?;

        let _guard = InFlightGuard::new(&self.ctx.board, vec![key])
            .holding(StructuralHold::TierChange(tier_id));
        let result = self
            .ctx
            .dispatch(
                MutationOp::DeleteTier,
                Some(key),
                self.gateway.delete_tier(tier_id),
            )
            .await;

        match result {
            Ok(()) => {
                self.ctx.board.write(|store| store.remove_tier(tier_id));
                Ok(TierDeleteOutcome::Deleted)
            }
            Err(err) => {
                self.ctx.report(MutationOp::DeleteTier, Some(key));
                Err(err)
            }
        }
    }
}
