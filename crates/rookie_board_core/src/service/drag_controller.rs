//! Drag reorder controller.
//!
//! # Responsibility
//! - Gate drag starts (exclusion zones, in-flight items, unknown items).
//! - Turn a drop into a full re-derived position assignment.
//! - Dispatch the reorder and roll back the layout on failure.
//!
//! # Invariants
//! - States: `Idle -> Dragging -> Saving -> Idle`, or `Dragging -> Idle` on
//!   cancel or an unchanged drop.
//! - Hover previews are never written to the store.
//! - A drop that leaves the key order unchanged makes no gateway call.

use crate::board::merge::index_of;
use crate::board::positions::{move_item, plan_reorder, ReorderPlan};
use crate::board::save_state::StructuralHold;
use crate::board::store::{BoardStore, Layout};
use crate::gateway::PersistenceGateway;
use crate::model::item::{BoardItem, ItemKey};
use crate::service::error::{BoardError, MutationOp};
use crate::service::mutation::{InFlightGuard, MutationContext};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Interactive child regions that never start a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveRegion {
    Button,
    Link,
    TextInput,
    MenuTrigger,
}

/// Where a drag gesture started inside an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    /// Item body or drag handle.
    Surface,
    Interactive(InteractiveRegion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        key: ItemKey,
        from_index: usize,
        hover_index: usize,
    },
    Saving {
        key: ItemKey,
    },
}

/// Refused drag transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// A drag is already active or its save has not settled.
    NotIdle,
    /// No drag is active.
    NotDragging,
    /// Gesture began inside an interactive child region.
    ExcludedOrigin(InteractiveRegion),
    /// Item has a mutation in flight.
    ItemSaving(ItemKey),
    UnknownItem(ItemKey),
}

impl Display for DragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotIdle => write!(f, "another drag is still active"),
            Self::NotDragging => write!(f, "no drag in progress"),
            Self::ExcludedOrigin(region) => {
                write!(f, "drag cannot start from an interactive {region:?}")
            }
            Self::ItemSaving(key) => write!(f, "{key} is still saving"),
            Self::UnknownItem(key) => write!(f, "{key} is not on the board"),
        }
    }
}

impl Error for DragError {}

/// Result of a drop gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Key order is unchanged; back to `Idle`.
    Unchanged,
    /// Controller is `Saving`; the plan must be persisted.
    Reorder(ReorderPlan),
}

/// Gesture-library-agnostic drag state machine.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// Enters `Dragging` when every precondition holds.
    pub fn start(
        &mut self,
        key: ItemKey,
        origin: DragOrigin,
        store: &BoardStore,
    ) -> Result<(), DragError> {
        if !self.is_idle() {
            return Err(DragError::NotIdle);
        }
        if let DragOrigin::Interactive(region) = origin {
            return Err(DragError::ExcludedOrigin(region));
        }
        if store.save_state().is_saving(key) {
            return Err(DragError::ItemSaving(key));
        }
        let from_index = index_of(&store.items(), key).ok_or(DragError::UnknownItem(key))?;
        self.state = DragState::Dragging {
            key,
            from_index,
            hover_index: from_index,
        };
        Ok(())
    }

    /// Previews the sequence with the dragged item at `index`.
    pub fn hover(&mut self, index: usize, store: &BoardStore) -> Result<Vec<BoardItem>, DragError> {
        let DragState::Dragging { key, from_index, .. } = self.state else {
            return Err(DragError::NotDragging);
        };
        let items = store.items();
        let from = index_of(&items, key).ok_or(DragError::UnknownItem(key))?;
        let hover_index = index.min(items.len().saturating_sub(1));
        self.state = DragState::Dragging {
            key,
            from_index,
            hover_index,
        };
        Ok(move_item(&items, from, hover_index))
    }

    /// Abandons the active drag. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, DragState::Dragging { .. }) {
            self.state = DragState::Idle;
            return true;
        }
        false
    }

    /// Resolves the drop at `index` against the current store.
    pub fn drop_at(&mut self, index: usize, store: &BoardStore) -> Result<DropOutcome, DragError> {
        let DragState::Dragging { key, .. } = self.state else {
            return Err(DragError::NotDragging);
        };
        let items = store.items();
        let Some(from) = index_of(&items, key) else {
            self.state = DragState::Idle;
            return Err(DragError::UnknownItem(key));
        };

        match plan_reorder(&items, from, index) {
            None => {
                self.state = DragState::Idle;
                Ok(DropOutcome::Unchanged)
            }
            Some(plan) => {
                self.state = DragState::Saving { key };
                Ok(DropOutcome::Reorder(plan))
            }
        }
    }

    /// Returns to `Idle` once a save settles.
    pub fn finish(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Outcome reported to gesture callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResult {
    Unchanged,
    Reordered { changed: Vec<ItemKey> },
}

/// Async drag orchestration over one session's store and gateway.
pub struct DragService<G: PersistenceGateway> {
    ctx: MutationContext,
    gateway: Arc<G>,
    controller: Mutex<DragController>,
}

impl<G: PersistenceGateway> DragService<G> {
    pub fn new(ctx: MutationContext, gateway: Arc<G>) -> Self {
        Self {
            ctx,
            gateway,
            controller: Mutex::new(DragController::new()),
        }
    }

    pub fn state(&self) -> DragState {
        self.controller().state()
    }

    pub fn start(&self, key: ItemKey, origin: DragOrigin) -> Result<(), BoardError> {
        let mut controller = self.controller();
        self.ctx
            .board
            .read(|store| controller.start(key, origin, store))?;
        debug!("event=drag_start module=drag status=ok item={key}");
        Ok(())
    }

    pub fn hover(&self, index: usize) -> Result<Vec<BoardItem>, BoardError> {
        let mut controller = self.controller();
        Ok(self.ctx.board.read(|store| controller.hover(index, store))?)
    }

    pub fn cancel(&self) -> bool {
        let cancelled = self.controller().cancel();
        if cancelled {
            debug!("event=drag_cancel module=drag status=ok");
        }
        cancelled
    }

    /// Drops the dragged item at `index` and persists the new order.
    ///
    /// The moved item and every item whose ordinal changed are marked
    /// in flight. On failure the previous ranks and positions are restored.
    pub async fn drop_at(&self, index: usize) -> Result<DropResult, BoardError> {
        let prepared = {
            let mut controller = self.controller();
            self.ctx.board.write(
                |store| -> Result<Option<(ReorderPlan, Layout)>, BoardError> {
                    let plan = match controller.drop_at(index, store)? {
                        DropOutcome::Unchanged => return Ok(None),
                        DropOutcome::Reorder(plan) => plan,
                    };
                    // The assignment names every tier, so a pending tier
                    // create or delete would reach the gateway half-applied.
                    let tracker = store.save_state_mut();
                    let claimed = match tracker.pending_tier_change() {
                        Some(tier) => Err(ItemKey::Tier(tier)),
                        None if tracker.is_reordering() => Err(plan.moved),
                        None => tracker.begin_all(&plan.changed),
                    };
                    if let Err(busy) = claimed {
                        controller.finish();
                        return Err(BoardError::Busy(busy));
                    }
                    tracker.hold(StructuralHold::Reorder);
                    let layout = store.capture_layout();
                    store.apply_assignments(&plan.assignments);
                    Ok(Some((plan, layout)))
                },
            )?
        };

        let Some((plan, layout)) = prepared else {
            debug!("event=drag_drop module=drag status=unchanged");
            return Ok(DropResult::Unchanged);
        };

        let _settle = SettleOnDrop(&self.controller);
        let _guard = InFlightGuard::new(&self.ctx.board, plan.changed.clone())
            .holding(StructuralHold::Reorder);
        let result = self
            .ctx
            .dispatch(
                MutationOp::Reorder,
                Some(plan.moved),
                self.gateway.reorder(&plan.assignments),
            )
            .await;

        match result {
            Ok(()) => {
                info!(
                    "event=drag_drop module=drag status=ok item={} changed={}",
                    plan.moved,
                    plan.changed.len()
                );
                Ok(DropResult::Reordered {
                    changed: plan.changed,
                })
            }
            Err(err) => {
                self.ctx.board.write(|store| store.restore_layout(&layout));
                self.ctx.report(MutationOp::Reorder, Some(plan.moved));
                Err(err)
            }
        }
    }

    fn controller(&self) -> MutexGuard<'_, DragController> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the controller to `Idle` when the save future completes or is
/// dropped.
struct SettleOnDrop<'a>(&'a Mutex<DragController>);

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();
    }
}
