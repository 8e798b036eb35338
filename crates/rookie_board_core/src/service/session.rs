//! Session facade over one board.
//!
//! # Responsibility
//! - Load the board through the gateway and validate it.
//! - Hand out drag, tier and note services sharing one store.
//! - Refresh from the gateway only when nothing is pending.

use crate::board::store::{BoardHandle, BoardSnapshot, BoardStore};
use crate::config::BoardConfig;
use crate::gateway::PersistenceGateway;
use crate::service::drag_controller::{DragService, DragState};
use crate::service::error::{BoardError, MutationOp};
use crate::service::mutation::MutationContext;
use crate::service::note_service::NoteService;
use crate::service::notify::Notifier;
use crate::service::tier_service::TierService;
use log::info;
use std::sync::Arc;

pub struct BoardSession<G: PersistenceGateway> {
    ctx: MutationContext,
    gateway: Arc<G>,
    drag: DragService<G>,
    tiers: TierService<G>,
    notes: NoteService<G>,
}

impl<G: PersistenceGateway> BoardSession<G> {
    /// Fetches the board and opens a session over it.
    ///
    /// # Errors
    /// - `BoardError::Gateway` / `TimedOut` when the fetch fails.
    /// - `BoardError::InvalidBoard` when persisted ranks are not dense or
    ///   ids repeat.
    pub async fn load(
        gateway: Arc<G>,
        config: &BoardConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, BoardError> {
        let ctx = MutationContext::new(BoardHandle::default(), config.request_timeout(), notifier);
        let store = fetch_store(&ctx, gateway.as_ref()).await?;
        ctx.board.write(|current| current.replace_data(store));

        let snapshot = ctx.board.snapshot();
        info!(
            "event=board_load module=session status=ok items={}",
            snapshot.items.len()
        );

        Ok(Self {
            drag: DragService::new(ctx.clone(), Arc::clone(&gateway)),
            tiers: TierService::new(ctx.clone(), Arc::clone(&gateway)),
            notes: NoteService::new(ctx.clone(), Arc::clone(&gateway)),
            ctx,
            gateway,
        })
    }

    pub fn board(&self) -> &BoardHandle {
        self.ctx.board()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.ctx.board.snapshot()
    }

    pub fn drag(&self) -> &DragService<G> {
        &self.drag
    }

    pub fn tiers(&self) -> &TierService<G> {
        &self.tiers
    }

    pub fn notes(&self) -> &NoteService<G> {
        &self.notes
    }

    /// Whether no save is in flight and no drag is active.
    pub fn is_settled(&self) -> bool {
        self.drag.state() == DragState::Idle
            && self.ctx.board.read(|store| store.save_state().is_idle())
    }

    /// Re-fetches the board, replacing local state.
    ///
    /// Refused with `Unsettled` while a save or drag is pending, so
    /// optimistic state is never overwritten mid-flight.
    pub async fn refresh(&self) -> Result<(), BoardError> {
        if !self.is_settled() {
            return Err(BoardError::Unsettled);
        }
        let store = fetch_store(&self.ctx, self.gateway.as_ref()).await?;
        if self.drag.state() != DragState::Idle {
            return Err(BoardError::Unsettled);
        }
        self.ctx.board.write(|current| {
            if !current.save_state().is_idle() {
                return Err(BoardError::Unsettled);
            }
            current.replace_data(store);
            Ok(())
        })?;
        info!("event=board_refresh module=session status=ok");
        Ok(())
    }
}

async fn fetch_store<G: PersistenceGateway>(
    ctx: &MutationContext,
    gateway: &G,
) -> Result<BoardStore, BoardError> {
    let data = match ctx
        .dispatch(MutationOp::FetchBoard, None, gateway.fetch_board())
        .await
    {
        Ok(data) => data,
        Err(err) => {
            ctx.report(MutationOp::FetchBoard, None);
            return Err(err);
        }
    };
    Ok(BoardStore::from_data(data)?)
}
