//! Per-player note lifecycle and edit-surface drafts.
//!
//! # Invariants
//! - Blank content never reaches the gateway.
//! - A failed save keeps the attempted content on the player and leaves the
//!   draft open with the error.
//! - Note deletes are not optimistic.
//! - Drafts cannot be opened or edited while the player is saving.

use crate::board::store::NoteDraft;
use crate::gateway::PersistenceGateway;
use crate::model::item::ItemKey;
use crate::model::player::PlayerId;
use crate::model::validation::validate_note;
use crate::service::error::{BoardError, MutationOp};
use crate::service::mutation::{InFlightGuard, MutationContext};
use log::info;
use std::sync::Arc;

pub struct NoteService<G: PersistenceGateway> {
    ctx: MutationContext,
    gateway: Arc<G>,
}

impl<G: PersistenceGateway> NoteService<G> {
    pub fn new(ctx: MutationContext, gateway: Arc<G>) -> Self {
        Self { ctx, gateway }
    }

    /// Opens the edit surface seeded with the current note.
    ///
    /// Refused with `Busy` while the player has a mutation in flight.
    pub fn open_draft(&self, player_id: PlayerId) -> Result<NoteDraft, BoardError> {
        self.ctx.board.write(|store| -> Result<NoteDraft, BoardError> {
            let key = ItemKey::Player(player_id);
            if store.save_state().is_saving(key) {
                return Err(BoardError::Busy(key));
            }
            if let Some(draft) = store.note_draft(player_id) {
                return Ok(draft.clone());
            }
            let player = store.player(player_id).ok_or(BoardError::NotFound(key))?;
            let content = player.note.clone().unwrap_or_default();
            store.open_draft(player_id, content.clone());
            Ok(NoteDraft {
                content,
                error: None,
            })
        })
    }

    /// Replaces draft content and clears any inline error.
    pub fn update_draft(&self, player_id: PlayerId, content: &str) -> Result<(), BoardError> {
        self.ctx.board.write(|store| -> Result<(), BoardError> {
            let key = ItemKey::Player(player_id);
            if store.player(player_id).is_none() {
                return Err(BoardError::NotFound(key));
            }
            if store.save_state().is_saving(key) {
                return Err(BoardError::Busy(key));
            }
            store.open_draft(player_id, content.to_string());
            Ok(())
        })
    }

    pub fn discard_draft(&self, player_id: PlayerId) -> Option<NoteDraft> {
        self.ctx.board.write(|store| store.close_draft(player_id))
    }

    /// Saves a note optimistically.
    pub async fn save(&self, player_id: PlayerId, content: &str) -> Result<(), BoardError> {
        let key = ItemKey::Player(player_id);
        if let Err(err) = validate_note(content) {
            self.ctx.board.write(|store| {
                if store.note_draft(player_id).is_some() {
                    store.set_draft_error(player_id, content, err.to_string());
                }
            });
            return Err(err.into());
        }

        self.ctx.board.write(|store| -> Result<(), BoardError> {
            if store.player(player_id).is_none() {
                return Err(BoardError::NotFound(key));
            }
            if !store.save_state_mut().begin(key) {
                return Err(BoardError::Busy(key));
            }
            store.set_note(player_id, Some(content.to_string()));
            store.open_draft(player_id, content.to_string());
            Ok(())
        })?;

        let _guard = InFlightGuard::new(&self.ctx.board, vec![key]);
        let result = self
            .ctx
            .dispatch(
                MutationOp::SaveNote,
                Some(key),
                self.gateway.save_note(player_id, content),
            )
            .await;

        match result {
            Ok(()) => {
                self.ctx.board.write(|store| store.close_draft(player_id));
                Ok(())
            }
            Err(err) => {
                let message = MutationOp::SaveNote.failure_message().to_string();
                self.ctx
                    .board
                    .write(|store| store.set_draft_error(player_id, content, message));
                self.ctx.report(MutationOp::SaveNote, Some(key));
                Err(err)
            }
        }
    }

    /// Deletes an existing note. The note is cleared only once persisted.
    pub async fn delete(&self, player_id: PlayerId) -> Result<(), BoardError> {
        let key = ItemKey::Player(player_id);
        self.ctx.board.write(|store| -> Result<(), BoardError> {
            let player = store.player(player_id).ok_or(BoardError::NotFound(key))?;
            if !player.has_note() {
                return Err(BoardError::NoNote(player_id));
            }
            if !store.save_state_mut().begin(key) {
                return Err(BoardError::Busy(key));
            }
            Ok(())
        })?;

        let _guard = InFlightGuard::new(&self.ctx.board, vec![key]);
        let result = self
            .ctx
            .dispatch(
                MutationOp::DeleteNote,
                Some(key),
                self.gateway.delete_note(player_id),
            )
            .await;

        match result {
            Ok(()) => {
                self.ctx.board.write(|store| {
                    store.set_note(player_id, None);
                    store.close_draft(player_id);
                });
                info!("event=note_delete module=note status=ok player_id={player_id}");
                Ok(())
            }
            Err(err) => {
                self.ctx.report(MutationOp::DeleteNote, Some(key));
                Err(err)
            }
        }
    }
}
