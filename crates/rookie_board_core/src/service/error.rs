//! Service-level error taxonomy.
//!
//! - Local rejections (`Validation`, `Busy`, `NotFound`, `NoNote`, `Drag`)
//!   never reach the gateway.
//! - Mutation failures (`Gateway`, `TimedOut`) trigger rollback or draft
//!   retention, plus a notification.

use crate::board::store::IntegrityError;
use crate::gateway::GatewayError;
use crate::model::item::ItemKey;
use crate::model::player::PlayerId;
use crate::model::validation::ValidationError;
use crate::service::drag_controller::DragError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Persistence operation kinds, used for logs and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    FetchBoard,
    Reorder,
    CreateTier,
    RenameTier,
    DeleteTier,
    SaveNote,
    DeleteNote,
}

impl MutationOp {
    /// Stable event name for structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchBoard => "board_fetch",
            Self::Reorder => "board_reorder",
            Self::CreateTier => "tier_create",
            Self::RenameTier => "tier_rename",
            Self::DeleteTier => "tier_delete",
            Self::SaveNote => "note_save",
            Self::DeleteNote => "note_delete",
        }
    }

    /// User-facing failure text for notifications.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::FetchBoard => "Failed to load the board",
            Self::Reorder => "Failed to save the new order",
            Self::CreateTier => "Failed to create tier",
            Self::RenameTier => "Failed to rename tier",
            Self::DeleteTier => "Failed to delete tier",
            Self::SaveNote => "Failed to save note",
            Self::DeleteNote => "Failed to delete note",
        }
    }
}

impl Display for MutationOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from board services.
#[derive(Debug)]
pub enum BoardError {
    Validation(ValidationError),
    /// Item already has a mutation in flight.
    Busy(ItemKey),
    NotFound(ItemKey),
    /// Delete requested for a player without a note.
    NoNote(PlayerId),
    Drag(DragError),
    /// Board has in-flight mutations or an active drag.
    Unsettled,
    Gateway {
        op: MutationOp,
        source: GatewayError,
    },
    TimedOut {
        op: MutationOp,
        after: Duration,
    },
    InvalidBoard(IntegrityError),
}

impl BoardError {
    /// Whether the error was raised before any persistence call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Busy(_)
                | Self::NotFound(_)
                | Self::NoNote(_)
                | Self::Drag(_)
                | Self::Unsettled
        )
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Busy(key) => write!(f, "{key} is still saving"),
            Self::NotFound(key) => write!(f, "{key} is not on the board"),
            Self::NoNote(id) => write!(f, "player {id} has no note"),
            Self::Drag(err) => write!(f, "{err}"),
            Self::Unsettled => write!(f, "board has unsettled changes"),
            Self::Gateway { op, source } => write!(f, "{op} failed: {source}"),
            Self::TimedOut { op, after } => {
                write!(f, "{op} timed out after {}ms", after.as_millis())
            }
            Self::InvalidBoard(err) => write!(f, "invalid board: {err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Gateway { source, .. } => Some(source),
            Self::InvalidBoard(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for BoardError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DragError> for BoardError {
    fn from(value: DragError) -> Self {
        Self::Drag(value)
    }
}

impl From<IntegrityError> for BoardError {
    fn from(value: IntegrityError) -> Self {
        Self::InvalidBoard(value)
    }
}
