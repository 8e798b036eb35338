//! Core engine for the Rookie Board.
//! Merges ranked players and positioned tiers into one reorderable board and
//! owns every optimistic mutation against it.

pub mod board;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use board::merge::{group_by_tier, merge_board, tier_membership, TierGroup};
pub use board::positions::{derive_positions, plan_reorder, PositionAssignment, ReorderPlan};
pub use board::save_state::SaveStateTracker;
pub use board::store::{
    BoardData, BoardHandle, BoardSnapshot, BoardStore, IntegrityError, NoteDraft,
};
pub use config::{BoardConfig, ConfigError};
pub use gateway::{GatewayError, GatewayResult, PersistenceGateway};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{BoardItem, ItemKey};
pub use model::player::{Player, PlayerId, PlayerProfile};
pub use model::tier::{Tier, TierId};
pub use model::validation::ValidationError;
pub use repo::board_repo::SqliteBoardGateway;
pub use service::drag_controller::{
    DragController, DragError, DragOrigin, DragService, DragState, DropOutcome, DropResult,
    InteractiveRegion,
};
pub use service::error::{BoardError, MutationOp};
pub use service::note_service::NoteService;
pub use service::notify::{LogNotifier, Notice, NoticeLevel, Notifier};
pub use service::session::BoardSession;
pub use service::tier_service::{Confirm, TierDeleteOutcome, TierService};

/// Minimal health-check API for CLI probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
