//! Persistence gateway contract.
//!
//! # Responsibility
//! - Describe the remote operations the board engine drives.
//! - Keep transport details out of services.
//!
//! # Invariants
//! - Mutations are last-write-wins on the remote side.
//! - `reorder` receives the full assignment in new sequence order.

use crate::board::positions::PositionAssignment;
use crate::board::store::BoardData;
use crate::db::DbError;
use crate::model::item::ItemKey;
use crate::model::player::PlayerId;
use crate::model::tier::{Tier, TierId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures reported by a persistence gateway.
#[derive(Debug)]
pub enum GatewayError {
    /// Remote side refused the mutation.
    Rejected(String),
    /// Target entity does not exist remotely.
    NotFound(ItemKey),
    /// Transport or backend is unreachable.
    Unavailable(String),
    /// Embedded storage failure.
    Db(DbError),
    /// Persisted data cannot be converted into the board model.
    InvalidData(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "request rejected: {reason}"),
            Self::NotFound(key) => write!(f, "not found: {key}"),
            Self::Unavailable(reason) => write!(f, "gateway unavailable: {reason}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Remote board operations.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Loads every player and tier of the board.
    async fn fetch_board(&self) -> GatewayResult<BoardData>;
    /// Persists ranks, positions and tier tie-break order.
    async fn reorder(&self, assignments: &[PositionAssignment]) -> GatewayResult<()>;
    /// Creates a tier and returns the stored record.
    async fn create_tier(&self, name: &str, position: u32) -> GatewayResult<Tier>;
    async fn rename_tier(&self, tier_id: TierId, name: &str) -> GatewayResult<()>;
    async fn delete_tier(&self, tier_id: TierId) -> GatewayResult<()>;
    async fn save_note(&self, player_id: PlayerId, content: &str) -> GatewayResult<()>;
    async fn delete_note(&self, player_id: PlayerId) -> GatewayResult<()>;
}
