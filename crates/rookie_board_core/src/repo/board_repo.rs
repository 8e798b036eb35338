//! SQLite-backed persistence gateway for one board.
//!
//! # Responsibility
//! - Implement `PersistenceGateway` over the embedded board schema.
//! - Provide the board-population operation that creates players.
//! - Keep SQL and ordering details inside the repository boundary.
//!
//! # Invariants
//! - Tiers are read in `position ASC, sort_order ASC, created_at ASC` order.
//! - A reorder either commits with dense ranks or leaves storage untouched.
//! - Connections must be at the latest schema version.

use crate::board::positions::PositionAssignment;
use crate::board::store::BoardData;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory};
use crate::gateway::{GatewayError, GatewayResult, PersistenceGateway};
use crate::model::item::ItemKey;
use crate::model::player::{Player, PlayerId, PlayerProfile};
use crate::model::tier::{Tier, TierId};
use async_trait::async_trait;
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const PLAYER_SELECT_SQL: &str = "SELECT
    id,
    external_id,
    name,
    football_position,
    team,
    college,
    height_inches,
    weight_lbs,
    rank,
    note
FROM players";

const TIER_SELECT_SQL: &str = "SELECT
    tier_uuid,
    name,
    position
FROM tiers";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "players",
        &[
            "id",
            "external_id",
            "name",
            "football_position",
            "team",
            "college",
            "height_inches",
            "weight_lbs",
            "rank",
            "note",
        ],
    ),
    ("tiers", &["tier_uuid", "name", "position", "sort_order"]),
];

/// Embedded board storage implementing the persistence gateway.
pub struct SqliteBoardGateway {
    conn: Mutex<Connection>,
}

impl SqliteBoardGateway {
    /// Wraps a migrated connection after checking schema readiness.
    pub fn try_new(conn: Connection) -> GatewayResult<Self> {
        ensure_board_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (and migrates) a board database file.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> GatewayResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Appends a player at the bottom of the board.
    ///
    /// This is the board-population path; the engine itself never creates
    /// players.
    pub fn insert_player(&self, profile: &PlayerProfile) -> GatewayResult<Player> {
        let conn = self.lock();
        let rank: u32 = conn.query_row(
            "SELECT COALESCE(MAX(rank), 0) + 1 FROM players;",
            [],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO players (
                external_id,
                name,
                football_position,
                team,
                college,
                height_inches,
                weight_lbs,
                rank
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                profile.external_id,
                profile.name,
                profile.football_position,
                profile.team,
                profile.college,
                profile.height_inches,
                profile.weight_lbs,
                rank,
            ],
        )?;
        Ok(Player::new(
            PlayerId(conn.last_insert_rowid()),
            rank,
            profile.clone(),
        ))
    }

    fn load_board(&self) -> GatewayResult<BoardData> {
        let conn = self.lock();

        let mut stmt = conn.prepare(&format!("{PLAYER_SELECT_SQL} ORDER BY rank ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut players = Vec::new();
        while let Some(row) = rows.next()? {
            players.push(parse_player_row(row)?);
        }

        let mut stmt = conn.prepare(&format!(
            "{TIER_SELECT_SQL} ORDER BY position ASC, sort_order ASC, created_at ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tiers = Vec::new();
        while let Some(row) = rows.next()? {
            tiers.push(parse_tier_row(row)?);
        }

        Ok(BoardData { players, tiers })
    }

    fn apply_reorder(&self, assignments: &[PositionAssignment]) -> GatewayResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let mut tier_slot = 0i64;
        for assignment in assignments {
            let changed = match assignment.key {
                ItemKey::Player(id) => tx.execute(
                    "UPDATE players
                     SET rank = ?2,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;",
                    params![id.0, assignment.position],
                )?,
                ItemKey::Tier(id) => {
                    tier_slot += 1;
                    tx.execute(
                        "UPDATE tiers
                         SET position = ?2,
                             sort_order = ?3,
                             updated_at = (strftime('%s', 'now') * 1000)
                         WHERE tier_uuid = ?1;",
                        params![id.to_string(), assignment.position, tier_slot],
                    )?
                }
            };
            if changed == 0 {
                return Err(GatewayError::NotFound(assignment.key));
            }
        }

        let (count, distinct, min_rank, max_rank): (i64, i64, i64, i64) = tx.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT rank), COALESCE(MIN(rank), 1), COALESCE(MAX(rank), 0)
             FROM players;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        if count != distinct || (count > 0 && (min_rank != 1 || max_rank != count)) {
            warn!(
                "event=board_reorder module=repo status=rejected players={count} distinct_ranks={distinct}"
            );
            return Err(GatewayError::Rejected(
                "reorder would leave player ranks non-dense".to_string(),
            ));
        }

        tx.commit()?;
        debug!(
            "event=board_reorder module=repo status=ok assignments={}",
            assignments.len()
        );
        Ok(())
    }

    fn insert_tier(&self, name: &str, position: u32) -> GatewayResult<Tier> {
        let conn = self.lock();
        let tier = Tier::new(TierId::generate(), name, position);
        let sort_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM tiers;",
            [],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO tiers (tier_uuid, name, position, sort_order)
             VALUES (?1, ?2, ?3, ?4);",
            params![tier.id.to_string(), tier.name, tier.position, sort_order],
        )?;
        Ok(tier)
    }

    fn update_tier_name(&self, tier_id: TierId, name: &str) -> GatewayResult<()> {
        let changed = self.lock().execute(
            "UPDATE tiers
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE tier_uuid = ?1;",
            params![tier_id.to_string(), name],
        )?;
        ensure_changed(changed, ItemKey::Tier(tier_id))
    }

    fn remove_tier(&self, tier_id: TierId) -> GatewayResult<()> {
        let changed = self.lock().execute(
            "DELETE FROM tiers WHERE tier_uuid = ?1;",
            [tier_id.to_string()],
        )?;
        ensure_changed(changed, ItemKey::Tier(tier_id))
    }

    fn update_note(&self, player_id: PlayerId, note: Option<&str>) -> GatewayResult<()> {
        let changed = self.lock().execute(
            "UPDATE players
             SET note = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![player_id.0, note],
        )?;
        ensure_changed(changed, ItemKey::Player(player_id))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PersistenceGateway for SqliteBoardGateway {
    async fn fetch_board(&self) -> GatewayResult<BoardData> {
        self.load_board()
    }

    async fn reorder(&self, assignments: &[PositionAssignment]) -> GatewayResult<()> {
        self.apply_reorder(assignments)
    }

    async fn create_tier(&self, name: &str, position: u32) -> GatewayResult<Tier> {
        self.insert_tier(name, position)
    }

    async fn rename_tier(&self, tier_id: TierId, name: &str) -> GatewayResult<()> {
        self.update_tier_name(tier_id, name)
    }

    async fn delete_tier(&self, tier_id: TierId) -> GatewayResult<()> {
        self.remove_tier(tier_id)
    }

    async fn save_note(&self, player_id: PlayerId, content: &str) -> GatewayResult<()> {
        self.update_note(player_id, Some(content))
    }

    async fn delete_note(&self, player_id: PlayerId) -> GatewayResult<()> {
        self.update_note(player_id, None)
    }
}

fn ensure_changed(changed: usize, key: ItemKey) -> GatewayResult<()> {
    if changed == 0 {
        return Err(GatewayError::NotFound(key));
    }
    Ok(())
}

fn parse_player_row(row: &Row<'_>) -> GatewayResult<Player> {
    let rank: i64 = row.get("rank")?;
    let rank = u32::try_from(rank)
        .ok()
        .filter(|rank| *rank >= 1)
        .ok_or_else(|| GatewayError::InvalidData(format!("invalid rank `{rank}` in players.rank")))?;

    Ok(Player {
        id: PlayerId(row.get("id")?),
        rank,
        note: row.get("note")?,
        profile: PlayerProfile {
            external_id: row.get("external_id")?,
            name: row.get("name")?,
            football_position: row.get("football_position")?,
            team: row.get("team")?,
            college: row.get("college")?,
            height_inches: row.get("height_inches")?,
            weight_lbs: row.get("weight_lbs")?,
        },
    })
}

fn parse_tier_row(row: &Row<'_>) -> GatewayResult<Tier> {
    let id_text: String = row.get("tier_uuid")?;
    let id = TierId::parse(&id_text).ok_or_else(|| {
        GatewayError::InvalidData(format!("invalid uuid `{id_text}` in tiers.tier_uuid"))
    })?;
    let position: i64 = row.get("position")?;
    let position = u32::try_from(position).map_err(|_| {
        GatewayError::InvalidData(format!("invalid position `{position}` in tiers.position"))
    })?;
    Ok(Tier::new(id, row.get::<_, String>("name")?, position))
}

fn ensure_board_connection_ready(conn: &Connection) -> GatewayResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(GatewayError::Unavailable(format!(
            "board storage requires schema version {expected_version}, got {actual_version}"
        )));
    }

    for (table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(GatewayError::Unavailable(format!(
                "board storage requires table `{table}`"
            )));
        }
        for column in *columns {
            if !table_has_column(conn, table, column)? {
                return Err(GatewayError::Unavailable(format!(
                    "board storage requires column `{column}` in table `{table}`"
                )));
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> GatewayResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> GatewayResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
