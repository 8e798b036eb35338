use rookie_board_core::db::migrations::latest_version;
use rookie_board_core::db::{open_db, open_db_in_memory, DbError};
use rookie_board_core::{
    derive_positions, merge_board, BoardConfig, BoardSession, DragOrigin, GatewayError, ItemKey,
    LogNotifier, PersistenceGateway, PlayerId, PlayerProfile, PositionAssignment,
    SqliteBoardGateway, TierId,
};
use rusqlite::Connection;
use std::sync::Arc;

fn seeded(players: u32) -> SqliteBoardGateway {
    let gateway = SqliteBoardGateway::open_in_memory().unwrap();
    for index in 1..=players {
        gateway
            .insert_player(&PlayerProfile::named(format!("Prospect {index}")))
            .unwrap();
    }
    gateway
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "players");
    assert_table_exists(&conn, "tiers");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn inserted_players_append_dense_ranks() {
    let gateway = seeded(3);
    let mut profile = PlayerProfile::named("Late riser");
    profile.football_position = Some("WR".to_string());
    profile.height_inches = Some(73);
    let player = gateway.insert_player(&profile).unwrap();
    assert_eq!(player.rank, 4);

    let data = gateway.fetch_board().await.unwrap();
    let ranks: Vec<u32> = data.players.iter().map(|player| player.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
    assert_eq!(data.players[3].profile, profile);
    assert!(data.players[3].note.is_none());
}

#[tokio::test]
async fn tiers_at_same_position_load_in_creation_order() {
    let gateway = seeded(2);
    let first = gateway.create_tier("Elite", 1).await.unwrap();
    let second = gateway.create_tier("Blue chip", 1).await.unwrap();
    let later = gateway.create_tier("Day 2", 2).await.unwrap();

    let data = gateway.fetch_board().await.unwrap();
    let ids: Vec<TierId> = data.tiers.iter().map(|tier| tier.id).collect();
    assert_eq!(ids, vec![first.id, second.id, later.id]);
}

#[tokio::test]
async fn reorder_persists_ranks_and_tie_break() {
    let gateway = seeded(3);
    let elite = gateway.create_tier("Elite", 1).await.unwrap();
    let sleepers = gateway.create_tier("Sleepers", 1).await.unwrap();

    let data = gateway.fetch_board().await.unwrap();
    let mut items = merge_board(&data.players, &data.tiers);
    // Swap the two leading tiers and move the last player to the top.
    items.swap(0, 1);
    let last = items.pop().unwrap();
    items.insert(2, last);
    let assignments = derive_positions(&items);
    gateway.reorder(&assignments).await.unwrap();

    let reloaded = gateway.fetch_board().await.unwrap();
    assert_eq!(reloaded.tiers[0].id, sleepers.id);
    assert_eq!(reloaded.tiers[1].id, elite.id);
    assert_eq!(reloaded.players[0].id, PlayerId(3));
    assert_eq!(
        merge_board(&reloaded.players, &reloaded.tiers)
            .iter()
            .map(|item| item.key())
            .collect::<Vec<_>>(),
        items.iter().map(|item| item.key()).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn reorder_with_rank_gap_is_rolled_back() {
    let gateway = seeded(2);
    let assignments = [
        PositionAssignment {
            key: ItemKey::Player(PlayerId(1)),
            position: 1,
        },
        PositionAssignment {
            key: ItemKey::Player(PlayerId(2)),
            position: 3,
        },
    ];

    let err = gateway.reorder(&assignments).await.unwrap_err();
    assert!(matches!(err, GatewayError::Rejected(_)));

    let data = gateway.fetch_board().await.unwrap();
    assert_eq!(data.players[1].rank, 2);
}

#[tokio::test]
async fn reorder_naming_unknown_item_is_not_found() {
    let gateway = seeded(1);
    let missing = ItemKey::Tier(TierId::generate());
    let err = gateway
        .reorder(&[PositionAssignment {
            key: missing,
            position: 1,
        }])
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(key) if key == missing));
}

#[tokio::test]
async fn notes_and_tier_edits_round_trip() {
    let gateway = seeded(2);
    let tier = gateway.create_tier("Elite", 1).await.unwrap();

    gateway.save_note(PlayerId(2), "Sure hands").await.unwrap();
    gateway.rename_tier(tier.id, "Blue chip").await.unwrap();
    let data = gateway.fetch_board().await.unwrap();
    assert_eq!(data.players[1].note.as_deref(), Some("Sure hands"));
    assert_eq!(data.tiers[0].name, "Blue chip");

    gateway.delete_note(PlayerId(2)).await.unwrap();
    gateway.delete_tier(tier.id).await.unwrap();
    let data = gateway.fetch_board().await.unwrap();
    assert!(data.players[1].note.is_none());
    assert!(data.tiers.is_empty());

    assert!(matches!(
        gateway.delete_tier(tier.id).await,
        Err(GatewayError::NotFound(_))
    ));
    assert!(matches!(
        gateway.save_note(PlayerId(9), "ghost").await,
        Err(GatewayError::NotFound(_))
    ));
}

#[tokio::test]
async fn session_over_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    {
        let gateway = SqliteBoardGateway::open(&path).unwrap();
        for index in 1..=3 {
            gateway
                .insert_player(&PlayerProfile::named(format!("Prospect {index}")))
                .unwrap();
        }
    }

    let gateway = Arc::new(SqliteBoardGateway::open(&path).unwrap());
    let session = BoardSession::load(gateway, &BoardConfig::default(), Arc::new(LogNotifier))
        .await
        .unwrap();
    let tier = session.tiers().create("Elite", 2).await.unwrap();
    session.notes().save(PlayerId(1), "Day one starter").await.unwrap();
    session
        .drag()
        .start(ItemKey::Player(PlayerId(3)), DragOrigin::Surface)
        .unwrap();
    session.drag().drop_at(0).await.unwrap();
    let expected = session.snapshot().items;
    drop(session);

    let reopened = SqliteBoardGateway::open(&path).unwrap();
    let data = reopened.fetch_board().await.unwrap();
    assert_eq!(merge_board(&data.players, &data.tiers), expected);
    assert_eq!(data.tiers[0].id, tier.id);
    assert_eq!(data.players[1].note.as_deref(), Some("Day one starter"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "missing table {table_name}");
}
