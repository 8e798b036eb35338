//! CLI probe for the board engine.
//!
//! # Responsibility
//! - Verify `rookie_board_core` linkage without a rendering layer.
//! - Render and seed an embedded board database for local checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rookie_board_core::{
    group_by_tier, init_logging, BoardConfig, BoardSession, LogNotifier, PersistenceGateway,
    PlayerProfile, SqliteBoardGateway,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "rookie-board", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints core linkage and version.
    Version,
    /// Renders the board grouped by tier.
    Show {
        #[arg(long)]
        db: PathBuf,
        /// JSON board config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Populates a demo board.
    Seed {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value_t = 12)]
        players: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Version => {
            println!("rookie_board_core ping={}", rookie_board_core::ping());
            println!(
                "rookie_board_core version={}",
                rookie_board_core::core_version()
            );
        }
        Command::Show { db, config } => show(&db, config.as_deref()).await?,
        Command::Seed { db, players } => seed(&db, players).await?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<BoardConfig> {
    let Some(path) = path else {
        return Ok(BoardConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = BoardConfig::from_json_str(&raw)?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }
    Ok(config)
}

async fn show(db: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let gateway = Arc::new(SqliteBoardGateway::open(db)?);
    let session = BoardSession::load(gateway, &config, Arc::new(LogNotifier)).await?;
    let snapshot = session.snapshot();

    for group in group_by_tier(&snapshot.items) {
        match &group.tier {
            Some(tier) => println!("== {} (position {}) ==", tier.name, tier.position),
            None => println!("== Unassigned =="),
        }
        for player in &group.players {
            let note = if player.has_note() { " [note]" } else { "" };
            println!(
                "{:>4}. {} {}{}",
                player.rank,
                player.profile.name,
                player.profile.football_position.as_deref().unwrap_or("-"),
                note
            );
        }
    }
    Ok(())
}

async fn seed(db: &Path, players: u32) -> Result<()> {
    let gateway = SqliteBoardGateway::open(db)?;
    for index in 1..=players {
        gateway.insert_player(&PlayerProfile::named(format!("Prospect {index}")))?;
    }
    gateway.create_tier("Elite", 1).await?;
    if players > 1 {
        gateway.create_tier("Tier 2", players / 2 + 1).await?;
    }
    info!("event=board_seed module=cli status=ok players={players}");
    println!("seeded players={players} db={}", db.display());
    Ok(())
}
