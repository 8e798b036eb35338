//! Persistence gateway implementations.
//!
//! # Responsibility
//! - Map board reads and mutations onto SQLite tables.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Connections must be migrated before a gateway accepts them.
//! - Reorders commit atomically and keep player ranks dense.

pub mod board_repo;
