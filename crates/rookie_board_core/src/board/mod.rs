//! Ordered board engine state.
//!
//! # Responsibility
//! - Merge players and tiers into one drag-reorderable sequence.
//! - Re-derive ranks and positions after a reorder.
//! - Hold the single-writer entity store and its save-state tracker.
//!
//! # Invariants
//! - The merged sequence is a total order over all players and tiers.
//! - Tier membership is derived from order, never stored.

pub mod merge;
pub mod positions;
pub mod save_state;
pub mod store;
