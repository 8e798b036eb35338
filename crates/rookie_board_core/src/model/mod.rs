//! Board domain model.
//!
//! # Responsibility
//! - Define players, tiers and the tagged board item union.
//! - Own local validation rules shared by lifecycle services.
//!
//! # Invariants
//! - Player ranks are 1-based; tier positions share the same ordinal space.
//! - `ItemKey` keeps player and tier identities in disjoint namespaces.

pub mod item;
pub mod player;
pub mod tier;
pub mod validation;
