//! Board use-case services.
//!
//! # Responsibility
//! - Drive optimistic mutations against the store and the gateway.
//! - Keep rendering and gesture layers decoupled from persistence.
//!
//! # Invariants
//! - The store lock is never held across an `.await`.
//! - Every gateway call is deadline-bounded and releases its save-state
//!   markers on every exit path.

pub mod drag_controller;
pub mod error;
pub mod mutation;
pub mod note_service;
pub mod notify;
pub mod session;
pub mod tier_service;
