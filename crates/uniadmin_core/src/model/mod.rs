//! Domain model for university users and staff availability.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Model students and staff as one tagged user shape.
//!
//! # Invariants
//! - Owned collections are constructed empty, never absent.
//! - Enumerations serialize with their canonical upper-snake names.

pub mod staff;
pub mod user;
