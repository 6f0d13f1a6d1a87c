//! Repository layer: persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the persistence contract the staff directory depends on.
//! - Keep SQL details out of scheduling logic.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to transport errors.

pub mod staff_repo;
