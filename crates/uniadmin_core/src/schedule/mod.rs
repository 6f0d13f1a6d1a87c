//! Staff availability scheduling.
//!
//! # Responsibility
//! - Interval math shared by every overlap decision.
//! - Per-staff schedule stores with the non-overlap invariant.
//! - Directory, availability and specialty read paths.
//!
//! # Invariants
//! - Availability intervals are half-open `[start, end)`.
//! - One writer at a time per staff member; no cross-staff contention.

pub mod availability;
pub mod directory;
pub mod interval;
pub mod specialty;
pub mod store;
