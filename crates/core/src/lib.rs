//! Domain logic for reconciling recurring-job execution history.
//!
//! Everything in this crate is deterministic: no storage, no ambient clock.
//! Callers inject time through [`clock::Clock`] and do their own I/O, which
//! keeps the recurrence and duration math reusable from the HTTP pipeline,
//! tests, and any future backfill tooling alike.

pub mod clock;
pub mod duration;
pub mod execution;
pub mod hosts;
pub mod identity;
pub mod job;
pub mod recurrence;
pub mod status;
pub mod timestamp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use status::RunStatus;
