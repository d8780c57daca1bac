//! Power resolution: modifier ledger, buffs, effective power.
//!
//! ## Key Types
//!
//! - `Buff`: round-scoped power effect attached to a card instance
//! - `PowerLedger`: per-seat deltas + buff stacks with pure `effective_power`

pub mod buff;
pub mod ledger;

pub use buff::Buff;
pub use ledger::PowerLedger;
