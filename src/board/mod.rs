//! Board state: zones and per-participant battlefield operations.
//!
//! ## Key Types
//!
//! - `Zone`: hand / lane / deck / discard
//! - `ZoneMap`: exclusive membership with idempotent inserts
//! - `Board`: one participant's hand, three lanes, deck, and discard pile

pub mod board;
pub mod zone;

pub use board::{Board, LaneCards};
pub use zone::{Zone, ZoneMap};
