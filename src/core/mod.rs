//! Core engine types: identities, seats, deterministic RNG, configuration.
//!
//! These are the building blocks the rest of the engine is assembled from.
//! Hosts configure the engine via `RulesConfig` rather than modifying it.

pub mod config;
pub mod entity;
pub mod rng;

pub use config::{
    CompactionCaps, FactionId, LaneKind, LaneSet, LeaderEffect, Rarity, RulesConfig,
};
pub use entity::{InstanceId, ParticipantId, Seat, SeatMap};
pub use rng::{DuelRng, DuelRngState};
