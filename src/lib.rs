//! # lane-duel
//!
//! A three-lane, best-of-three card battle engine with session lifecycle
//! management, built to be hosted inside a larger game.
//!
//! ## Design Principles
//!
//! 1. **Configuration Over Convention**: lane legality, turn rules, round
//!    thresholds, timeouts, and compaction caps all arrive via
//!    `RulesConfig` and the capability table — no hardcoded card types.
//!
//! 2. **Typed Results, No Panics**: every rule violation is a value
//!    (`ActionError`, `RegistryError`); an illegal action mutates nothing
//!    and nothing in the engine aborts the host.
//!
//! 3. **Explicit Ownership**: the `SessionRegistry` is an injected
//!    instance the driver owns — no global state. Sessions are mutated
//!    only through their action API.
//!
//! 4. **Caller-Supplied Time**: the engine never reads the clock. Buff
//!    expiry runs on the round counter; turn budgets, staleness, and
//!    reconnect windows run on `Instant`s passed in by the driver, so
//!    every path replays deterministically under test.
//!
//! ## Modules
//!
//! - `core`: identity types, seats, deterministic RNG, configuration
//! - `cards`: immutable definitions, per-type capabilities, registry
//! - `power`: modifier ledger, buffs, pure effective-power resolution
//! - `board`: per-participant zones (hand, three lanes, deck, discard)
//! - `session`: the match session, turn machine, snapshots, scripted AI
//! - `timer`: per-session turn clock with level-triggered expiry
//! - `registry`: keyed session store, reaping, AI driving, compaction

pub mod board;
pub mod cards;
pub mod core;
pub mod errors;
pub mod power;
pub mod registry;
pub mod session;
pub mod timer;

// Re-export commonly used types
pub use crate::core::{
    CompactionCaps, DuelRng, DuelRngState, FactionId, InstanceId, LaneKind, LaneSet, LeaderEffect,
    ParticipantId, Rarity, RulesConfig, Seat, SeatMap,
};

pub use crate::cards::{
    CapabilityTable, CardDefinition, CardId, CardInstance, CardRegistry, CardTypeId,
    TypeCapability,
};

pub use crate::power::{Buff, PowerLedger};

pub use crate::board::{Board, Zone, ZoneMap};

pub use crate::session::{
    ActionKind, ActionRecord, CompactionStats, MatchResult, MatchSession, Participant,
    ParticipantKind, RoundOutcome, ScriptedMove, ScriptedOpponent, SessionSetup, SessionSnapshot,
    StateChange, TurnState,
};

pub use crate::timer::TurnTimer;

pub use crate::registry::{SessionEntry, SessionHandle, SessionRegistry};

pub use crate::errors::{ActionError, RegistryError};
