//! Match sessions: the action API, turn machine, and snapshots.
//!
//! ## Key Types
//!
//! - `MatchSession`: two boards + turn state, mutated only via the action API
//! - `TurnState` / `MatchResult`: whose-turn, pass flags, round wins
//! - `StateChange` / `ActionRecord`: presentation notifications and replay log
//! - `SessionSnapshot`: plain persistable image with best-effort restore
//! - `ScriptedOpponent`: greedy policy for AI-seat turns

pub mod ai;
pub mod events;
pub mod session;
pub mod snapshot;
pub mod turn;

pub use ai::{ScriptedMove, ScriptedOpponent};
pub use events::{ActionKind, ActionRecord, StateChange};
pub use session::{CompactionStats, MatchSession, Participant, ParticipantKind, SessionSetup};
pub use snapshot::SessionSnapshot;
pub use turn::{MatchResult, RoundOutcome, TurnState};
