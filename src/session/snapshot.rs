//! Session snapshots for the persistence boundary.
//!
//! A `SessionSnapshot` is a plain serde value holding everything needed to
//! reconstruct a `MatchSession`: zone contents, counters, ledgers, the
//! turn machine, and the RNG stream position. The core never chooses a
//! storage format — the host serializes the snapshot however it likes
//! (tests exercise JSON and bincode).
//!
//! Restore is best-effort by contract: a partial or internally
//! inconsistent snapshot is patched back to a usable state with a
//! `tracing::warn` per anomaly, never a fatal error. Missing fields
//! deserialize to defaults, so a truncated snapshot still restores to an
//! empty-but-live session.

use std::sync::Arc;
use std::time::Instant;

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::events::ActionRecord;
use super::session::{MatchSession, Participant};
use super::turn::TurnState;
use crate::board::Board;
use crate::cards::{CardId, CardRegistry};
use crate::core::{DuelRng, DuelRngState, ParticipantId, RulesConfig, Seat, SeatMap};
use crate::power::PowerLedger;

fn default_participants() -> SeatMap<Participant> {
    SeatMap::new(|seat| Participant::human(ParticipantId::new(seat.index() as u64)))
}

fn default_turn() -> TurnState {
    TurnState::new(Seat::A)
}

/// Plain persistable image of one match session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub config: RulesConfig,

    #[serde(default = "default_participants")]
    pub participants: SeatMap<Participant>,

    #[serde(default)]
    pub boards: SeatMap<Board>,

    #[serde(default)]
    pub ledgers: SeatMap<PowerLedger>,

    #[serde(default = "default_turn")]
    pub turn: TurnState,

    #[serde(default)]
    pub leader_used: SeatMap<bool>,

    #[serde(default)]
    pub mulligans_used: SeatMap<u8>,

    #[serde(default)]
    pub mulligan_open: SeatMap<bool>,

    #[serde(default)]
    pub rng: DuelRngState,

    /// Next instance id the session would allocate.
    #[serde(default)]
    pub next_instance: u32,

    /// Next replay sequence number.
    #[serde(default)]
    pub sequence: u32,

    #[serde(default)]
    pub replay: Vec<ActionRecord>,

    #[serde(default)]
    pub revealed: Vec<(Seat, CardId)>,
}

impl SessionSnapshot {
    /// Capture a snapshot of a live session.
    #[must_use]
    pub fn capture(session: &MatchSession) -> Self {
        Self {
            config: session.config().clone(),
            participants: SeatMap::new(|seat| *session.participant(seat)),
            boards: SeatMap::new(|seat| session.board(seat).clone()),
            ledgers: SeatMap::new(|seat| session.ledger(seat).clone()),
            turn: session.turn().clone(),
            leader_used: session.leader_used_map().clone(),
            mulligans_used: session.mulligans_used_map().clone(),
            mulligan_open: session.mulligan_open_map().clone(),
            rng: session.rng().state(),
            next_instance: session.next_instance_counter(),
            sequence: session.sequence_counter(),
            replay: session.replay_log().iter().copied().collect(),
            revealed: session.revealed_history().to_vec(),
        }
    }

    /// Rebuild a session from this snapshot.
    ///
    /// Never fails: inconsistent counters are patched forward and each
    /// repair is logged, so the worst corrupt input yields an
    /// empty-but-playable session rather than an error.
    #[must_use]
    pub fn restore(mut self, registry: Arc<CardRegistry>, now: Instant) -> MatchSession {
        self.repair();

        MatchSession::from_parts(
            self.config,
            registry,
            self.participants,
            self.boards,
            self.ledgers,
            self.turn,
            self.leader_used,
            self.mulligans_used,
            self.mulligan_open,
            DuelRng::from_state(&self.rng),
            self.next_instance,
            self.sequence,
            Vector::from_iter(self.replay),
            self.revealed,
            now,
        )
    }

    /// Patch internal inconsistencies a damaged snapshot may carry.
    ///
    /// The id counters only ever need to move forward: a counter behind
    /// the ids already in use would hand out duplicates.
    fn repair(&mut self) {
        let max_dealt = Seat::both()
            .flat_map(|seat| self.boards[seat].instance_ids())
            .map(|id| id.raw())
            .max();
        if let Some(max) = max_dealt {
            if self.next_instance <= max {
                warn!(
                    next_instance = self.next_instance,
                    max_dealt = max,
                    "snapshot instance counter behind dealt cards; bumping"
                );
                self.next_instance = max + 1;
            }
        }

        let max_sequence = self.replay.iter().map(|record| record.sequence).max();
        if let Some(max) = max_sequence {
            if self.sequence <= max {
                warn!(
                    sequence = self.sequence,
                    max_replayed = max,
                    "snapshot sequence counter behind replay log; bumping"
                );
                self.sequence = max + 1;
            }
        }

        let ordered = self
            .replay
            .windows(2)
            .all(|pair| pair[0].sequence <= pair[1].sequence);
        if !ordered {
            warn!("snapshot replay log out of order; re-sorting");
            self.replay.sort_by_key(|record| record.sequence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, TypeCapability};
    use crate::core::{InstanceId, LaneKind, LaneSet};
    use crate::session::SessionSetup;

    fn test_registry() -> Arc<CardRegistry> {
        let mut registry = CardRegistry::new();
        let creature =
            registry.register_type(TypeCapability::unit(LaneSet::only(LaneKind::Melee)));
        for id in 1..=5 {
            registry.register(CardDefinition::new(
                CardId::new(id),
                format!("Card {id}"),
                creature,
                id as i32,
            ));
        }
        Arc::new(registry)
    }

    fn test_session() -> MatchSession {
        let setup = SessionSetup {
            participants: SeatMap::new(|seat| {
                Participant::human(ParticipantId::new(seat.index() as u64 + 1))
            }),
            decks: SeatMap::with_value((1..=5).map(CardId::new).collect()),
            seed: 11,
            first_turn: Some(Seat::A),
        };
        let config = RulesConfig {
            starting_hand_size: 3,
            ..RulesConfig::default()
        };
        MatchSession::new(setup, test_registry(), config, Instant::now())
    }

    #[test]
    fn test_capture_restore_round_trip() {
        let mut session = test_session();
        let now = Instant::now();
        let card = session.board(Seat::A).hand()[0];
        session.play_card(Seat::A, card, LaneKind::Melee, now).unwrap();

        let snapshot = SessionSnapshot::capture(&session);
        let restored = snapshot.restore(test_registry(), now);

        assert_eq!(restored.whose_turn(), session.whose_turn());
        assert_eq!(restored.turn(), session.turn());
        for seat in Seat::both() {
            assert_eq!(restored.board(seat), session.board(seat));
            assert_eq!(restored.ledger(seat), session.ledger(seat));
        }
        assert_eq!(restored.replay_log().len(), session.replay_log().len());
    }

    #[test]
    fn test_restored_session_accepts_actions() {
        let session = test_session();
        let now = Instant::now();

        let snapshot = SessionSnapshot::capture(&session);
        let mut restored = snapshot.restore(test_registry(), now);

        let card = restored.board(Seat::A).hand()[0];
        restored.play_card(Seat::A, card, LaneKind::Melee, now).unwrap();
        assert!(restored.board(Seat::A).is_on_lane(card));
    }

    #[test]
    fn test_repair_bumps_stale_counters() {
        let session = test_session();
        let mut snapshot = SessionSnapshot::capture(&session);

        // Damage the counters the way a partial write would.
        snapshot.next_instance = 0;
        snapshot.sequence = 0;
        snapshot.replay.push(ActionRecord {
            seat: Seat::A,
            kind: crate::session::ActionKind::Pass { auto: false },
            round: 1,
            sequence: 6,
        });

        let restored = snapshot.restore(test_registry(), Instant::now());

        // Counters moved past what the boards and replay log already use.
        let max_dealt = Seat::both()
            .flat_map(|seat| restored.board(seat).instance_ids())
            .map(InstanceId::raw)
            .max()
            .unwrap();
        assert_eq!(restored.next_instance_counter(), max_dealt + 1);
        assert_eq!(restored.sequence_counter(), 7);
    }

    #[test]
    fn test_partial_json_restores_to_default() {
        // A truncated snapshot: only the turn survived.
        let json = r#"{"turn":{"current_owner":"B","passed":{"data":[false,false]},"round":2,"round_wins":{"data":[1,0]},"round_starter":"B","result":null}}"#;
        let snapshot: SessionSnapshot = serde_json::from_str(json).unwrap();

        let restored = snapshot.restore(test_registry(), Instant::now());

        assert_eq!(restored.whose_turn(), Seat::B);
        assert_eq!(restored.turn().round(), 2);
        assert!(restored.board(Seat::A).hand().is_empty());
        assert!(!restored.is_ended());
    }
}
