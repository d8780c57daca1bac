//! Match session: two boards, the turn machine, and the action API.
//!
//! All mutation of an in-progress match flows through the methods here.
//! Every action is atomic: validation happens before the first mutation,
//! so an illegal action returns a typed rejection and leaves the session
//! byte-for-byte unchanged. Accepted actions append replay-log entries and
//! `StateChange` notifications for the presentation layer to drain.
//!
//! Wall-clock `Instant`s are always supplied by the caller — the session
//! never reads the clock itself, which keeps replays and tests
//! deterministic.

use std::sync::Arc;
use std::time::Instant;

use im::Vector;
use tracing::debug;

use super::events::{ActionKind, ActionRecord, StateChange};
use super::turn::{MatchResult, TurnState};
use crate::board::Board;
use crate::cards::{CardId, CardInstance, CardRegistry};
use crate::core::{
    DuelRng, InstanceId, LaneKind, LeaderEffect, ParticipantId, RulesConfig, Seat, SeatMap,
};
use crate::errors::ActionError;
use crate::power::{Buff, PowerLedger};

/// Human player or scripted opponent?
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParticipantKind {
    Human,
    Scripted,
}

/// One side of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Participant {
    /// Durable identity used as the registry key.
    pub id: ParticipantId,

    /// Human or scripted.
    pub kind: ParticipantKind,

    /// Is the participant currently connected? Scripted opponents are
    /// always considered connected.
    pub connected: bool,
}

impl Participant {
    /// A connected human participant.
    #[must_use]
    pub fn human(id: ParticipantId) -> Self {
        Self {
            id,
            kind: ParticipantKind::Human,
            connected: true,
        }
    }

    /// A scripted opponent.
    #[must_use]
    pub fn scripted(id: ParticipantId) -> Self {
        Self {
            id,
            kind: ParticipantKind::Scripted,
            connected: true,
        }
    }

    /// Is this a human participant?
    #[must_use]
    pub fn is_human(&self) -> bool {
        self.kind == ParticipantKind::Human
    }
}

/// Everything needed to start a match.
#[derive(Clone, Debug)]
pub struct SessionSetup {
    /// The two sides.
    pub participants: SeatMap<Participant>,

    /// Deck lists per seat (card definition ids).
    pub decks: SeatMap<Vec<CardId>>,

    /// RNG seed for shuffles.
    pub seed: u64,

    /// Seat to act first in round 1; `None` lets the RNG decide.
    pub first_turn: Option<Seat>,
}

/// Counts reported by one memory-compaction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactionStats {
    pub replay_trimmed: usize,
    pub revealed_trimmed: usize,
    pub discard_trimmed: usize,
    pub ledger_pruned: usize,
}

impl CompactionStats {
    /// Total entries removed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.replay_trimmed + self.revealed_trimmed + self.discard_trimmed + self.ledger_pruned
    }
}

/// A live match between two participants.
#[derive(Debug)]
pub struct MatchSession {
    config: RulesConfig,
    registry: Arc<CardRegistry>,

    participants: SeatMap<Participant>,
    boards: SeatMap<Board>,
    ledgers: SeatMap<PowerLedger>,
    turn: TurnState,

    leader_used: SeatMap<bool>,
    mulligans_used: SeatMap<u8>,
    mulligan_open: SeatMap<bool>,

    rng: DuelRng,
    next_instance: u32,
    sequence: u32,

    replay: Vector<ActionRecord>,
    revealed: Vec<(Seat, CardId)>,
    pending: Vec<StateChange>,

    created_at: Instant,
    last_activity: Instant,
    disconnected_at: SeatMap<Option<Instant>>,
}

impl MatchSession {
    /// Create a session: deal and shuffle both decks, draw opening hands.
    #[must_use]
    pub fn new(
        setup: SessionSetup,
        registry: Arc<CardRegistry>,
        config: RulesConfig,
        now: Instant,
    ) -> Self {
        let mut rng = DuelRng::new(setup.seed);
        let first = setup.first_turn.unwrap_or_else(|| {
            if rng.gen_range_usize(0..2) == 0 {
                Seat::A
            } else {
                Seat::B
            }
        });

        let mut session = Self {
            config,
            registry,
            participants: setup.participants,
            boards: SeatMap::with_default(),
            ledgers: SeatMap::with_default(),
            turn: TurnState::new(first),
            leader_used: SeatMap::with_value(false),
            mulligans_used: SeatMap::with_value(0),
            mulligan_open: SeatMap::with_value(true),
            rng,
            next_instance: 0,
            sequence: 0,
            replay: Vector::new(),
            revealed: Vec::new(),
            pending: Vec::new(),
            created_at: now,
            last_activity: now,
            disconnected_at: SeatMap::with_value(None),
        };

        for seat in Seat::both() {
            for card_id in setup.decks[seat].clone() {
                let instance = session.alloc_instance();
                session.boards[seat].deal_to_deck(CardInstance::new(instance, card_id));
            }
            session.boards[seat].shuffle_deck(&mut session.rng);
            for _ in 0..session.config.starting_hand_size {
                if session.boards[seat].draw(&mut session.rng).is_some() {
                    session.pending.push(StateChange::CardDrawn { seat });
                }
            }
        }

        session
            .pending
            .push(StateChange::RoundStarted { round: 1, starter: first });
        session.pending.push(StateChange::TurnChanged { owner: first });
        session
    }

    fn alloc_instance(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_instance);
        self.next_instance += 1;
        id
    }

    // === Queries (read-only, side-effect-free) ===

    /// The rules configuration.
    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// The shared card registry.
    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    /// A seat's participant record.
    #[must_use]
    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.participants[seat]
    }

    /// The seat a participant id occupies, if any.
    #[must_use]
    pub fn seat_of(&self, id: ParticipantId) -> Option<Seat> {
        Seat::both().find(|&seat| self.participants[seat].id == id)
    }

    /// A seat's board.
    #[must_use]
    pub fn board(&self, seat: Seat) -> &Board {
        &self.boards[seat]
    }

    /// A seat's modifier ledger.
    #[must_use]
    pub fn ledger(&self, seat: Seat) -> &PowerLedger {
        &self.ledgers[seat]
    }

    /// The turn/round state.
    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    /// Seat whose action is awaited.
    #[must_use]
    pub fn whose_turn(&self) -> Seat {
        self.turn.current_owner()
    }

    /// Has the match ended?
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.turn.is_ended()
    }

    /// Terminal result, once ended.
    #[must_use]
    pub fn result(&self) -> Option<MatchResult> {
        self.turn.result()
    }

    /// Effective power of one card on a seat's side.
    #[must_use]
    pub fn effective_power(&self, seat: Seat, card: InstanceId) -> i32 {
        let base = self.boards[seat]
            .card(card)
            .map_or(0, |c| self.registry.base_power(c.card_id));
        self.ledgers[seat].effective_power(card, base, self.turn.round())
    }

    /// Lane total for one seat.
    #[must_use]
    pub fn lane_total(&self, seat: Seat, lane: LaneKind) -> i32 {
        self.boards[seat].lane_total(
            lane,
            &self.registry,
            &self.ledgers[seat],
            self.turn.round(),
            self.config.clamp_lane_totals,
        )
    }

    /// Board total for one seat.
    #[must_use]
    pub fn board_total(&self, seat: Seat) -> i32 {
        self.boards[seat].board_total(
            &self.registry,
            &self.ledgers[seat],
            self.turn.round(),
            self.config.clamp_lane_totals,
        )
    }

    /// When the session was created.
    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Timestamp of the last accepted action.
    #[must_use]
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// When a seat disconnected, if currently disconnected.
    #[must_use]
    pub fn disconnected_at(&self, seat: Seat) -> Option<Instant> {
        self.disconnected_at[seat]
    }

    /// Are all human participants disconnected?
    ///
    /// Sessions against scripted opponents count as fully disconnected
    /// when their sole human is gone.
    #[must_use]
    pub fn all_humans_disconnected(&self) -> bool {
        Seat::both()
            .filter(|&seat| self.participants[seat].is_human())
            .all(|seat| !self.participants[seat].connected)
    }

    /// The replay log.
    #[must_use]
    pub fn replay_log(&self) -> &Vector<ActionRecord> {
        &self.replay
    }

    /// Cards revealed to the opponent so far.
    #[must_use]
    pub fn revealed_history(&self) -> &[(Seat, CardId)] {
        &self.revealed
    }

    /// Drain pending state-change notifications.
    pub fn drain_events(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.pending)
    }

    // === Action API ===

    /// Play a card from `seat`'s hand to a lane.
    pub fn play_card(
        &mut self,
        seat: Seat,
        card: InstanceId,
        lane: LaneKind,
        now: Instant,
    ) -> Result<(), ActionError> {
        self.ensure_live()?;
        self.ensure_owner(seat)?;

        // Board validates zone and lane legality before touching anything.
        self.boards[seat].play_card(card, lane, &self.registry)?;

        let card_id = self.boards[seat]
            .card(card)
            .map(|c| c.card_id)
            .unwrap_or(CardId::new(0));
        debug!(%seat, %card, %lane, "card played");

        self.pending.push(StateChange::CardPlayed { seat, card, lane });
        if self.registry.revealed_on_play(card_id) {
            self.revealed.push((seat, card_id));
            self.pending.push(StateChange::CardRevealed { seat, card: card_id });
        }

        if self.registry.play_ends_turn(card_id) {
            let before = self.turn.current_owner();
            self.turn.record_turn_ending_play(seat);
            if self.turn.current_owner() != before {
                self.pending.push(StateChange::TurnChanged {
                    owner: self.turn.current_owner(),
                });
            }
        }

        self.commit_action(seat, ActionKind::Play { card, lane }, now);
        Ok(())
    }

    /// Pass for `seat`. Ends the round when both seats have passed.
    pub fn pass(&mut self, seat: Seat, now: Instant) -> Result<(), ActionError> {
        self.apply_pass(seat, false, now)
    }

    /// Timer-synthesized pass for the current owner.
    ///
    /// Same semantics as `pass`; the emitted notification is marked auto.
    pub fn auto_pass(&mut self, seat: Seat, now: Instant) -> Result<(), ActionError> {
        self.apply_pass(seat, true, now)
    }

    fn apply_pass(&mut self, seat: Seat, auto: bool, now: Instant) -> Result<(), ActionError> {
        self.ensure_live()?;
        self.ensure_owner(seat)?;
        if self.turn.has_passed(seat) {
            // Can't happen while the owner check holds, but cheap to state.
            return Err(ActionError::NotYourTurn(seat));
        }

        self.turn.record_pass(seat);
        self.pending.push(StateChange::Passed { seat, auto });
        if !self.turn.both_passed() {
            self.pending.push(StateChange::TurnChanged {
                owner: self.turn.current_owner(),
            });
        }
        self.commit_action(seat, ActionKind::Pass { auto }, now);

        if self.turn.both_passed() {
            self.resolve_round();
        }
        Ok(())
    }

    /// Consume `seat`'s once-per-match leader ability.
    pub fn use_leader_ability(&mut self, seat: Seat, now: Instant) -> Result<(), ActionError> {
        self.ensure_live()?;
        self.ensure_owner(seat)?;
        if self.leader_used[seat] {
            return Err(ActionError::LeaderAlreadyUsed(seat));
        }

        let effect = self.config.leader_effects[seat.index()];
        self.leader_used[seat] = true;

        match effect {
            LeaderEffect::None => {}
            LeaderEffect::Draw(count) => {
                for _ in 0..count {
                    if self.boards[seat].draw(&mut self.rng).is_some() {
                        self.pending.push(StateChange::CardDrawn { seat });
                    }
                }
            }
            LeaderEffect::BoostLane { lane, delta } => {
                let round = self.turn.round();
                let cards: Vec<InstanceId> = self.boards[seat].lane(lane).to_vec();
                for card in cards {
                    self.ledgers[seat].add_buff(card, Buff::until_round(delta, round, round));
                }
            }
        }

        self.pending.push(StateChange::LeaderUsed { seat, effect });
        self.commit_action(seat, ActionKind::Leader, now);
        Ok(())
    }

    /// Swap an opening-hand card back into the deck and draw a replacement.
    ///
    /// Available only during round 1, before the seat takes any other
    /// action, and at most `mulligan_limit` times.
    pub fn mulligan(
        &mut self,
        seat: Seat,
        card: InstanceId,
        now: Instant,
    ) -> Result<(), ActionError> {
        self.ensure_live()?;
        if !self.mulligan_open[seat] || self.mulligans_used[seat] >= self.config.mulligan_limit {
            return Err(ActionError::MulliganExhausted(seat));
        }

        self.boards[seat].return_to_deck(card)?;
        self.boards[seat].shuffle_deck(&mut self.rng);
        self.mulligans_used[seat] += 1;

        self.pending.push(StateChange::CardMulliganed { seat });
        if self.boards[seat].draw(&mut self.rng).is_some() {
            self.pending.push(StateChange::CardDrawn { seat });
        }

        let round = self.turn.round();
        let sequence = self.next_sequence();
        self.replay.push_back(ActionRecord {
            seat,
            kind: ActionKind::Mulligan { card },
            round,
            sequence,
        });
        self.last_activity = now;
        Ok(())
    }

    /// Immediately end the match, bypassing round resolution.
    ///
    /// Used by lifecycle events (forfeit, disconnect, entity death).
    /// Idempotent: returns `false` without error on an already-ended
    /// session.
    pub fn force_game_end(
        &mut self,
        triggering: Seat,
        participant_wins: bool,
        now: Instant,
    ) -> bool {
        let winner = if participant_wins {
            triggering
        } else {
            triggering.opponent()
        };

        let transitioned = self.turn.force_end(MatchResult::Winner(winner));
        if transitioned {
            let round = self.turn.round();
            let sequence = self.next_sequence();
            self.replay.push_back(ActionRecord {
                seat: triggering,
                kind: ActionKind::ForceEnd,
                round,
                sequence,
            });
            self.pending.push(StateChange::MatchEnded {
                result: MatchResult::Winner(winner),
            });
            self.last_activity = now;
        }
        transitioned
    }

    /// End an abandoned match with no one credited. Idempotent.
    pub fn force_draw(&mut self, now: Instant) -> bool {
        let transitioned = self.turn.force_end(MatchResult::Draw);
        if transitioned {
            self.pending.push(StateChange::MatchEnded {
                result: MatchResult::Draw,
            });
            self.last_activity = now;
        }
        transitioned
    }

    // === Connection tracking ===

    /// Mark a seat disconnected.
    pub fn mark_disconnected(&mut self, seat: Seat, now: Instant) {
        self.participants[seat].connected = false;
        self.disconnected_at[seat] = Some(now);
    }

    /// Mark a seat reconnected and refresh activity.
    pub fn mark_reconnected(&mut self, seat: Seat, now: Instant) {
        self.participants[seat].connected = true;
        self.disconnected_at[seat] = None;
        self.last_activity = now;
    }

    // === Memory compaction (typed accessors, between-action only) ===

    /// Trim the replay log to `max_len` entries, oldest evicted first.
    pub fn trim_replay_log(&mut self, max_len: usize) -> usize {
        if self.replay.len() <= max_len {
            return 0;
        }
        let excess = self.replay.len() - max_len;
        self.replay = self.replay.skip(excess);
        excess
    }

    /// Trim the revealed-card history, oldest evicted first.
    pub fn trim_revealed_history(&mut self, max_len: usize) -> usize {
        if self.revealed.len() <= max_len {
            return 0;
        }
        let excess = self.revealed.len() - max_len;
        self.revealed.drain(..excess);
        excess
    }

    /// Trim both discard piles to `cap` cards each.
    pub fn trim_discard_piles(&mut self, cap: usize) -> usize {
        Seat::both()
            .map(|seat| self.boards[seat].trim_discard(cap))
            .sum()
    }

    /// Prune ledger/buff entries for cards absent from every live lane.
    pub fn prune_stale_ledger_entries(&mut self) -> usize {
        let boards = &self.boards;
        self.ledgers
            .iter_mut()
            .map(|(seat, ledger)| ledger.prune_stale(&|card| boards[seat].is_on_lane(card)))
            .sum()
    }

    /// Drop buffs that expired before the current round.
    pub fn expire_buffs(&mut self) {
        let round = self.turn.round();
        for (_, ledger) in self.ledgers.iter_mut() {
            ledger.expire_buffs(round);
        }
    }

    /// Run one full compaction pass under the given caps.
    pub fn compact(&mut self, caps: &crate::core::CompactionCaps) -> CompactionStats {
        self.expire_buffs();
        CompactionStats {
            replay_trimmed: self.trim_replay_log(caps.replay_log),
            revealed_trimmed: self.trim_revealed_history(caps.revealed_history),
            discard_trimmed: self.trim_discard_piles(caps.discard_pile),
            ledger_pruned: self.prune_stale_ledger_entries(),
        }
    }

    // === Internals ===

    fn ensure_live(&self) -> Result<(), ActionError> {
        if self.turn.is_ended() {
            return Err(ActionError::AlreadyEnded);
        }
        Ok(())
    }

    fn ensure_owner(&self, seat: Seat) -> Result<(), ActionError> {
        if self.turn.current_owner() != seat {
            return Err(ActionError::NotYourTurn(seat));
        }
        Ok(())
    }

    fn next_sequence(&mut self) -> u32 {
        let seq = self.sequence;
        self.sequence += 1;
        seq
    }

    fn commit_action(&mut self, seat: Seat, kind: ActionKind, now: Instant) {
        let round = self.turn.round();
        let sequence = self.next_sequence();
        self.replay.push_back(ActionRecord {
            seat,
            kind,
            round,
            sequence,
        });
        self.mulligan_open[seat] = false;
        self.last_activity = now;
    }

    fn resolve_round(&mut self) {
        let totals = [self.board_total(Seat::A), self.board_total(Seat::B)];
        let outcome = self.turn.resolve_round(totals, self.config.rounds_to_win);

        debug!(
            round = outcome.round,
            winner = ?outcome.winner,
            totals = ?outcome.totals,
            "round resolved"
        );
        self.pending.push(StateChange::RoundEnded {
            round: outcome.round,
            winner: outcome.winner,
            totals: outcome.totals,
        });

        if let Some(result) = outcome.match_result {
            self.pending.push(StateChange::MatchEnded { result });
            return;
        }

        for seat in Seat::both() {
            self.boards[seat].clear_lanes();
        }
        self.turn.start_next_round(outcome.winner);
        self.expire_buffs();

        self.pending.push(StateChange::RoundStarted {
            round: self.turn.round(),
            starter: self.turn.round_starter(),
        });
        self.pending.push(StateChange::TurnChanged {
            owner: self.turn.current_owner(),
        });
    }

    // === Snapshot support (crate-internal) ===

    pub(crate) fn rng(&self) -> &DuelRng {
        &self.rng
    }

    pub(crate) fn leader_used_map(&self) -> &SeatMap<bool> {
        &self.leader_used
    }

    pub(crate) fn mulligans_used_map(&self) -> &SeatMap<u8> {
        &self.mulligans_used
    }

    pub(crate) fn mulligan_open_map(&self) -> &SeatMap<bool> {
        &self.mulligan_open
    }

    pub(crate) fn sequence_counter(&self) -> u32 {
        self.sequence
    }

    pub(crate) fn next_instance_counter(&self) -> u32 {
        self.next_instance
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: RulesConfig,
        registry: Arc<CardRegistry>,
        participants: SeatMap<Participant>,
        boards: SeatMap<Board>,
        ledgers: SeatMap<PowerLedger>,
        turn: TurnState,
        leader_used: SeatMap<bool>,
        mulligans_used: SeatMap<u8>,
        mulligan_open: SeatMap<bool>,
        rng: DuelRng,
        next_instance: u32,
        sequence: u32,
        replay: Vector<ActionRecord>,
        revealed: Vec<(Seat, CardId)>,
        now: Instant,
    ) -> Self {
        Self {
            config,
            registry,
            participants,
            boards,
            ledgers,
            turn,
            leader_used,
            mulligans_used,
            mulligan_open,
            rng,
            next_instance,
            sequence,
            replay,
            revealed,
            pending: Vec::new(),
            created_at: now,
            last_activity: now,
            disconnected_at: SeatMap::with_value(None),
        }
    }
}
