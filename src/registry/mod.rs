//! Session registry and lifecycle management.
//!
//! The registry is the keyed store of live matches: every human
//! participant id maps to the `Arc<Mutex<SessionEntry>>` of their session,
//! so both players of a match share one entry and a scripted-opponent
//! match has a single live key. A participant id maps to at most one
//! active session.
//!
//! The registry is an explicitly-owned instance handed to the driver — no
//! process-wide singleton. The driver's periodic tick calls
//! `poll_timers` (auto-pass on turn timeout), `drive_ai` (scripted-seat
//! turns), `reap_stale` (inactivity and abandonment cleanup), and
//! `compact_sessions` (log/ledger trimming) at whatever cadence it likes;
//! player actions and disconnect handlers arrive between ticks. The map is
//! the only structure shared across callers; locks are always taken map
//! first, then entry.
//!
//! Each entry owns its own turn timer and AI-scheduling timestamp, so
//! timer metadata can never outlive or desynchronize from the session it
//! belongs to.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::cards::CardRegistry;
use crate::core::{ParticipantId, RulesConfig, Seat};
use crate::errors::RegistryError;
use crate::session::{
    CompactionStats, MatchResult, MatchSession, ScriptedOpponent, SessionSetup,
};
use crate::timer::TurnTimer;

/// One live match plus its per-session driver metadata.
#[derive(Debug)]
pub struct SessionEntry {
    /// The match itself.
    pub session: MatchSession,

    /// Turn clock for the current owner.
    pub timer: TurnTimer,

    /// When the scripted seat last took a turn, for the min-delay window.
    last_ai_turn: Option<Instant>,
}

impl SessionEntry {
    /// The moment the current turn's clock is measured from.
    ///
    /// A player action through the session handle refreshes
    /// `last_activity` without touching the timer, so the budget is
    /// anchored to whichever is later.
    fn turn_anchor(&self) -> Instant {
        self.timer.started().max(self.session.last_activity())
    }

    /// Has the current turn's budget elapsed?
    #[must_use]
    pub fn turn_expired(&self, now: Instant) -> bool {
        now.duration_since(self.turn_anchor()) > self.timer.budget()
    }

    /// Time left on the current turn.
    #[must_use]
    pub fn time_remaining(&self, now: Instant) -> Duration {
        self.timer
            .budget()
            .saturating_sub(now.duration_since(self.turn_anchor()))
    }
}

/// Shared handle to a registry entry.
pub type SessionHandle = Arc<Mutex<SessionEntry>>;

/// Keyed store of live sessions with lifecycle management.
pub struct SessionRegistry {
    cards: Arc<CardRegistry>,
    config: RulesConfig,
    sessions: RwLock<FxHashMap<ParticipantId, SessionHandle>>,
    opponent: ScriptedOpponent,
}

impl SessionRegistry {
    /// Create a registry over a card registry and rules configuration.
    #[must_use]
    pub fn new(cards: Arc<CardRegistry>, config: RulesConfig) -> Self {
        Self {
            cards,
            config,
            sessions: RwLock::new(FxHashMap::default()),
            opponent: ScriptedOpponent,
        }
    }

    /// The rules configuration sessions are created under.
    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    // === Lifecycle API ===

    /// Create a session and key it under its human participants.
    ///
    /// Fails with `AlreadyInSession` if any human participant is already
    /// keyed to a live session; a participant id maps to at most one.
    pub fn create_session(
        &self,
        setup: SessionSetup,
        now: Instant,
    ) -> Result<SessionHandle, RegistryError> {
        let mut sessions = self.sessions.write().unwrap();

        let keyed: Vec<ParticipantId> = Seat::both()
            .map(|seat| setup.participants[seat])
            .filter(|participant| participant.is_human())
            .map(|participant| participant.id)
            .collect();
        for &id in &keyed {
            if sessions.contains_key(&id) {
                return Err(RegistryError::AlreadyInSession(id));
            }
        }

        let session = MatchSession::new(setup, Arc::clone(&self.cards), self.config.clone(), now);
        let handle: SessionHandle = Arc::new(Mutex::new(SessionEntry {
            session,
            timer: TurnTimer::new(now, self.config.turn_budget),
            last_ai_turn: None,
        }));

        for &id in &keyed {
            sessions.insert(id, Arc::clone(&handle));
        }
        info!(participants = ?keyed, "session created");
        Ok(handle)
    }

    /// Look up the live session for a participant.
    #[must_use]
    pub fn get_active_session(&self, id: ParticipantId) -> Option<SessionHandle> {
        self.sessions.read().unwrap().get(&id).cloned()
    }

    /// Is a participant currently keyed to a session?
    #[must_use]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.sessions.read().unwrap().contains_key(&id)
    }

    /// Number of distinct live sessions.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        let sessions = self.sessions.read().unwrap();
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        sessions
            .values()
            .filter(|handle| seen.insert(Arc::as_ptr(handle) as usize))
            .count()
    }

    /// Remove a participant's session from the registry.
    ///
    /// A still-running match is force-ended as a draw first (lifecycle
    /// paths treat an already-ended session as a no-op). Returns the
    /// terminal result.
    pub fn end_session(
        &self,
        id: ParticipantId,
        now: Instant,
    ) -> Result<MatchResult, RegistryError> {
        let mut sessions = self.sessions.write().unwrap();
        let handle = sessions
            .get(&id)
            .cloned()
            .ok_or(RegistryError::SessionNotFound(id))?;
        sessions.retain(|_, other| !Arc::ptr_eq(other, &handle));
        drop(sessions);

        let mut entry = handle.lock().unwrap();
        entry.session.force_draw(now);
        let result = entry.session.result().unwrap_or(MatchResult::Draw);
        info!(%id, ?result, "session ended and removed");
        Ok(result)
    }

    /// Time remaining on a participant's current turn.
    #[must_use]
    pub fn time_remaining(&self, id: ParticipantId, now: Instant) -> Option<Duration> {
        let handle = self.get_active_session(id)?;
        let entry = handle.lock().unwrap();
        Some(entry.time_remaining(now))
    }

    // === Driver tick ===

    /// Auto-pass every session whose turn budget has elapsed.
    ///
    /// Safe to call at any cadence: expiry is level-triggered and the
    /// session's own guards make a duplicate pass a no-op. Returns how
    /// many passes were synthesized.
    pub fn poll_timers(&self, now: Instant) -> usize {
        let mut forced = 0;
        for handle in self.unique_handles() {
            let mut entry = handle.lock().unwrap();
            if entry.session.is_ended() || !entry.turn_expired(now) {
                continue;
            }

            let owner = entry.session.whose_turn();
            if entry.session.auto_pass(owner, now).is_ok() {
                debug!(%owner, "turn budget elapsed; auto-pass");
                forced += 1;
            }
            entry.timer.reset(now);
        }
        forced
    }

    /// Take one scripted-opponent turn per session whose AI seat owns the
    /// turn and whose minimum-delay window has elapsed.
    ///
    /// The per-entry timestamp guarantees at most one AI action per window
    /// even when polled faster than the delay. Returns how many moves were
    /// applied.
    pub fn drive_ai(&self, now: Instant) -> usize {
        let mut moves = 0;
        for handle in self.unique_handles() {
            let mut entry = handle.lock().unwrap();
            if entry.session.is_ended() {
                continue;
            }

            let seat = entry.session.whose_turn();
            if entry.session.participant(seat).is_human() {
                continue;
            }
            let window_open = entry
                .last_ai_turn
                .map_or(true, |last| now.duration_since(last) >= self.config.ai_min_delay);
            if !window_open {
                continue;
            }

            if self.opponent.take_turn(&mut entry.session, seat, now).is_ok() {
                entry.last_ai_turn = Some(now);
                entry.timer.reset(now);
                moves += 1;
            }
        }
        moves
    }

    /// Force-end and remove stale sessions.
    ///
    /// A session is stale when its last activity is older than the
    /// configured timeout, or when every human participant has been
    /// disconnected for longer than the reconnect window. Never touches a
    /// session with recent activity. Returns how many were reaped.
    pub fn reap_stale(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().unwrap();

        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let mut stale: Vec<SessionHandle> = Vec::new();
        for handle in sessions.values() {
            if !seen.insert(Arc::as_ptr(handle) as usize) {
                continue;
            }
            let mut entry = handle.lock().unwrap();
            if self.is_stale(&entry, now) {
                warn!(
                    round = entry.session.turn().round(),
                    "stale session force-ended"
                );
                entry.session.force_draw(now);
                stale.push(Arc::clone(handle));
            }
        }

        for handle in &stale {
            sessions.retain(|_, other| !Arc::ptr_eq(other, handle));
        }
        if !stale.is_empty() {
            info!(reaped = stale.len(), "stale sessions removed");
        }
        stale.len()
    }

    fn is_stale(&self, entry: &SessionEntry, now: Instant) -> bool {
        if now.duration_since(entry.session.last_activity()) > self.config.stale_timeout {
            return true;
        }
        if !entry.session.all_humans_disconnected() {
            return false;
        }
        Seat::both()
            .filter(|&seat| entry.session.participant(seat).is_human())
            .all(|seat| {
                entry
                    .session
                    .disconnected_at(seat)
                    .is_some_and(|at| now.duration_since(at) > self.config.reconnect_window)
            })
    }

    /// Run one memory-compaction pass over every live session.
    ///
    /// Trims replay logs, revealed-card history, and discard piles to the
    /// configured caps, and prunes ledger entries for cards off every
    /// lane. Runs between discrete actions only — the entry lock
    /// guarantees no action resolution is in flight.
    pub fn compact_sessions(&self) -> CompactionStats {
        let mut total = CompactionStats::default();
        for handle in self.unique_handles() {
            let mut entry = handle.lock().unwrap();
            let stats = entry.session.compact(&self.config.caps);
            total.replay_trimmed += stats.replay_trimmed;
            total.revealed_trimmed += stats.revealed_trimmed;
            total.discard_trimmed += stats.discard_trimmed;
            total.ledger_pruned += stats.ledger_pruned;
        }
        if total.total() > 0 {
            debug!(removed = total.total(), "compaction pass");
        }
        total
    }

    // === Disconnect / reconnect ===

    /// Record a participant's disconnect.
    ///
    /// The session stays resident and keyed so a reconnect within the
    /// configured window restores it; the reaper removes it afterwards.
    pub fn handle_disconnect(
        &self,
        id: ParticipantId,
        now: Instant,
    ) -> Result<(), RegistryError> {
        let handle = self
            .get_active_session(id)
            .ok_or(RegistryError::SessionNotFound(id))?;
        let mut entry = handle.lock().unwrap();
        let seat = entry
            .session
            .seat_of(id)
            .ok_or(RegistryError::SessionNotFound(id))?;

        entry.session.mark_disconnected(seat, now);
        info!(%id, %seat, "participant disconnected");
        Ok(())
    }

    /// Restore a participant's in-progress session after a reconnect.
    ///
    /// A simple key-presence check with an age bound: reconnecting after
    /// the window has elapsed reports `SessionNotFound` and leaves the
    /// entry for the reaper.
    pub fn handle_reconnect(
        &self,
        id: ParticipantId,
        now: Instant,
    ) -> Result<SessionHandle, RegistryError> {
        let handle = self
            .get_active_session(id)
            .ok_or(RegistryError::SessionNotFound(id))?;
        let mut entry = handle.lock().unwrap();
        let seat = entry
            .session
            .seat_of(id)
            .ok_or(RegistryError::SessionNotFound(id))?;

        if let Some(at) = entry.session.disconnected_at(seat) {
            if now.duration_since(at) > self.config.reconnect_window {
                return Err(RegistryError::SessionNotFound(id));
            }
        }

        entry.session.mark_reconnected(seat, now);
        info!(%id, %seat, "participant reconnected");
        drop(entry);
        Ok(handle)
    }

    /// Snapshot of every distinct live session handle.
    fn unique_handles(&self) -> Vec<SessionHandle> {
        let sessions = self.sessions.read().unwrap();
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        sessions
            .values()
            .filter(|handle| seen.insert(Arc::as_ptr(handle) as usize))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, TypeCapability};
    use crate::core::{LaneKind, LaneSet, SeatMap};
    use crate::session::Participant;

    fn test_cards() -> Arc<CardRegistry> {
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

    fn test_config() -> RulesConfig {
        RulesConfig {
            starting_hand_size: 3,
            ..RulesConfig::default()
        }
    }

    fn human_setup(a: u64, b: u64) -> SessionSetup {
        SessionSetup {
            participants: SeatMap::new(|seat| match seat {
                Seat::A => Participant::human(ParticipantId::new(a)),
                Seat::B => Participant::human(ParticipantId::new(b)),
            }),
            decks: SeatMap::with_value((1..=5).map(CardId::new).collect()),
            seed: 3,
            first_turn: Some(Seat::A),
        }
    }

    #[test]
    fn test_both_keys_share_one_session() {
        let registry = SessionRegistry::new(test_cards(), test_config());
        let now = Instant::now();

        let handle = registry.create_session(human_setup(1, 2), now).unwrap();

        let a = registry.get_active_session(ParticipantId::new(1)).unwrap();
        let b = registry.get_active_session(ParticipantId::new(2)).unwrap();
        assert!(Arc::ptr_eq(&a, &handle));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.active_sessions(), 1);
    }

    #[test]
    fn test_one_session_per_participant() {
        let registry = SessionRegistry::new(test_cards(), test_config());
        let now = Instant::now();
        registry.create_session(human_setup(1, 2), now).unwrap();

        let err = registry.create_session(human_setup(2, 3), now).unwrap_err();

        assert_eq!(err, RegistryError::AlreadyInSession(ParticipantId::new(2)));
        assert!(!registry.contains(ParticipantId::new(3)));
    }

    #[test]
    fn test_end_session_removes_both_keys() {
        let registry = SessionRegistry::new(test_cards(), test_config());
        let now = Instant::now();
        registry.create_session(human_setup(1, 2), now).unwrap();

        registry.end_session(ParticipantId::new(1), now).unwrap();

        assert!(!registry.contains(ParticipantId::new(1)));
        assert!(!registry.contains(ParticipantId::new(2)));
        assert_eq!(registry.active_sessions(), 0);
    }

    #[test]
    fn test_unknown_participant_is_not_found() {
        let registry = SessionRegistry::new(test_cards(), test_config());

        assert!(registry.get_active_session(ParticipantId::new(9)).is_none());
        let err = registry
            .end_session(ParticipantId::new(9), Instant::now())
            .unwrap_err();
        assert_eq!(err, RegistryError::SessionNotFound(ParticipantId::new(9)));
    }
}
