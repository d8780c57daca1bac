//! Scripted-opponent policy.
//!
//! A deliberately simple greedy policy: play the strongest legal card, or
//! pass once passing is clearly enough (or nothing is playable). The
//! lifecycle layer invokes it between polls so a human never waits on a
//! vacant seat.

use std::time::Instant;

use tracing::debug;

use super::session::MatchSession;
use crate::core::{InstanceId, LaneKind, Seat};
use crate::errors::ActionError;

/// What the policy chose to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptedMove {
    Play { card: InstanceId, lane: LaneKind },
    Pass,
}

/// Greedy one-move-per-invocation opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptedOpponent;

impl ScriptedOpponent {
    /// Pick a move for `seat` without mutating the session.
    ///
    /// Passes when the hand is empty, when no card has a legal lane, or
    /// when the opponent has already passed and `seat` is ahead on board
    /// total (playing more cards would waste them).
    #[must_use]
    pub fn choose(&self, session: &MatchSession, seat: Seat) -> ScriptedMove {
        let opponent = seat.opponent();
        if session.turn().has_passed(opponent)
            && session.board_total(seat) > session.board_total(opponent)
        {
            return ScriptedMove::Pass;
        }

        let registry = session.registry();
        let best = session
            .board(seat)
            .hand()
            .iter()
            .filter_map(|&card| {
                let def = session.board(seat).card(card)?;
                let lane = LaneKind::ALL
                    .into_iter()
                    .find(|&lane| registry.may_occupy(def.card_id, lane))?;
                Some((card, lane, session.effective_power(seat, card)))
            })
            .max_by_key(|&(_, _, power)| power);

        match best {
            Some((card, lane, _)) => ScriptedMove::Play { card, lane },
            None => ScriptedMove::Pass,
        }
    }

    /// Choose and apply one move for `seat`.
    pub fn take_turn(
        &self,
        session: &mut MatchSession,
        seat: Seat,
        now: Instant,
    ) -> Result<ScriptedMove, ActionError> {
        let chosen = self.choose(session, seat);
        debug!(%seat, ?chosen, "scripted move");
        match chosen {
            ScriptedMove::Play { card, lane } => session.play_card(seat, card, lane, now)?,
            ScriptedMove::Pass => session.pass(seat, now)?,
        }
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cards::{CardDefinition, CardId, CardRegistry, TypeCapability};
    use crate::core::{LaneSet, ParticipantId, RulesConfig, SeatMap};
    use crate::session::{Participant, SessionSetup};

    fn melee_registry() -> Arc<CardRegistry> {
        let mut registry = CardRegistry::new();
        let melee = registry.register_type(TypeCapability::unit(LaneSet::only(LaneKind::Melee)));
        for (id, power) in [(1, 2), (2, 9), (3, 4)] {
            registry.register(CardDefinition::new(
                CardId::new(id),
                format!("Card {id}"),
                melee,
                power,
            ));
        }
        Arc::new(registry)
    }

    fn ai_session() -> MatchSession {
        let setup = SessionSetup {
            participants: SeatMap::new(|seat| match seat {
                Seat::A => Participant::human(ParticipantId::new(1)),
                Seat::B => Participant::scripted(ParticipantId::new(2)),
            }),
            decks: SeatMap::with_value((1..=3).map(CardId::new).collect()),
            seed: 7,
            first_turn: Some(Seat::B),
        };
        let config = RulesConfig {
            starting_hand_size: 3,
            ..RulesConfig::default()
        };
        MatchSession::new(setup, melee_registry(), config, Instant::now())
    }

    #[test]
    fn test_plays_strongest_card() {
        let mut session = ai_session();
        let policy = ScriptedOpponent;

        let chosen = policy.take_turn(&mut session, Seat::B, Instant::now()).unwrap();

        match chosen {
            ScriptedMove::Play { card, .. } => {
                let id = session.board(Seat::B).card(card).unwrap().card_id;
                assert_eq!(id, CardId::new(2));
            }
            ScriptedMove::Pass => panic!("should play with a full hand"),
        }
    }

    #[test]
    fn test_ranks_hand_by_effective_power() {
        use crate::session::SessionSnapshot;

        let session = ai_session();
        let mut snapshot = SessionSnapshot::capture(&session);

        // A modifier turns the weakest card (base 2) into the strongest
        // (effective 12); the policy must follow effective power.
        let weak = snapshot.boards[Seat::B]
            .hand()
            .iter()
            .copied()
            .find(|&card| {
                snapshot.boards[Seat::B].card(card).unwrap().card_id == CardId::new(1)
            })
            .unwrap();
        snapshot.ledgers[Seat::B].add_delta(weak, 10);

        let session = snapshot.restore(melee_registry(), Instant::now());
        let policy = ScriptedOpponent;

        assert_eq!(
            policy.choose(&session, Seat::B),
            ScriptedMove::Play { card: weak, lane: LaneKind::Melee }
        );
    }

    #[test]
    fn test_passes_when_ahead_and_opponent_passed() {
        let mut session = ai_session();
        let now = Instant::now();
        let policy = ScriptedOpponent;

        // B plays its strongest card, then the human passes.
        policy.take_turn(&mut session, Seat::B, now).unwrap();
        session.pass(Seat::A, now).unwrap();

        assert_eq!(policy.choose(&session, Seat::B), ScriptedMove::Pass);
    }

    #[test]
    fn test_passes_with_empty_hand() {
        let mut session = ai_session();
        let now = Instant::now();
        let policy = ScriptedOpponent;

        // Exhaust B's hand, with A ceding turns.
        for _ in 0..3 {
            policy.take_turn(&mut session, Seat::B, now).unwrap();
            let card = session.board(Seat::A).hand()[0];
            session.play_card(Seat::A, card, LaneKind::Melee, now).unwrap();
        }

        assert!(session.board(Seat::B).hand().is_empty());
        assert_eq!(policy.choose(&session, Seat::B), ScriptedMove::Pass);
    }
}
