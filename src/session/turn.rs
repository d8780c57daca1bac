//! Turn and round state machine.
//!
//! Tracks whose turn it is, per-seat pass flags, the round counter,
//! round-win tallies, and the terminal result. The session drives it:
//! `record_pass` and `record_turn_ending_play` handle owner flips,
//! `resolve_round` credits a finished round, `start_next_round` re-arms the
//! flags, and `force_end` is the idempotent escape hatch for forfeits,
//! disconnects, and lifecycle cleanup.

use serde::{Deserialize, Serialize};

use crate::core::{Seat, SeatMap};

/// Result of a completed match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// Single winner.
    Winner(Seat),
    /// Neither seat is credited (double forfeit, stale abandonment).
    Draw,
}

impl MatchResult {
    /// Check if a seat won.
    #[must_use]
    pub fn is_winner(&self, seat: Seat) -> bool {
        matches!(self, MatchResult::Winner(winner) if *winner == seat)
    }
}

/// Outcome of resolving one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// The round that just ended.
    pub round: u32,
    /// Round winner; `None` on a tie (no one credited).
    pub winner: Option<Seat>,
    /// Board totals at resolution, in seat order (A, B).
    pub totals: [i32; 2],
    /// Match result if this round decided the match.
    pub match_result: Option<MatchResult>,
}

/// Turn/round bookkeeping for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Seat whose action the machine is awaiting.
    current_owner: Seat,

    /// Per-seat pass flags for the current round.
    passed: SeatMap<bool>,

    /// Current round number (starts at 1).
    round: u32,

    /// Round-win tallies.
    round_wins: SeatMap<u8>,

    /// Seat that acted first this round.
    round_starter: Seat,

    /// Terminal result; `Some` once the match has ended.
    result: Option<MatchResult>,
}

impl TurnState {
    /// Create the state machine with `first` to act in round 1.
    #[must_use]
    pub fn new(first: Seat) -> Self {
        Self {
            current_owner: first,
            passed: SeatMap::with_value(false),
            round: 1,
            round_wins: SeatMap::with_value(0),
            round_starter: first,
            result: None,
        }
    }

    // === Queries ===

    /// Seat whose action is awaited.
    #[must_use]
    pub fn current_owner(&self) -> Seat {
        self.current_owner
    }

    /// Has this seat passed in the current round?
    #[must_use]
    pub fn has_passed(&self, seat: Seat) -> bool {
        self.passed[seat]
    }

    /// Have both seats passed (round is over)?
    #[must_use]
    pub fn both_passed(&self) -> bool {
        self.passed[Seat::A] && self.passed[Seat::B]
    }

    /// Current round number.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Round-win tally for a seat.
    #[must_use]
    pub fn round_wins(&self, seat: Seat) -> u8 {
        self.round_wins[seat]
    }

    /// Seat that opened the current round.
    #[must_use]
    pub fn round_starter(&self) -> Seat {
        self.round_starter
    }

    /// Terminal result, once ended.
    #[must_use]
    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// Has the match ended?
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.result.is_some()
    }

    // === Transitions ===

    /// Record a pass for `seat`.
    ///
    /// Flips the turn to the opponent unless the opponent has already
    /// passed. The caller validates turn ownership and liveness first.
    pub fn record_pass(&mut self, seat: Seat) {
        self.passed[seat] = true;
        if !self.passed[seat.opponent()] {
            self.current_owner = seat.opponent();
        }
    }

    /// Record a turn-ending play by `seat`.
    ///
    /// A play never sets the pass flag; it only hands the turn over when
    /// the opponent is still in the round.
    pub fn record_turn_ending_play(&mut self, seat: Seat) {
        if !self.passed[seat.opponent()] {
            self.current_owner = seat.opponent();
        }
    }

    /// Resolve the current round from final board totals.
    ///
    /// Higher total wins; a tie credits no one. Ends the match when a seat
    /// reaches `rounds_to_win`. The caller starts the next round
    /// afterwards (if the match continues) via `start_next_round`.
    pub fn resolve_round(&mut self, totals: [i32; 2], rounds_to_win: u8) -> RoundOutcome {
        let winner = match totals[0].cmp(&totals[1]) {
            std::cmp::Ordering::Greater => Some(Seat::A),
            std::cmp::Ordering::Less => Some(Seat::B),
            std::cmp::Ordering::Equal => None,
        };

        if let Some(seat) = winner {
            self.round_wins[seat] += 1;
            if self.round_wins[seat] >= rounds_to_win {
                self.result = Some(MatchResult::Winner(seat));
            }
        }

        RoundOutcome {
            round: self.round,
            winner,
            totals,
            match_result: self.result,
        }
    }

    /// Begin the next round.
    ///
    /// The previous round's loser acts first; on a tie, the seat that did
    /// not start the previous round does.
    pub fn start_next_round(&mut self, previous_winner: Option<Seat>) {
        let starter = match previous_winner {
            Some(winner) => winner.opponent(),
            None => self.round_starter.opponent(),
        };

        self.round += 1;
        self.passed = SeatMap::with_value(false);
        self.round_starter = starter;
        self.current_owner = starter;
    }

    /// Immediately end the match, bypassing round resolution.
    ///
    /// Idempotent: calling it on an ended match changes nothing and
    /// returns `false`.
    pub fn force_end(&mut self, result: MatchResult) -> bool {
        if self.result.is_some() {
            return false;
        }
        self.result = Some(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_flips_owner() {
        let mut turn = TurnState::new(Seat::A);

        turn.record_pass(Seat::A);

        assert!(turn.has_passed(Seat::A));
        assert_eq!(turn.current_owner(), Seat::B);
        assert!(!turn.both_passed());
    }

    #[test]
    fn test_pass_keeps_owner_when_opponent_already_passed() {
        let mut turn = TurnState::new(Seat::A);
        turn.record_pass(Seat::A);

        // B keeps acting after A passed.
        turn.record_turn_ending_play(Seat::B);
        assert_eq!(turn.current_owner(), Seat::B);

        turn.record_pass(Seat::B);
        assert!(turn.both_passed());
    }

    #[test]
    fn test_resolve_round_credits_winner() {
        let mut turn = TurnState::new(Seat::A);

        let outcome = turn.resolve_round([15, 12], 2);

        assert_eq!(outcome.winner, Some(Seat::A));
        assert_eq!(turn.round_wins(Seat::A), 1);
        assert_eq!(turn.round_wins(Seat::B), 0);
        assert_eq!(outcome.match_result, None);
    }

    #[test]
    fn test_resolve_round_tie_credits_no_one() {
        let mut turn = TurnState::new(Seat::A);

        let outcome = turn.resolve_round([10, 10], 2);

        assert_eq!(outcome.winner, None);
        assert_eq!(turn.round_wins(Seat::A), 0);
        assert_eq!(turn.round_wins(Seat::B), 0);
    }

    #[test]
    fn test_match_ends_at_threshold() {
        let mut turn = TurnState::new(Seat::A);

        turn.resolve_round([5, 1], 2);
        turn.start_next_round(Some(Seat::A));
        let outcome = turn.resolve_round([8, 2], 2);

        assert_eq!(outcome.match_result, Some(MatchResult::Winner(Seat::A)));
        assert!(turn.is_ended());
    }

    #[test]
    fn test_loser_starts_next_round() {
        let mut turn = TurnState::new(Seat::A);
        turn.record_pass(Seat::A);
        turn.record_pass(Seat::B);
        turn.resolve_round([3, 9], 2);

        turn.start_next_round(Some(Seat::B));

        assert_eq!(turn.round(), 2);
        assert_eq!(turn.current_owner(), Seat::A);
        assert_eq!(turn.round_starter(), Seat::A);
        assert!(!turn.has_passed(Seat::A));
        assert!(!turn.has_passed(Seat::B));
    }

    #[test]
    fn test_tie_alternates_starter() {
        let mut turn = TurnState::new(Seat::A);
        turn.resolve_round([4, 4], 2);

        turn.start_next_round(None);

        // A started round 1, so B opens round 2 after a tie.
        assert_eq!(turn.current_owner(), Seat::B);
    }

    #[test]
    fn test_force_end_is_idempotent() {
        let mut turn = TurnState::new(Seat::A);

        assert!(turn.force_end(MatchResult::Winner(Seat::B)));
        assert!(!turn.force_end(MatchResult::Winner(Seat::A)));

        assert_eq!(turn.result(), Some(MatchResult::Winner(Seat::B)));
    }
}
