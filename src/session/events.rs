//! State-change notifications and the replay log.
//!
//! The session appends a `StateChange` for everything that alters
//! observable state; the presentation layer drains them and decides how to
//! render. Notifications say what changed, never how to draw it.
//!
//! `ActionRecord` is the replay-log entry: one per accepted action, capped
//! by the compaction sweep.

use serde::{Deserialize, Serialize};

use super::turn::MatchResult;
use crate::cards::CardId;
use crate::core::{InstanceId, LaneKind, LeaderEffect, Seat};

/// An observable state change, emitted for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// A card left a hand for a lane.
    CardPlayed {
        seat: Seat,
        card: InstanceId,
        lane: LaneKind,
    },
    /// A card was revealed to the opponent.
    CardRevealed { seat: Seat, card: CardId },
    /// A seat drew a card (contents stay hidden).
    CardDrawn { seat: Seat },
    /// A seat swapped an opening-hand card back into the deck.
    CardMulliganed { seat: Seat },
    /// A seat passed; `auto` marks timer-synthesized passes.
    Passed { seat: Seat, auto: bool },
    /// A seat consumed its leader ability.
    LeaderUsed { seat: Seat, effect: LeaderEffect },
    /// The turn moved to a new owner.
    TurnChanged { owner: Seat },
    /// A round resolved.
    RoundEnded {
        round: u32,
        winner: Option<Seat>,
        totals: [i32; 2],
    },
    /// A new round began.
    RoundStarted { round: u32, starter: Seat },
    /// The match ended.
    MatchEnded { result: MatchResult },
}

/// What a replayable action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Play { card: InstanceId, lane: LaneKind },
    Pass { auto: bool },
    Leader,
    Mulligan { card: InstanceId },
    ForceEnd,
}

/// One replay-log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The seat that acted.
    pub seat: Seat,

    /// What the action did.
    pub kind: ActionKind,

    /// Round the action was taken in.
    pub round: u32,

    /// Sequence number within the match (for ordering).
    pub sequence: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let record = ActionRecord {
            seat: Seat::A,
            kind: ActionKind::Play {
                card: InstanceId::new(3),
                lane: LaneKind::Ranged,
            },
            round: 2,
            sequence: 17,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ActionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, back);
    }
}
