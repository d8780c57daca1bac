//! Engine configuration types.
//!
//! The engine carries no global state: every knob — round win threshold,
//! turn budget, stale timeout, compaction caps — lives in a `RulesConfig`
//! value handed to the session and registry at construction. Hosts tune
//! these per game mode instead of patching the engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One of the three battlefield rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneKind {
    Melee,
    Ranged,
    Siege,
}

impl LaneKind {
    /// All lanes in display order.
    pub const ALL: [LaneKind; 3] = [LaneKind::Melee, LaneKind::Ranged, LaneKind::Siege];

    /// Lane index (Melee = 0, Ranged = 1, Siege = 2) for array storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            LaneKind::Melee => 0,
            LaneKind::Ranged => 1,
            LaneKind::Siege => 2,
        }
    }
}

impl std::fmt::Display for LaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaneKind::Melee => write!(f, "Melee"),
            LaneKind::Ranged => write!(f, "Ranged"),
            LaneKind::Siege => write!(f, "Siege"),
        }
    }
}

/// Set of lanes, stored as a three-bit mask.
///
/// Used by the capability table to express where a card type may legally
/// be played without hard-coding a type-to-lane mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneSet(u8);

impl LaneSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All three lanes.
    #[must_use]
    pub const fn all() -> Self {
        Self(0b111)
    }

    /// A set containing a single lane.
    #[must_use]
    pub const fn only(lane: LaneKind) -> Self {
        Self(1 << lane.index())
    }

    /// Add a lane to the set.
    #[must_use]
    pub const fn with(self, lane: LaneKind) -> Self {
        Self(self.0 | (1 << lane.index()))
    }

    /// Check lane membership.
    #[must_use]
    pub const fn contains(self, lane: LaneKind) -> bool {
        self.0 & (1 << lane.index()) != 0
    }

    /// Check if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Card rarity tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Faction identifier. Games define what factions exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u16);

impl FactionId {
    /// Create a new faction ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// Effect applied when a participant uses their leader ability.
///
/// Card content is host data, so leader abilities are configured as one of
/// a small set of engine-level effects rather than a content system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderEffect {
    /// No effect beyond consuming the leader charge.
    #[default]
    None,
    /// Draw up to N cards.
    Draw(u8),
    /// Add a round-scoped power delta to every own card in a lane.
    BoostLane { lane: LaneKind, delta: i32 },
}

/// Caps applied by the periodic memory-compaction sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionCaps {
    /// Maximum retained replay-log entries (oldest evicted first).
    pub replay_log: usize,
    /// Maximum retained revealed-card history entries.
    pub revealed_history: usize,
    /// Maximum cards kept in each discard pile.
    pub discard_pile: usize,
}

impl Default for CompactionCaps {
    fn default() -> Self {
        Self {
            replay_log: 256,
            revealed_history: 64,
            discard_pile: 64,
        }
    }
}

/// Rules and lifecycle configuration for a match session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Round wins required to take the match (best-of-three: 2).
    pub rounds_to_win: u8,

    /// Opening hand size dealt before round 1.
    pub starting_hand_size: usize,

    /// Maximum opening-hand cards a participant may mulligan.
    pub mulligan_limit: u8,

    /// Clamp negative lane totals to zero when scoring a round.
    ///
    /// `effective_power` itself never clamps; this applies only at
    /// lane-total scoring.
    pub clamp_lane_totals: bool,

    /// Per-turn time budget before the timer controller auto-passes.
    pub turn_budget: Duration,

    /// Inactivity span after which a session is reaped.
    pub stale_timeout: Duration,

    /// How long a disconnected participant's session stays restorable.
    pub reconnect_window: Duration,

    /// Minimum delay between scripted-opponent turn computations.
    pub ai_min_delay: Duration,

    /// Memory-compaction caps.
    pub caps: CompactionCaps,

    /// Leader abilities per seat, in seat order (A, B).
    pub leader_effects: [LeaderEffect; 2],
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rounds_to_win: 2,
            starting_hand_size: 10,
            mulligan_limit: 2,
            clamp_lane_totals: false,
            turn_budget: Duration::from_secs(75),
            stale_timeout: Duration::from_secs(30 * 60),
            reconnect_window: Duration::from_secs(10 * 60),
            ai_min_delay: Duration::from_secs(2),
            caps: CompactionCaps::default(),
            leader_effects: [LeaderEffect::None, LeaderEffect::None],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_set_membership() {
        let set = LaneSet::only(LaneKind::Melee).with(LaneKind::Ranged);

        assert!(set.contains(LaneKind::Melee));
        assert!(set.contains(LaneKind::Ranged));
        assert!(!set.contains(LaneKind::Siege));
    }

    #[test]
    fn test_lane_set_all_and_empty() {
        assert!(LaneSet::empty().is_empty());
        for lane in LaneKind::ALL {
            assert!(LaneSet::all().contains(lane));
            assert!(!LaneSet::empty().contains(lane));
        }
    }

    #[test]
    fn test_default_config_is_best_of_three() {
        let config = RulesConfig::default();

        assert_eq!(config.rounds_to_win, 2);
        assert!(config.stale_timeout > config.turn_budget);
    }
}
