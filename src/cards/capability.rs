//! Per-type capability table.
//!
//! Card types map to a small set of capabilities resolved once at
//! registration: which lanes the type may occupy, whether playing it ends
//! the turn, and whether the play is revealed to the opponent. Call sites
//! look capabilities up instead of switching over type enums, so new card
//! types need a registration, not engine edits.

use serde::{Deserialize, Serialize};

use super::definition::CardTypeId;
use crate::core::LaneSet;

/// Capabilities of one card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCapability {
    /// Lanes this type may legally be played to.
    pub legal_lanes: LaneSet,

    /// Does playing a card of this type end the acting seat's turn?
    pub ends_turn: bool,

    /// Is the card revealed to the opponent when played?
    pub revealed_on_play: bool,
}

impl TypeCapability {
    /// A creature-like capability: unit lanes, ends the turn, revealed.
    #[must_use]
    pub fn unit(legal_lanes: LaneSet) -> Self {
        Self {
            legal_lanes,
            ends_turn: true,
            revealed_on_play: true,
        }
    }

    /// Override the turn-ending rule.
    #[must_use]
    pub fn with_ends_turn(mut self, ends_turn: bool) -> Self {
        self.ends_turn = ends_turn;
        self
    }

    /// Override reveal-on-play.
    #[must_use]
    pub fn with_revealed(mut self, revealed: bool) -> Self {
        self.revealed_on_play = revealed;
        self
    }
}

/// Capability lookup by card type.
///
/// Backed by a dense vec indexed by `CardTypeId` since type ids are
/// allocated sequentially at registration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CapabilityTable {
    entries: Vec<Option<TypeCapability>>,
}

impl CapabilityTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the capability for a card type.
    ///
    /// Re-registering a type replaces its capability.
    pub fn register(&mut self, card_type: CardTypeId, capability: TypeCapability) {
        let idx = card_type.raw() as usize;
        if idx >= self.entries.len() {
            self.entries.resize(idx + 1, None);
        }
        self.entries[idx] = Some(capability);
    }

    /// Look up the capability for a card type.
    #[must_use]
    pub fn get(&self, card_type: CardTypeId) -> Option<&TypeCapability> {
        self.entries.get(card_type.raw() as usize)?.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LaneKind;

    #[test]
    fn test_register_and_lookup() {
        let mut table = CapabilityTable::new();
        let creature = CardTypeId::new(0);

        table.register(
            creature,
            TypeCapability::unit(LaneSet::only(LaneKind::Melee).with(LaneKind::Ranged)),
        );

        let cap = table.get(creature).unwrap();
        assert!(cap.legal_lanes.contains(LaneKind::Melee));
        assert!(!cap.legal_lanes.contains(LaneKind::Siege));
        assert!(cap.ends_turn);
    }

    #[test]
    fn test_unknown_type_has_no_capability() {
        let table = CapabilityTable::new();
        assert!(table.get(CardTypeId::new(5)).is_none());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut table = CapabilityTable::new();
        let spell = CardTypeId::new(1);

        table.register(spell, TypeCapability::unit(LaneSet::all()));
        table.register(
            spell,
            TypeCapability::unit(LaneSet::all()).with_ends_turn(false),
        );

        assert!(!table.get(spell).unwrap().ends_turn);
    }
}
