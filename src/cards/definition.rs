//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card type: base
//! power, rarity, faction, cost. Instance-specific data (zone, buffs,
//! modifier deltas) lives in the owning board and ledger, never here, so a
//! definition can back any number of instances.

use serde::{Deserialize, Serialize};

use crate::core::{FactionId, Rarity};

/// Unique identifier for a card definition.
///
/// This identifies the "type" of card (e.g. "Siege Tower"), not a specific
/// copy in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card type identifier - games define their own types.
///
/// The engine doesn't interpret these beyond the capability table; games
/// define what types exist (Creature, Spell, Special, ...) and register
/// their capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardTypeId(pub u32);

impl CardTypeId {
    /// Create a new card type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use lane_duel::cards::{CardDefinition, CardId, CardTypeId};
/// use lane_duel::core::{FactionId, Rarity};
///
/// let tower = CardDefinition::new(CardId::new(1), "Siege Tower", CardTypeId::new(0), 6)
///     .with_rarity(Rarity::Rare)
///     .with_faction(FactionId::new(2))
///     .with_cost(4);
///
/// assert_eq!(tower.base_power, 6);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Card type (capability lookup key).
    pub card_type: CardTypeId,

    /// Printed power before modifiers and buffs.
    pub base_power: i32,

    /// Rarity tier.
    pub rarity: Rarity,

    /// Owning faction.
    pub faction: FactionId,

    /// Deck-building cost.
    pub cost: u16,
}

impl CardDefinition {
    /// Create a new card definition with default rarity/faction/cost.
    #[must_use]
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        card_type: CardTypeId,
        base_power: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            base_power,
            rarity: Rarity::Common,
            faction: FactionId::new(0),
            cost: 0,
        }
    }

    /// Set the rarity.
    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Set the faction.
    #[must_use]
    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = faction;
        self
    }

    /// Set the deck-building cost.
    #[must_use]
    pub fn with_cost(mut self, cost: u16) -> Self {
        self.cost = cost;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = CardDefinition::new(CardId::new(3), "Scout", CardTypeId::new(0), 2)
            .with_rarity(Rarity::Epic)
            .with_cost(5);

        assert_eq!(def.id, CardId::new(3));
        assert_eq!(def.name, "Scout");
        assert_eq!(def.base_power, 2);
        assert_eq!(def.rarity, Rarity::Epic);
        assert_eq!(def.cost, 5);
    }

    #[test]
    fn test_definition_serialization() {
        let def = CardDefinition::new(CardId::new(1), "Ballista", CardTypeId::new(1), 8);

        let json = serde_json::to_string(&def).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();

        assert_eq!(def, back);
    }
}
