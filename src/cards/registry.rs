//! Card registry: definition and capability lookup.
//!
//! The `CardRegistry` stores all card definitions for a game together with
//! the per-type capability table. Sessions borrow it read-only; the host
//! builds it once at startup.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::capability::{CapabilityTable, TypeCapability};
use super::definition::{CardDefinition, CardId, CardTypeId};
use crate::core::{LaneKind, LaneSet};

/// Registry of card definitions and type capabilities.
///
/// ## Example
///
/// ```
/// use lane_duel::cards::{CardRegistry, CardDefinition, CardId, CardTypeId, TypeCapability};
/// use lane_duel::core::{LaneKind, LaneSet};
///
/// let mut registry = CardRegistry::new();
/// let creature = registry.register_type(TypeCapability::unit(LaneSet::only(LaneKind::Melee)));
///
/// registry.register(CardDefinition::new(CardId::new(1), "Footman", creature, 3));
///
/// assert_eq!(registry.get(CardId::new(1)).unwrap().name, "Footman");
/// assert!(registry.legal_lanes(CardId::new(1)).contains(LaneKind::Melee));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    capabilities: CapabilityTable,
    next_type_id: u32,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card type with its capability, returning the assigned id.
    pub fn register_type(&mut self, capability: TypeCapability) -> CardTypeId {
        let id = CardTypeId::new(self.next_type_id);
        self.next_type_id += 1;
        self.capabilities.register(id, capability);
        id
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists; duplicate
    /// registration is a host setup bug, not a runtime condition.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.cards.insert(card.id, card);
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Base power of a card, zero for unknown ids.
    #[must_use]
    pub fn base_power(&self, id: CardId) -> i32 {
        self.cards.get(&id).map_or(0, |def| def.base_power)
    }

    /// Capability of a card's type, if registered.
    #[must_use]
    pub fn capability(&self, id: CardId) -> Option<&TypeCapability> {
        let def = self.cards.get(&id)?;
        self.capabilities.get(def.card_type)
    }

    /// Lanes a card may legally be played to.
    ///
    /// Unknown cards and unregistered types can go nowhere.
    #[must_use]
    pub fn legal_lanes(&self, id: CardId) -> LaneSet {
        self.capability(id)
            .map_or(LaneSet::empty(), |cap| cap.legal_lanes)
    }

    /// Whether playing this card ends the acting seat's turn.
    #[must_use]
    pub fn play_ends_turn(&self, id: CardId) -> bool {
        self.capability(id).map_or(true, |cap| cap.ends_turn)
    }

    /// Whether playing this card reveals it to the opponent.
    #[must_use]
    pub fn revealed_on_play(&self, id: CardId) -> bool {
        self.capability(id).map_or(true, |cap| cap.revealed_on_play)
    }

    /// Check lane legality for one card and lane.
    #[must_use]
    pub fn may_occupy(&self, id: CardId, lane: LaneKind) -> bool {
        self.legal_lanes(id).contains(lane)
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}
