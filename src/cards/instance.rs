//! Card instances - one dealt copy of a definition.
//!
//! A `CardInstance` pairs an `InstanceId` with the `CardId` it was dealt
//! from. Where the copy currently lives (hand, lane, deck, discard) is
//! tracked exclusively by the owning board's `ZoneMap`; power deltas and
//! buffs live in the seat's `PowerLedger`. Keeping the instance itself
//! immutable makes duplicate-action detection and snapshots trivial.

use serde::{Deserialize, Serialize};

use super::definition::CardId;
use crate::core::InstanceId;

/// One dealt copy of a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique id of this copy within the session.
    pub id: InstanceId,

    /// The definition this copy was dealt from.
    pub card_id: CardId,
}

impl CardInstance {
    /// Create a card instance.
    #[must_use]
    pub const fn new(id: InstanceId, card_id: CardId) -> Self {
        Self { id, card_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_identity() {
        let a = CardInstance::new(InstanceId::new(1), CardId::new(10));
        let b = CardInstance::new(InstanceId::new(2), CardId::new(10));

        // Same definition, distinct copies.
        assert_eq!(a.card_id, b.card_id);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_instance_serialization() {
        let card = CardInstance::new(InstanceId::new(4), CardId::new(2));
        let json = serde_json::to_string(&card).unwrap();
        let back: CardInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(card, back);
    }
}
