//! Zone membership tracking.
//!
//! Every card instance on a board lives in exactly one zone at a time.
//! `ZoneMap` is the single source of truth for membership: the board's
//! ordered lists (hand, lanes, deck, discard) are views that must agree
//! with it, and inserts are idempotent so a double-processed action message
//! can never duplicate a card across zones.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{InstanceId, LaneKind};

/// Where a card instance currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Hand,
    Lane(LaneKind),
    Deck,
    Discard,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Hand => write!(f, "Hand"),
            Zone::Lane(lane) => write!(f, "{} lane", lane),
            Zone::Deck => write!(f, "Deck"),
            Zone::Discard => write!(f, "Discard"),
        }
    }
}

/// Exclusive zone membership for one board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMap {
    locations: FxHashMap<InstanceId, Zone>,
}

impl ZoneMap {
    /// Create an empty zone map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card into a zone.
    ///
    /// Idempotent: returns `false` (and changes nothing) if the card is
    /// already tracked anywhere on this board.
    pub fn insert(&mut self, card: InstanceId, zone: Zone) -> bool {
        if self.locations.contains_key(&card) {
            return false;
        }
        self.locations.insert(card, zone);
        true
    }

    /// Move a card to another zone.
    ///
    /// Returns the old zone, or `None` if the card is not tracked.
    pub fn relocate(&mut self, card: InstanceId, zone: Zone) -> Option<Zone> {
        let slot = self.locations.get_mut(&card)?;
        let old = *slot;
        *slot = zone;
        Some(old)
    }

    /// Remove a card from the board entirely.
    ///
    /// Returns the zone it was in, or `None` if not tracked.
    pub fn remove(&mut self, card: InstanceId) -> Option<Zone> {
        self.locations.remove(&card)
    }

    /// The zone a card is in.
    #[must_use]
    pub fn zone_of(&self, card: InstanceId) -> Option<Zone> {
        self.locations.get(&card).copied()
    }

    /// Check membership in a specific zone.
    #[must_use]
    pub fn is_in(&self, card: InstanceId, zone: Zone) -> bool {
        self.zone_of(card) == Some(zone)
    }

    /// Check if a card is on any lane.
    #[must_use]
    pub fn is_on_lane(&self, card: InstanceId) -> bool {
        matches!(self.zone_of(card), Some(Zone::Lane(_)))
    }

    /// Total tracked cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Check if no cards are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
