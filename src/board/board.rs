//! Per-participant battlefield state and zone operations.
//!
//! A `Board` owns one participant's cards: an ordered hand, the three
//! lanes (play order preserved for tie-breaking and targeting), the deck
//! (draw pile, top = end of vec), and the discard pile. All movement goes
//! through methods that keep the `ZoneMap` in sync, so zone membership
//! stays exclusive no matter which path mutated it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::zone::{Zone, ZoneMap};
use crate::cards::{CardInstance, CardRegistry};
use crate::core::{DuelRng, InstanceId, LaneKind};
use crate::errors::ActionError;
use crate::power::PowerLedger;

/// Ordered cards in one lane.
pub type LaneCards = SmallVec<[InstanceId; 8]>;

/// One participant's full battlefield state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Card copies dealt to this board, by instance id.
    cards: FxHashMap<InstanceId, CardInstance>,

    /// Exclusive zone membership.
    zones: ZoneMap,

    /// Hand, in draw order.
    hand: Vec<InstanceId>,

    /// The three lanes, indexed by `LaneKind::index()`, in play order.
    lanes: [LaneCards; 3],

    /// Draw pile; top of the deck is the end of the vec.
    deck: Vec<InstanceId>,

    /// Discard pile, oldest first.
    discard: Vec<InstanceId>,
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Setup ===

    /// Deal a card copy into the deck (placed on top).
    ///
    /// Idempotent: a card instance already on this board is not re-added.
    pub fn deal_to_deck(&mut self, card: CardInstance) -> bool {
        if !self.zones.insert(card.id, Zone::Deck) {
            return false;
        }
        self.cards.insert(card.id, card);
        self.deck.push(card.id);
        true
    }

    /// Shuffle the deck.
    pub fn shuffle_deck(&mut self, rng: &mut DuelRng) {
        rng.shuffle(&mut self.deck);
    }

    // === Queries ===

    /// The card instance for an id, if dealt to this board.
    #[must_use]
    pub fn card(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    /// The zone a card is in.
    #[must_use]
    pub fn zone_of(&self, id: InstanceId) -> Option<Zone> {
        self.zones.zone_of(id)
    }

    /// Hand contents in order.
    #[must_use]
    pub fn hand(&self) -> &[InstanceId] {
        &self.hand
    }

    /// Lane contents in play order.
    #[must_use]
    pub fn lane(&self, lane: LaneKind) -> &[InstanceId] {
        &self.lanes[lane.index()]
    }

    /// Deck size.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    /// Discard pile contents, oldest first.
    #[must_use]
    pub fn discard_pile(&self) -> &[InstanceId] {
        &self.discard
    }

    /// Is a card currently on any lane of this board?
    #[must_use]
    pub fn is_on_lane(&self, id: InstanceId) -> bool {
        self.zones.is_on_lane(id)
    }

    /// Total cards tracked across all zones.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.zones.len()
    }

    /// Ids of every card instance dealt to this board, in no order.
    pub fn instance_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.cards.keys().copied()
    }

    // === Scoring ===

    /// Sum of effective power over one lane.
    #[must_use]
    pub fn lane_total(
        &self,
        lane: LaneKind,
        registry: &CardRegistry,
        ledger: &PowerLedger,
        current_round: u32,
        clamp: bool,
    ) -> i32 {
        let total: i32 = self
            .lane(lane)
            .iter()
            .map(|&id| {
                let base = self.card(id).map_or(0, |c| registry.base_power(c.card_id));
                ledger.effective_power(id, base, current_round)
            })
            .sum();

        if clamp {
            total.max(0)
        } else {
            total
        }
    }

    /// Sum of lane totals over the whole board.
    #[must_use]
    pub fn board_total(
        &self,
        registry: &CardRegistry,
        ledger: &PowerLedger,
        current_round: u32,
        clamp: bool,
    ) -> i32 {
        LaneKind::ALL
            .iter()
            .map(|&lane| self.lane_total(lane, registry, ledger, current_round, clamp))
            .sum()
    }

    // === Moves ===

    /// Play a card from hand to a lane.
    ///
    /// Fails with `InvalidZone` if the card is not in this hand, and with
    /// `WrongLaneForType` if the card's type may not occupy the lane.
    /// On failure nothing moves.
    pub fn play_card(
        &mut self,
        id: InstanceId,
        lane: LaneKind,
        registry: &CardRegistry,
    ) -> Result<(), ActionError> {
        if !self.zones.is_in(id, Zone::Hand) {
            return Err(ActionError::InvalidZone);
        }
        let card = self.cards.get(&id).ok_or(ActionError::InvalidZone)?;
        if !registry.may_occupy(card.card_id, lane) {
            return Err(ActionError::WrongLaneForType(lane));
        }

        self.hand.retain(|&c| c != id);
        self.lanes[lane.index()].push(id);
        self.zones.relocate(id, Zone::Lane(lane));
        Ok(())
    }

    /// Draw the top card of the deck into the hand.
    ///
    /// An empty deck first reshuffles the discard pile back in; if there
    /// is still nothing to draw, returns `None` — the hand simply does
    /// not grow. Never an error.
    pub fn draw(&mut self, rng: &mut DuelRng) -> Option<InstanceId> {
        if self.deck.is_empty() && !self.discard.is_empty() {
            self.reshuffle_discard_into_deck(rng);
        }

        let id = self.deck.pop()?;
        self.zones.relocate(id, Zone::Hand);
        self.hand.push(id);
        Some(id)
    }

    /// Move a card from any zone to the discard pile.
    ///
    /// No-op for cards not on this board or already discarded.
    pub fn move_to_discard(&mut self, id: InstanceId) {
        match self.zones.zone_of(id) {
            None | Some(Zone::Discard) => return,
            Some(Zone::Hand) => self.hand.retain(|&c| c != id),
            Some(Zone::Deck) => self.deck.retain(|&c| c != id),
            Some(Zone::Lane(lane)) => self.lanes[lane.index()].retain(|c| *c != id),
        }
        self.zones.relocate(id, Zone::Discard);
        self.discard.push(id);
    }

    /// Return a card from the hand to the deck (bottom), e.g. for mulligan.
    ///
    /// Fails with `InvalidZone` if the card is not in hand.
    pub fn return_to_deck(&mut self, id: InstanceId) -> Result<(), ActionError> {
        if !self.zones.is_in(id, Zone::Hand) {
            return Err(ActionError::InvalidZone);
        }
        self.hand.retain(|&c| c != id);
        self.deck.insert(0, id);
        self.zones.relocate(id, Zone::Deck);
        Ok(())
    }

    /// Sweep every lane into the discard pile (between rounds).
    ///
    /// Returns the swept card ids.
    pub fn clear_lanes(&mut self) -> Vec<InstanceId> {
        let mut swept = Vec::new();
        for lane in LaneKind::ALL {
            let cards: Vec<InstanceId> = std::mem::take(&mut self.lanes[lane.index()]).into_vec();
            for id in cards {
                self.zones.relocate(id, Zone::Discard);
                self.discard.push(id);
                swept.push(id);
            }
        }
        swept
    }

    /// Trim the discard pile to `cap` cards, dropping the oldest first.
    ///
    /// Evicted instances are removed from the board entirely (an explicit
    /// removal effect, exempt from card conservation).
    pub fn trim_discard(&mut self, cap: usize) -> usize {
        if self.discard.len() <= cap {
            return 0;
        }
        let excess = self.discard.len() - cap;
        for id in self.discard.drain(..excess).collect::<Vec<_>>() {
            self.zones.remove(id);
            self.cards.remove(&id);
        }
        excess
    }

    fn reshuffle_discard_into_deck(&mut self, rng: &mut DuelRng) {
        for id in self.discard.drain(..) {
            self.zones.relocate(id, Zone::Deck);
            self.deck.push(id);
        }
        rng.shuffle(&mut self.deck);
    }
}
