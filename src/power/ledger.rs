//! Modifier ledger and effective power resolution.
//!
//! Each seat owns one `PowerLedger`: a map of per-instance power deltas
//! (permanent modifiers) plus per-instance buff stacks (possibly expiring).
//! `effective_power` is a pure function over these — safe to call
//! repeatedly for rendering, queries, and AI evaluation.
//!
//! Entries for cards no longer on a lane are semantic garbage: they
//! contribute nothing anyone can observe and exist only until the next
//! compaction sweep prunes them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::buff::Buff;
use crate::core::InstanceId;

/// Per-seat modifier ledger and buff store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerLedger {
    /// Permanent power deltas by card instance.
    deltas: FxHashMap<InstanceId, i32>,

    /// Buff stacks by card instance.
    buffs: FxHashMap<InstanceId, SmallVec<[Buff; 2]>>,
}

impl PowerLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a permanent power delta for a card.
    pub fn add_delta(&mut self, card: InstanceId, delta: i32) {
        *self.deltas.entry(card).or_insert(0) += delta;
    }

    /// The accumulated permanent delta for a card (zero if absent).
    #[must_use]
    pub fn delta(&self, card: InstanceId) -> i32 {
        self.deltas.get(&card).copied().unwrap_or(0)
    }

    /// Attach a buff to a card. Buffs stack.
    pub fn add_buff(&mut self, card: InstanceId, buff: Buff) {
        self.buffs.entry(card).or_default().push(buff);
    }

    /// Buffs currently attached to a card (including expired ones).
    #[must_use]
    pub fn buffs(&self, card: InstanceId) -> &[Buff] {
        self.buffs.get(&card).map_or(&[], |stack| stack.as_slice())
    }

    /// Effective power of a card under this ledger.
    ///
    /// `base + permanent delta + sum of buffs active in current_round`.
    /// Pure; may go negative — any clamp policy belongs to lane scoring.
    #[must_use]
    pub fn effective_power(&self, card: InstanceId, base: i32, current_round: u32) -> i32 {
        let buff_sum: i32 = self
            .buffs(card)
            .iter()
            .filter(|buff| buff.is_active(current_round))
            .map(|buff| buff.delta)
            .sum();

        base + self.delta(card) + buff_sum
    }

    /// Drop buffs that can no longer contribute in `current_round`.
    ///
    /// Removing an expired buff never changes any effective-power query.
    pub fn expire_buffs(&mut self, current_round: u32) {
        for stack in self.buffs.values_mut() {
            stack.retain(|buff| buff.is_active(current_round));
        }
        self.buffs.retain(|_, stack| !stack.is_empty());
    }

    /// Prune entries for cards not in `live`, returning how many were cut.
    ///
    /// Optimization only: pruned entries belonged to cards off every lane,
    /// whose deltas and buffs no query can observe.
    pub fn prune_stale(&mut self, live: &dyn Fn(InstanceId) -> bool) -> usize {
        let before = self.deltas.len() + self.buffs.len();
        self.deltas.retain(|&card, _| live(card));
        self.buffs.retain(|&card, _| live(card));
        before - (self.deltas.len() + self.buffs.len())
    }

    /// Number of tracked entries (deltas plus buff stacks).
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.deltas.len() + self.buffs.len()
    }
}
