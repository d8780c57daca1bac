//! Buffs: possibly-expiring power effects attached to a card instance.
//!
//! ## Timebase
//!
//! Buff expiry is measured on the round counter, not wall clock: a buff
//! with `expires_after_round: Some(1)` contributes through round 1 and is
//! dead from round 2 onward. Wall-clock time in this engine is used only
//! for turn/staleness timers, never for game effects.

use serde::{Deserialize, Serialize};

/// A power delta on a card instance, optionally round-scoped.
///
/// Multiple buffs stack on one card. Expired buffs contribute nothing and
/// are eligible for removal by the compaction sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    /// Power delta while active.
    pub delta: i32,

    /// Last round (inclusive) this buff is active; `None` = whole match.
    pub expires_after_round: Option<u32>,

    /// Round the buff was granted in, kept for replay/debugging.
    pub granted_round: u32,
}

impl Buff {
    /// A buff lasting for the rest of the match.
    #[must_use]
    pub const fn permanent(delta: i32, granted_round: u32) -> Self {
        Self {
            delta,
            expires_after_round: None,
            granted_round,
        }
    }

    /// A buff active through `last_round` only.
    #[must_use]
    pub const fn until_round(delta: i32, granted_round: u32, last_round: u32) -> Self {
        Self {
            delta,
            expires_after_round: Some(last_round),
            granted_round,
        }
    }

    /// Is this buff still contributing in `current_round`?
    #[must_use]
    pub fn is_active(&self, current_round: u32) -> bool {
        match self.expires_after_round {
            Some(last) => current_round <= last,
            None => true,
        }
    }
}
