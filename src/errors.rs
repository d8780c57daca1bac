//! Typed error taxonomy.
//!
//! Expected rule violations are values, not panics: every action returns a
//! `Result` and an illegal action performs no mutation. Nothing in this
//! crate aborts the host process.

use thiserror::Error;

use crate::core::{LaneKind, ParticipantId, Seat};

/// Rejection of a player or AI action.
///
/// Surfaced to the acting participant only; the session state is untouched
/// when one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The acting seat does not currently own the turn.
    #[error("{0} acted out of turn")]
    NotYourTurn(Seat),

    /// The card is not in the zone the action requires (e.g. not in hand).
    #[error("card is not in a playable zone")]
    InvalidZone,

    /// The card's type cannot legally occupy the target lane.
    #[error("card type cannot be played to the {0} lane")]
    WrongLaneForType(LaneKind),

    /// The seat's leader ability was already consumed this match.
    #[error("{0} already used their leader ability")]
    LeaderAlreadyUsed(Seat),

    /// The seat exhausted its mulligan allowance or the match has begun.
    #[error("mulligan allowance exhausted for {0}")]
    MulliganExhausted(Seat),

    /// The match already ended; fresh actions are rejected.
    ///
    /// Lifecycle cleanup paths treat the same condition as an idempotent
    /// no-op instead.
    #[error("match has already ended")]
    AlreadyEnded,
}

/// Failure from the session registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No active session is keyed by this participant.
    #[error("no active session for {0}")]
    SessionNotFound(ParticipantId),

    /// The participant is already keyed to a live session.
    #[error("{0} is already in an active session")]
    AlreadyInSession(ParticipantId),
}
