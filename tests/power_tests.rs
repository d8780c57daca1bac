//! Effective-power resolution and ledger-hygiene properties.
//!
//! The interesting guarantees here are universally quantified, so the
//! heavy lifting is proptest: purity of `effective_power`, harmlessness
//! of expiry and pruning, and card conservation under arbitrary legal
//! action sequences.

use std::sync::Arc;
use std::time::Instant;

use proptest::prelude::*;

use lane_duel::cards::{CardDefinition, CardId, CardRegistry, TypeCapability};
use lane_duel::core::{InstanceId, LaneKind, LaneSet, ParticipantId, RulesConfig, Seat, SeatMap};
use lane_duel::power::{Buff, PowerLedger};
use lane_duel::session::{MatchSession, Participant, SessionSetup};

// =============================================================================
// Fixtures and strategies
// =============================================================================

fn any_buff() -> impl Strategy<Value = Buff> {
    (-20i32..=20, prop::option::of(1u32..6), 1u32..6)
        .prop_map(|(delta, expires, granted)| Buff {
            delta,
            expires_after_round: expires,
            granted_round: granted,
        })
}

fn ledger_from(entries: Vec<(u32, i32, Vec<Buff>)>) -> PowerLedger {
    let mut ledger = PowerLedger::new();
    for (card, delta, buffs) in entries {
        let id = InstanceId::new(card);
        ledger.add_delta(id, delta);
        for buff in buffs {
            ledger.add_buff(id, buff);
        }
    }
    ledger
}

fn battle_registry() -> Arc<CardRegistry> {
    let mut registry = CardRegistry::new();
    let creature = registry.register_type(TypeCapability::unit(
        LaneSet::only(LaneKind::Melee).with(LaneKind::Ranged),
    ));
    for id in 1..=8 {
        registry.register(CardDefinition::new(
            CardId::new(id),
            format!("Card {id}"),
            creature,
            id as i32,
        ));
    }
    Arc::new(registry)
}

fn battle_session(seed: u64) -> MatchSession {
    let setup = SessionSetup {
        participants: SeatMap::new(|seat| {
            Participant::human(ParticipantId::new(seat.index() as u64 + 1))
        }),
        decks: SeatMap::with_value((1..=8).map(CardId::new).collect()),
        seed,
        first_turn: Some(Seat::A),
    };
    let config = RulesConfig {
        starting_hand_size: 5,
        ..RulesConfig::default()
    };
    MatchSession::new(setup, battle_registry(), config, Instant::now())
}

/// One step of a random-but-legal driver: the current owner plays a
/// random hand card to a random legal lane, or passes.
fn apply_random_step(session: &mut MatchSession, choice: u8, now: Instant) {
    if session.is_ended() {
        return;
    }
    let seat = session.whose_turn();
    let hand = session.board(seat).hand().to_vec();

    if hand.is_empty() || choice % 4 == 0 {
        session.pass(seat, now).unwrap();
        return;
    }
    let card = hand[choice as usize % hand.len()];
    let lane = if choice % 2 == 0 {
        LaneKind::Melee
    } else {
        LaneKind::Ranged
    };
    session.play_card(seat, card, lane, now).unwrap();
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Identical ledger state and round always yield identical power.
    #[test]
    fn prop_effective_power_is_pure(
        entries in prop::collection::vec((0u32..10, -15i32..=15, prop::collection::vec(any_buff(), 0..4)), 0..8),
        card in 0u32..12,
        base in -10i32..=30,
        round in 1u32..8,
    ) {
        let ledger = ledger_from(entries);
        let id = InstanceId::new(card);

        prop_assert_eq!(
            ledger.effective_power(id, base, round),
            ledger.effective_power(id, base, round)
        );
    }

    /// Expiring dead buffs is invisible to every query at that round.
    #[test]
    fn prop_expiry_never_changes_observable_power(
        entries in prop::collection::vec((0u32..10, -15i32..=15, prop::collection::vec(any_buff(), 0..4)), 0..8),
        round in 1u32..8,
    ) {
        let mut ledger = ledger_from(entries);

        let before: Vec<i32> = (0..10)
            .map(|card| ledger.effective_power(InstanceId::new(card), 0, round))
            .collect();
        ledger.expire_buffs(round);
        let after: Vec<i32> = (0..10)
            .map(|card| ledger.effective_power(InstanceId::new(card), 0, round))
            .collect();

        prop_assert_eq!(before, after);
    }

    /// Pruning entries for dead cards never disturbs live-card queries.
    #[test]
    fn prop_pruning_preserves_live_queries(
        entries in prop::collection::vec((0u32..10, -15i32..=15, prop::collection::vec(any_buff(), 0..4)), 1..8),
        live_mask in 0u16..1024,
        round in 1u32..8,
    ) {
        let mut ledger = ledger_from(entries);
        let live = move |card: InstanceId| live_mask & (1u16 << card.raw().min(15)) != 0;

        let before: Vec<i32> = (0..10)
            .filter(|&card| live(InstanceId::new(card)))
            .map(|card| ledger.effective_power(InstanceId::new(card), 0, round))
            .collect();
        ledger.prune_stale(&live);
        let after: Vec<i32> = (0..10)
            .filter(|&card| live(InstanceId::new(card)))
            .map(|card| ledger.effective_power(InstanceId::new(card), 0, round))
            .collect();

        prop_assert_eq!(before, after);
        // Dead entries are genuinely gone.
        for card in 0..10 {
            let id = InstanceId::new(card);
            if !live(id) {
                prop_assert_eq!(ledger.delta(id), 0);
                prop_assert!(ledger.buffs(id).is_empty());
            }
        }
    }

    /// Any sequence of legal actions conserves each side's card count:
    /// instances move between zones but are never created or destroyed.
    #[test]
    fn prop_legal_actions_conserve_cards(
        seed in 0u64..1000,
        choices in prop::collection::vec(0u8..=255, 1..40),
    ) {
        let mut session = battle_session(seed);
        let now = Instant::now();
        let before: Vec<usize> = Seat::both()
            .map(|seat| session.board(seat).card_count())
            .collect();

        for choice in choices {
            apply_random_step(&mut session, choice, now);
        }

        let after: Vec<usize> = Seat::both()
            .map(|seat| session.board(seat).card_count())
            .collect();
        prop_assert_eq!(before, after);
    }

    /// Round-win counters never decrease, and the match ends exactly when
    /// one seat reaches the threshold.
    #[test]
    fn prop_round_wins_monotone_and_bounded(
        seed in 0u64..1000,
        choices in prop::collection::vec(0u8..=255, 1..60),
    ) {
        let mut session = battle_session(seed);
        let now = Instant::now();
        let threshold = session.config().rounds_to_win;
        let mut prev = (0u8, 0u8);

        for choice in choices {
            apply_random_step(&mut session, choice, now);

            let wins = (session.turn().round_wins(Seat::A), session.turn().round_wins(Seat::B));
            prop_assert!(wins.0 >= prev.0 && wins.1 >= prev.1);
            prop_assert!(wins.0 <= threshold && wins.1 <= threshold);
            prop_assert_eq!(
                session.is_ended(),
                wins.0 == threshold || wins.1 == threshold
            );
            prev = wins;
        }
    }
}

// =============================================================================
// Pointed cases
// =============================================================================

/// Reshuffle scenario: empty deck, three known cards in discard; a draw
/// rebuilds the deck from the discard and consumes exactly one card.
#[test]
fn test_draw_reshuffles_three_known_cards() {
    let mut board = lane_duel::Board::new();
    let mut rng = lane_duel::DuelRng::new(5);

    let known: Vec<InstanceId> = (0..3).map(InstanceId::new).collect();
    for (i, &id) in known.iter().enumerate() {
        board.deal_to_deck(lane_duel::CardInstance::new(id, CardId::new(i as u32 + 1)));
    }
    // Route everything through the discard pile.
    for &id in &known {
        board.move_to_discard(id);
    }
    assert_eq!(board.deck_size(), 0);
    assert_eq!(board.discard_pile().len(), 3);

    let drawn = board.draw(&mut rng).expect("reshuffle must allow the draw");

    assert!(known.contains(&drawn));
    assert_eq!(board.deck_size(), 2);
    assert!(board.discard_pile().is_empty());
}

/// Negative effective power is reported as-is; clamping is a scoring
/// policy, not a resolution one.
#[test]
fn test_negative_power_not_clamped_at_resolution() {
    let mut ledger = PowerLedger::new();
    let card = InstanceId::new(1);

    ledger.add_delta(card, -9);
    ledger.add_buff(card, Buff::permanent(-2, 1));

    assert_eq!(ledger.effective_power(card, 5, 1), -6);
}
