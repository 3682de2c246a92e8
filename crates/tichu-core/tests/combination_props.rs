//! Property tests for combination classification and bomb ordering.

use proptest::prelude::*;
use tichu_core::model::card::Card;
use tichu_core::model::combination::{Combination, CombinationKind, classify, is_legal_play};
use tichu_core::model::deck::Deck;
use tichu_core::model::rank::Rank;
use tichu_core::model::suit::Suit;

fn ranked(value: u8, suit: Suit) -> Card {
    Card::new(Rank::from_value(value).expect("value in 2..=14"), suit)
}

/// `count` connected pairs, each pair drawn from two different suits.
fn pair_run() -> impl Strategy<Value = (u8, Vec<Card>)> {
    (1u8..=7)
        .prop_flat_map(|count| {
            (
                Just(count),
                2u8..=(15 - count),
                prop::collection::vec(
                    prop::sample::subsequence(Suit::ALL.to_vec(), 2),
                    count as usize,
                ),
            )
        })
        .prop_map(|(count, start, suits)| {
            let cards = suits
                .iter()
                .enumerate()
                .flat_map(|(offset, pair)| {
                    let value = start + offset as u8;
                    pair.iter().map(move |suit| ranked(value, *suit))
                })
                .collect();
            (count, cards)
        })
}

fn suited_run() -> impl Strategy<Value = (u8, Vec<Card>)> {
    (5u8..=13, prop::sample::select(Suit::ALL.to_vec()))
        .prop_flat_map(|(length, suit)| (Just(length), Just(suit), 2u8..=(15 - length)))
        .prop_map(|(length, suit, start)| {
            let cards = (start..start + length).map(|value| ranked(value, suit)).collect();
            (length, cards)
        })
}

/// A single (anything but the Dog) or a run of pairs: never a bomb.
fn plain_table() -> impl Strategy<Value = Vec<Card>> {
    let singles: Vec<Card> = Deck::standard()
        .cards()
        .iter()
        .copied()
        .filter(|card| *card != Card::Dog)
        .collect();
    prop_oneof![
        prop::sample::select(singles).prop_map(|card| vec![card]),
        pair_run().prop_map(|(_, cards)| cards),
    ]
}

fn any_cards() -> impl Strategy<Value = Vec<Card>> {
    prop::sample::subsequence(Deck::standard().cards().to_vec(), 1..=8)
}

fn permute_suits(cards: &[Card], order: &[Suit]) -> Vec<Card> {
    cards
        .iter()
        .map(|card| match (card.rank(), card.suit()) {
            (Some(rank), Some(suit)) => Card::new(rank, order[suit.index()]),
            _ => *card,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_connected_pairs_classify_by_count(
        (count, cards) in pair_run().prop_flat_map(|(count, cards)| (Just(count), Just(cards).prop_shuffle())),
    ) {
        prop_assert_eq!(classify(&cards), Some(CombinationKind::Pairs { count }));
    }

    #[test]
    fn prop_suited_runs_are_always_bombs(
        (length, cards) in suited_run(),
    ) {
        prop_assert_eq!(classify(&cards), Some(CombinationKind::BombStraight { length }));
    }

    #[test]
    fn prop_classification_ignores_card_order(
        (cards, shuffled) in any_cards().prop_flat_map(|cards| (Just(cards.clone()), Just(cards).prop_shuffle())),
    ) {
        prop_assert_eq!(classify(&cards), classify(&shuffled));
    }

    #[test]
    fn prop_classification_ignores_suit_names(
        cards in any_cards(),
        order in Just(Suit::ALL.to_vec()).prop_shuffle(),
    ) {
        prop_assert_eq!(classify(&cards), classify(&permute_suits(&cards, &order)));
    }

    #[test]
    fn prop_bombs_beat_any_plain_combination(
        table in plain_table(),
        bomb_value in 2u8..=14,
    ) {
        let table = Combination::from_cards(table, None);
        prop_assert!(table.as_ref().is_some_and(|combo| !combo.kind().is_bomb()));
        let bomb: Vec<Card> = Suit::ALL.iter().map(|suit| ranked(bomb_value, *suit)).collect();
        let bomb = Combination::from_cards(bomb, None).expect("four of a kind");
        prop_assert!(is_legal_play(&bomb, table.as_ref()));
    }

    #[test]
    fn prop_longer_suited_run_wins_and_any_suited_run_beats_four_of_a_kind(
        (short, long) in (5u8..=12).prop_flat_map(|short| (Just(short), (short + 1)..=13)),
        quad_value in 2u8..=14,
    ) {
        let short_run = Combination::from_cards((2..2 + short).map(|v| ranked(v, Suit::Red)).collect(), None)
            .expect("short run");
        let long_run = Combination::from_cards((2..2 + long).map(|v| ranked(v, Suit::Blue)).collect(), None)
            .expect("long run");
        let quad = Combination::from_cards(Suit::ALL.iter().map(|s| ranked(quad_value, *s)).collect(), None)
            .expect("four of a kind");

        prop_assert!(is_legal_play(&long_run, Some(&short_run)));
        prop_assert!(!is_legal_play(&short_run, Some(&long_run)));
        prop_assert!(is_legal_play(&short_run, Some(&quad)));
        prop_assert!(!is_legal_play(&quad, Some(&short_run)));
    }
}
