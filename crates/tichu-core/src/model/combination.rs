//! Classification of played card sets and the rules deciding what beats what.
//!
//! Comparison keys are kept in half-steps (card value × 2) so the Phoenix,
//! played alone, can sit exactly half a step above the single it covers.

use crate::model::card::Card;
use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Values the Phoenix may stand in for inside a multi-card combination.
const WILD_VALUES: core::ops::RangeInclusive<u8> = 2..=14;
/// A Phoenix leading a trick counts as 1½.
const PHOENIX_LEAD_KEY: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombinationKind {
    Single,
    /// `count` connected pairs; a plain pair has `count == 1`.
    Pairs { count: u8 },
    Triple,
    FullHouse,
    Bomb4,
    Straight { length: u8 },
    /// Straight whose cards all share one suit.
    BombStraight { length: u8 },
}

impl CombinationKind {
    pub const fn is_bomb(self) -> bool {
        matches!(
            self,
            CombinationKind::Bomb4 | CombinationKind::BombStraight { .. }
        )
    }

    /// Position in the fixed classification order; lower wins when several shapes fit.
    const fn precedence(self) -> u8 {
        match self {
            CombinationKind::Single => 0,
            CombinationKind::Pairs { .. } => 1,
            CombinationKind::Triple => 2,
            CombinationKind::FullHouse => 3,
            CombinationKind::Bomb4 => 4,
            CombinationKind::Straight { .. } | CombinationKind::BombStraight { .. } => 5,
        }
    }
}

impl fmt::Display for CombinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationKind::Single => f.write_str("SINGLE"),
            CombinationKind::Pairs { count: 1 } => f.write_str("PAIR"),
            CombinationKind::Pairs { count } => write!(f, "PAIR{count}"),
            CombinationKind::Triple => f.write_str("TRIPLE"),
            CombinationKind::FullHouse => f.write_str("FULL_HOUSE"),
            CombinationKind::Bomb4 => f.write_str("BOMB4"),
            CombinationKind::Straight { length } => write!(f, "STRAIGHT{length}"),
            CombinationKind::BombStraight { length } => write!(f, "BOMB_STRAIGHT{length}"),
        }
    }
}

/// A classified group of cards together with its comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    kind: CombinationKind,
    cards: Vec<Card>,
    key: u16,
}

impl Combination {
    /// Classifies `cards`. `table` is only consulted for a lone Phoenix,
    /// whose worth depends on the single it is played over.
    pub fn from_cards(cards: Vec<Card>, table: Option<&Combination>) -> Option<Self> {
        let shape = evaluate(&cards)?;
        let key = if cards == [Card::Phoenix] {
            phoenix_single_key(table)
        } else {
            shape.key
        };
        Some(Self {
            kind: shape.kind,
            cards,
            key,
        })
    }

    pub fn kind(&self) -> CombinationKind {
        self.kind
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Comparison key in half-steps of card value.
    pub fn key(&self) -> u16 {
        self.key
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }
}

/// Returns the combination type of `cards`, or `None` when no legal shape fits.
pub fn classify(cards: &[Card]) -> Option<CombinationKind> {
    evaluate(cards).map(|shape| shape.kind)
}

/// Whether `played` may be put on top of `table`.
pub fn is_legal_play(played: &Combination, table: Option<&Combination>) -> bool {
    let Some(table) = table else {
        return true;
    };

    match (played.kind, table.kind) {
        (p, t) if p.is_bomb() && !t.is_bomb() => true,
        (CombinationKind::BombStraight { .. }, CombinationKind::Bomb4) => true,
        (
            CombinationKind::BombStraight { length: p },
            CombinationKind::BombStraight { length: t },
        ) if p > t => true,
        (p, t) if p == t => compare(played, table) == Ordering::Greater,
        _ => false,
    }
}

/// Ranks two combinations of the same type.
///
/// Full houses are ranked by their pair, every other type by its highest card.
pub fn compare(played: &Combination, table: &Combination) -> Ordering {
    played.key.cmp(&table.key)
}

#[derive(Debug, Clone, Copy)]
struct Shape {
    kind: CombinationKind,
    key: u16,
}

impl Shape {
    fn outranks(&self, other: &Shape) -> bool {
        match self.kind.precedence().cmp(&other.kind.precedence()) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.key > other.key,
        }
    }
}

fn evaluate(cards: &[Card]) -> Option<Shape> {
    if cards.is_empty() || cards.contains(&Card::Dog) {
        return None;
    }

    let phoenixes = cards.iter().filter(|card| **card == Card::Phoenix).count();
    let values: Vec<u8> = cards.iter().filter_map(|card| card.value()).collect();

    match phoenixes {
        0 => {
            let mut values = values;
            values.sort_unstable();
            let kind_and_top = shape_of(&values, same_suit(cards), true)?;
            Some(to_shape(kind_and_top))
        }
        1 if cards.len() == 1 => Some(Shape {
            kind: CombinationKind::Single,
            key: PHOENIX_LEAD_KEY,
        }),
        1 => {
            let mut best: Option<Shape> = None;
            for wild in WILD_VALUES {
                let mut candidate = values.clone();
                candidate.push(wild);
                candidate.sort_unstable();
                // The Phoenix has no suit, so no substitution can make a bomb.
                let Some(kind_and_top) = shape_of(&candidate, false, false) else {
                    continue;
                };
                let shape = to_shape(kind_and_top);
                best = match best {
                    Some(current) if !shape.outranks(&current) => Some(current),
                    _ => Some(shape),
                };
            }
            best
        }
        _ => None,
    }
}

fn to_shape((kind, top): (CombinationKind, u8)) -> Shape {
    Shape {
        kind,
        key: u16::from(top) * 2,
    }
}

fn phoenix_single_key(table: Option<&Combination>) -> u16 {
    match table {
        Some(table) if table.kind == CombinationKind::Single => {
            if table.contains(Card::Dragon) {
                table.key
            } else {
                table.key + 1
            }
        }
        _ => PHOENIX_LEAD_KEY,
    }
}

/// Fixed-order classification of sorted values. Returns the shape and its ranking value.
fn shape_of(values: &[u8], suited: bool, bombs: bool) -> Option<(CombinationKind, u8)> {
    let len = values.len();
    let top = *values.last()?;

    if len == 1 {
        return Some((CombinationKind::Single, top));
    }
    if is_pair_run(values) {
        let count = u8::try_from(len / 2).ok()?;
        return Some((CombinationKind::Pairs { count }, top));
    }
    if len == 3 && all_equal(values) {
        return Some((CombinationKind::Triple, top));
    }
    if let Some(pair) = full_house_pair(values) {
        return Some((CombinationKind::FullHouse, pair));
    }
    if bombs && len == 4 && all_equal(values) {
        return Some((CombinationKind::Bomb4, top));
    }
    if len >= 5 && is_run(values) {
        let length = u8::try_from(len).ok()?;
        let kind = if suited {
            CombinationKind::BombStraight { length }
        } else {
            CombinationKind::Straight { length }
        };
        return Some((kind, top));
    }
    None
}

fn all_equal(values: &[u8]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

fn is_run(values: &[u8]) -> bool {
    values.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

fn is_pair_run(values: &[u8]) -> bool {
    if values.is_empty() || values.len() % 2 != 0 {
        return false;
    }
    let heads: Vec<u8> = values
        .chunks(2)
        .map(|pair| if pair[0] == pair[1] { Some(pair[0]) } else { None })
        .collect::<Option<_>>()
        .unwrap_or_default();
    heads.len() == values.len() / 2 && is_run(&heads)
}

fn full_house_pair(values: &[u8]) -> Option<u8> {
    if values.len() != 5 {
        return None;
    }
    let low = values[0];
    let high = values[4];
    let lows = values.iter().filter(|&&v| v == low).count();
    let highs = values.iter().filter(|&&v| v == high).count();
    match (lows, highs) {
        (2, 3) if low != high => Some(low),
        (3, 2) if low != high => Some(high),
        _ => None,
    }
}

fn same_suit(cards: &[Card]) -> bool {
    let mut suits = cards.iter().map(|card| card.suit());
    match suits.next() {
        Some(Some(first)) => suits.all(|suit| suit == Some(first)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn c(value: u8, suit: Suit) -> Card {
        Card::new(Rank::from_value(value).unwrap(), suit)
    }

    fn combo(cards: Vec<Card>) -> Combination {
        Combination::from_cards(cards, None).unwrap()
    }

    #[test]
    fn single_card_is_single() {
        assert_eq!(classify(&[c(2, Suit::Red)]), Some(CombinationKind::Single));
        assert_eq!(classify(&[Card::Dragon]), Some(CombinationKind::Single));
        assert_eq!(classify(&[Card::Mahjong]), Some(CombinationKind::Single));
    }

    #[test]
    fn empty_set_and_dog_do_not_classify() {
        assert_eq!(classify(&[]), None);
        assert_eq!(classify(&[Card::Dog]), None);
        assert_eq!(classify(&[Card::Dog, c(5, Suit::Red)]), None);
    }

    #[test]
    fn pairs_and_connected_pairs() {
        assert_eq!(
            classify(&[c(5, Suit::Red), c(5, Suit::Black)]),
            Some(CombinationKind::Pairs { count: 1 })
        );
        assert_eq!(
            classify(&[
                c(5, Suit::Red),
                c(5, Suit::Black),
                c(6, Suit::Green),
                c(6, Suit::Blue)
            ]),
            Some(CombinationKind::Pairs { count: 2 })
        );
        assert_eq!(
            classify(&[
                c(5, Suit::Red),
                c(5, Suit::Black),
                c(7, Suit::Green),
                c(7, Suit::Blue)
            ]),
            None
        );
    }

    #[test]
    fn triple_full_house_and_bomb() {
        assert_eq!(
            classify(&[c(9, Suit::Red), c(9, Suit::Black), c(9, Suit::Green)]),
            Some(CombinationKind::Triple)
        );
        assert_eq!(
            classify(&[
                c(5, Suit::Red),
                c(5, Suit::Black),
                c(5, Suit::Green),
                c(6, Suit::Blue),
                c(6, Suit::Red)
            ]),
            Some(CombinationKind::FullHouse)
        );
        assert_eq!(
            classify(&[
                c(14, Suit::Red),
                c(14, Suit::Black),
                c(14, Suit::Green),
                c(14, Suit::Blue)
            ]),
            Some(CombinationKind::Bomb4)
        );
    }

    #[test]
    fn straights_and_suited_straights() {
        let mixed = [
            c(2, Suit::Red),
            c(3, Suit::Red),
            c(4, Suit::Black),
            c(5, Suit::Red),
            c(6, Suit::Red),
        ];
        assert_eq!(
            classify(&mixed),
            Some(CombinationKind::Straight { length: 5 })
        );

        let suited: Vec<Card> = (8..=13).map(|v| c(v, Suit::Green)).collect();
        assert_eq!(
            classify(&suited),
            Some(CombinationKind::BombStraight { length: 6 })
        );
    }

    #[test]
    fn mahjong_can_start_a_straight_but_never_a_bomb() {
        let cards = [
            Card::Mahjong,
            c(2, Suit::Red),
            c(3, Suit::Red),
            c(4, Suit::Red),
            c(5, Suit::Red),
        ];
        assert_eq!(
            classify(&cards),
            Some(CombinationKind::Straight { length: 5 })
        );
    }

    #[test]
    fn phoenix_completes_pairs_triples_and_straights() {
        assert_eq!(
            classify(&[c(7, Suit::Red), Card::Phoenix]),
            Some(CombinationKind::Pairs { count: 1 })
        );
        assert_eq!(
            classify(&[c(7, Suit::Red), c(7, Suit::Blue), Card::Phoenix]),
            Some(CombinationKind::Triple)
        );
        let straight = combo(vec![
            c(10, Suit::Red),
            c(11, Suit::Red),
            c(12, Suit::Red),
            c(13, Suit::Red),
            Card::Phoenix,
        ]);
        assert_eq!(straight.kind(), CombinationKind::Straight { length: 5 });
        // Phoenix takes the Ace slot rather than the nine.
        assert_eq!(straight.key(), 28);
    }

    #[test]
    fn phoenix_never_completes_a_bomb() {
        assert_eq!(
            classify(&[
                c(9, Suit::Red),
                c(9, Suit::Black),
                c(9, Suit::Green),
                Card::Phoenix
            ]),
            None
        );
    }

    #[test]
    fn phoenix_full_house_takes_the_higher_pair() {
        let house = combo(vec![
            c(5, Suit::Red),
            c(5, Suit::Black),
            c(6, Suit::Green),
            c(6, Suit::Blue),
            Card::Phoenix,
        ]);
        assert_eq!(house.kind(), CombinationKind::FullHouse);
        assert_eq!(house.key(), 12);
    }

    #[test]
    fn phoenix_single_sits_half_a_step_above_the_table() {
        let king = combo(vec![c(13, Suit::Red)]);
        let phoenix = Combination::from_cards(vec![Card::Phoenix], Some(&king)).unwrap();
        assert!(is_legal_play(&phoenix, Some(&king)));

        let ace = combo(vec![c(14, Suit::Red)]);
        assert!(is_legal_play(&ace, Some(&phoenix)));

        let dragon = combo(vec![Card::Dragon]);
        let phoenix = Combination::from_cards(vec![Card::Phoenix], Some(&dragon)).unwrap();
        assert!(!is_legal_play(&phoenix, Some(&dragon)));
    }

    #[test]
    fn led_phoenix_is_beaten_by_a_two_but_not_the_mahjong() {
        let phoenix = combo(vec![Card::Phoenix]);
        assert!(is_legal_play(&combo(vec![c(2, Suit::Red)]), Some(&phoenix)));
        assert!(!is_legal_play(&combo(vec![Card::Mahjong]), Some(&phoenix)));
    }

    #[test]
    fn anything_classified_is_legal_on_an_empty_table() {
        assert!(is_legal_play(&combo(vec![c(3, Suit::Red)]), None));
    }

    #[test]
    fn same_type_must_rank_higher() {
        let low = combo(vec![c(5, Suit::Red), c(5, Suit::Black)]);
        let high = combo(vec![c(9, Suit::Red), c(9, Suit::Black)]);
        assert!(is_legal_play(&high, Some(&low)));
        assert!(!is_legal_play(&low, Some(&high)));
        assert!(!is_legal_play(&low, Some(&low)));
    }

    #[test]
    fn type_mismatch_is_illegal() {
        let pair = combo(vec![c(5, Suit::Red), c(5, Suit::Black)]);
        let single = combo(vec![c(14, Suit::Red)]);
        assert!(!is_legal_play(&single, Some(&pair)));

        let pairs2 = combo(vec![
            c(2, Suit::Red),
            c(2, Suit::Black),
            c(3, Suit::Red),
            c(3, Suit::Black),
        ]);
        let pairs3 = combo(vec![
            c(2, Suit::Green),
            c(2, Suit::Blue),
            c(3, Suit::Green),
            c(3, Suit::Blue),
            c(4, Suit::Red),
            c(4, Suit::Black),
        ]);
        assert!(!is_legal_play(&pairs3, Some(&pairs2)));
    }

    #[test]
    fn full_house_compares_the_pair() {
        let tens_over_twos = combo(vec![
            c(10, Suit::Red),
            c(10, Suit::Black),
            c(10, Suit::Green),
            c(2, Suit::Red),
            c(2, Suit::Black),
        ]);
        let threes_over_fours = combo(vec![
            c(3, Suit::Red),
            c(3, Suit::Black),
            c(3, Suit::Green),
            c(4, Suit::Red),
            c(4, Suit::Black),
        ]);
        assert_eq!(compare(&threes_over_fours, &tens_over_twos), Ordering::Greater);
        assert!(is_legal_play(&threes_over_fours, Some(&tens_over_twos)));
    }

    #[test]
    fn bomb_rules() {
        let straight = combo(
            (2..=6)
                .map(|v| c(v, if v == 4 { Suit::Red } else { Suit::Blue }))
                .collect(),
        );
        let four_twos = combo(Suit::ALL.iter().map(|&s| c(2, s)).collect());
        let four_aces = combo(Suit::ALL.iter().map(|&s| c(14, s)).collect());
        let short_run = combo((2..=6).map(|v| c(v, Suit::Green)).collect());
        let long_run = combo((2..=7).map(|v| c(v, Suit::Red)).collect());
        let higher_short_run = combo((3..=7).map(|v| c(v, Suit::Blue)).collect());

        assert!(is_legal_play(&four_twos, Some(&straight)));
        assert!(is_legal_play(&four_aces, Some(&four_twos)));
        assert!(!is_legal_play(&four_twos, Some(&four_aces)));
        assert!(is_legal_play(&short_run, Some(&four_aces)));
        assert!(!is_legal_play(&four_aces, Some(&short_run)));
        assert!(is_legal_play(&long_run, Some(&short_run)));
        assert!(!is_legal_play(&short_run, Some(&long_run)));
        assert!(is_legal_play(&higher_short_run, Some(&short_run)));
        assert!(!is_legal_play(&straight, Some(&four_twos)));
    }

    #[test]
    fn kind_labels_match_the_wire_names() {
        assert_eq!(CombinationKind::Pairs { count: 1 }.to_string(), "PAIR");
        assert_eq!(CombinationKind::Pairs { count: 3 }.to_string(), "PAIR3");
        assert_eq!(
            CombinationKind::BombStraight { length: 7 }.to_string(),
            "BOMB_STRAIGHT7"
        );
    }
}
