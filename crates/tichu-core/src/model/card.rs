use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const MAHJONG_VALUE: u8 = 1;
pub const DRAGON_VALUE: u8 = 25;

/// A single card: one of the 52 suited cards or one of the four unique specials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    Ranked { rank: Rank, suit: Suit },
    Dog,
    Phoenix,
    Mahjong,
    Dragon,
}

impl Card {
    pub const SPECIALS: [Card; 4] = [Card::Dog, Card::Phoenix, Card::Mahjong, Card::Dragon];

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card::Ranked { rank, suit }
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            Card::Ranked { rank, .. } => Some(rank),
            _ => None,
        }
    }

    pub const fn suit(self) -> Option<Suit> {
        match self {
            Card::Ranked { suit, .. } => Some(suit),
            _ => None,
        }
    }

    pub const fn is_special(self) -> bool {
        !matches!(self, Card::Ranked { .. })
    }

    /// Fixed ordering value. The Dog and the Phoenix have none.
    pub const fn value(self) -> Option<u8> {
        match self {
            Card::Ranked { rank, .. } => Some(rank.value()),
            Card::Mahjong => Some(MAHJONG_VALUE),
            Card::Dragon => Some(DRAGON_VALUE),
            Card::Dog | Card::Phoenix => None,
        }
    }

    pub const fn points(self) -> i32 {
        match self {
            Card::Ranked { rank, .. } => rank.points(),
            Card::Phoenix => -25,
            Card::Dragon => 25,
            Card::Dog | Card::Mahjong => 0,
        }
    }

    /// Key used to order cards inside a hand: by value, then by suit.
    pub(crate) const fn sort_key(self) -> (u8, u8) {
        match self {
            Card::Dog => (0, 0),
            Card::Mahjong => (MAHJONG_VALUE, 0),
            Card::Ranked { rank, suit } => (rank.value(), suit as u8),
            Card::Phoenix => (20, 0),
            Card::Dragon => (DRAGON_VALUE, 0),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Ranked { rank, suit } => write!(f, "{rank}{suit}"),
            Card::Dog => f.write_str("Dog"),
            Card::Phoenix => f.write_str("Phoenix"),
            Card::Mahjong => f.write_str("Mahjong"),
            Card::Dragon => f.write_str("Dragon"),
        }
    }
}
