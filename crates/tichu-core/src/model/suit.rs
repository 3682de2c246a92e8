use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Red = 0,
    Green = 1,
    Blue = 2,
    Black = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Red, Suit::Green, Suit::Blue, Suit::Black];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Red),
            1 => Some(Suit::Green),
            2 => Some(Suit::Blue),
            3 => Some(Suit::Black),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Red => "R",
            Suit::Green => "G",
            Suit::Blue => "U",
            Suit::Black => "B",
        };
        f.write_str(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::Suit;

    #[test]
    fn display_returns_ascii_symbols() {
        assert_eq!(Suit::Red.to_string(), "R");
        assert_eq!(Suit::Blue.to_string(), "U");
    }

    #[test]
    fn symbols_are_distinct_single_letters() {
        let symbols: Vec<String> = Suit::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(symbols, ["R", "G", "U", "B"]);
    }

    #[test]
    fn from_index_maps_valid_values() {
        assert_eq!(Suit::from_index(2), Some(Suit::Blue));
        assert_eq!(Suit::from_index(4), None);
    }
}
