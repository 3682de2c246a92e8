use crate::model::card::Card;
use crate::model::combination::{Combination, CombinationKind};
use crate::model::player::Seat;
use serde::{Deserialize, Serialize};

/// The combination currently on the table and who put it there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    played_by: Seat,
    combination: Combination,
}

impl Trick {
    pub fn new(played_by: Seat, combination: Combination) -> Self {
        Self {
            played_by,
            combination,
        }
    }

    pub fn played_by(&self) -> Seat {
        self.played_by
    }

    pub fn combination(&self) -> &Combination {
        &self.combination
    }

    pub fn kind(&self) -> CombinationKind {
        self.combination.kind()
    }

    pub fn cards(&self) -> &[Card] {
        self.combination.cards()
    }
}
